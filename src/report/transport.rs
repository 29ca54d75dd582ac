use std::time::Duration;

use log::{debug, error};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use super::error::ReportError;
use crate::config::Settings;

pub trait ReportEndpoint {
    /// Where reports are delivered
    fn endpoint_url(&self) -> String;
    /// POST an encoded form body, returning the server's response text
    fn post_report(&self, body: String) -> Result<String, ReportError>;
}

impl ReportEndpoint for Settings {
    fn endpoint_url(&self) -> String {
        self.report_url()
    }

    fn post_report(&self, body: String) -> Result<String, ReportError> {
        let url = self.endpoint_url();

        let client = match Client::builder()
            .timeout(Duration::from_secs(self.request_timeout))
            .build()
        {
            Ok(result) => result,
            Err(err) => {
                error!("[report] Failed to build HTTP client: {err:?}");
                return Err(ReportError::Client(err.to_string()));
            }
        };

        let res = match client
            .post(&url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
        {
            Ok(result) => result,
            Err(err) => {
                error!("[report] Failed to send report to {url}: {err:?}");
                return Err(classify(err));
            }
        };

        let status = res.status();
        let text = match res.text() {
            Ok(result) => result,
            Err(err) => {
                error!("[report] Failed to read response from {url}: {err:?}");
                return Err(classify(err));
            }
        };

        if !status.is_success() {
            error!("[report] Server returned HTTP {status}");
            return Err(ReportError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!("[report] Server accepted report ({} bytes of response)", text.len());
        Ok(text)
    }
}

fn classify(err: reqwest::Error) -> ReportError {
    if err.is_timeout() {
        ReportError::Timeout
    } else if err.is_connect() {
        ReportError::Connect(err.to_string())
    } else {
        ReportError::Network(err.to_string())
    }
}

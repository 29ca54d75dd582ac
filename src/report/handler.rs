use std::io;
use std::path::Path;

use log::{info, warn};

use super::delivery_log::append_delivery_log;
use super::encode::{encode_form_body, encode_report};
use super::error::ReportError;
use super::transport::ReportEndpoint;
use crate::hardware::types::AssetReport;

/// Result of a single delivery attempt.
#[derive(Debug)]
pub struct Delivery {
    pub url: String,
    pub response: Result<String, ReportError>,
}

impl Delivery {
    /// What the delivery log records for this attempt.
    pub fn log_message(&self) -> String {
        match &self.response {
            Ok(body) => body.clone(),
            Err(err) => format!("send failed: {err}"),
        }
    }
}

/// Serialize, POST once, and record the attempt. The delivery log gets
/// exactly one line whatever the outcome; only a failure to write that line
/// is returned as an error.
pub fn deliver_report<E: ReportEndpoint>(
    endpoint: &E,
    log_path: &Path,
    report: &AssetReport,
) -> io::Result<Delivery> {
    let url = endpoint.endpoint_url();

    let response = encode_report(report).and_then(|json| endpoint.post_report(encode_form_body(&json)));
    match &response {
        Ok(_) => info!("[report] Delivered asset data to {url}"),
        Err(err) => warn!("[report] Delivery to {url} failed: {err}"),
    }

    let delivery = Delivery { url, response };
    append_delivery_log(log_path, &delivery.url, &delivery.log_message())?;

    Ok(delivery)
}

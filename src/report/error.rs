use std::fmt;

#[derive(Debug)]
pub enum ReportError {
    Encode(String),
    Client(String),
    Timeout,
    Connect(String),
    Network(String),
    Rejected { status: u16, body: String },
}

impl std::error::Error for ReportError {}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Encode(err) => write!(f, "Failed to encode asset data: {err}"),
            ReportError::Client(err) => write!(f, "Failed to build HTTP client: {err}"),
            ReportError::Timeout => write!(f, "Request timed out"),
            ReportError::Connect(err) => write!(f, "Could not connect to server: {err}"),
            ReportError::Network(err) => write!(f, "Network error: {err}"),
            ReportError::Rejected { status, body } if body.trim().is_empty() => {
                write!(f, "Server rejected report with HTTP {status}")
            }
            ReportError::Rejected { status, body } => {
                write!(f, "Server rejected report with HTTP {status}: {}", body.trim())
            }
        }
    }
}

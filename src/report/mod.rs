// Report pipeline: encode -> transport -> delivery log
pub mod error;
pub mod encode;
pub mod transport;
pub mod delivery_log;
pub mod handler;

pub use error::ReportError;
pub use handler::{deliver_report, Delivery};

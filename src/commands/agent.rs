use std::path::Path;

use crate::config::Settings;
use crate::hardware::collect_full_inventory;
use crate::hardware::types::AssetReport;
use crate::output::{output_data, print_error, print_info, print_success};
use crate::report::deliver_report;
use crate::report::transport::ReportEndpoint;

pub fn handle_collect_data(format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let report = collect_full_inventory();
    output_data(&report, format)?;
    Ok(())
}

pub fn handle_report_data(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    print_info("Collecting asset data...");
    let report = collect_full_inventory();
    send_report(settings, &settings.log_path, &report)
}

/// A failed delivery is printed and logged but is not an error of the command.
/// Only losing the delivery log line is.
fn send_report<E: ReportEndpoint>(
    endpoint: &E,
    log_path: &Path,
    report: &AssetReport,
) -> Result<(), Box<dyn std::error::Error>> {
    print_info(&format!("Sending asset data to {}", endpoint.endpoint_url()));

    let delivery = deliver_report(endpoint, log_path, report)?;
    match &delivery.response {
        Ok(body) => {
            print_success("Asset data sent");
            println!("{body}");
        }
        Err(err) => print_error(&format!("Failed to send asset data: {err}")),
    }

    print_info(&format!("Delivery logged to {}", log_path.display()));
    Ok(())
}

use url::form_urlencoded;

use super::error::ReportError;
use crate::hardware::types::AssetReport;

/// The only field of the report form body.
pub const ASSET_DATA_FIELD: &str = "asset_data";

/// JSON-encode a report for the `asset_data` field.
pub fn encode_report(report: &AssetReport) -> Result<String, ReportError> {
    serde_json::to_string(report).map_err(|err| ReportError::Encode(err.to_string()))
}

/// `application/x-www-form-urlencoded` body carrying the JSON blob.
pub fn encode_form_body(asset_data: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair(ASSET_DATA_FIELD, asset_data)
        .finish()
}

/// Pull the `asset_data` value back out of a form body.
pub fn decode_form_body(body: &str) -> Option<String> {
    form_urlencoded::parse(body.trim().as_bytes())
        .find(|(key, _)| key == ASSET_DATA_FIELD)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_form_body() {
        let report = AssetReport {
            sn: Some("CN7016SD0A".to_string()),
            hostname: Some("web-01".to_string()),
            ..Default::default()
        };
        let json = encode_report(&report).unwrap();
        let body = encode_form_body(&json);

        assert!(body.starts_with("asset_data="));
        // JSON punctuation must be escaped in a form body
        assert!(!body.contains('{'));
        assert!(!body.contains('"'));

        let decoded = decode_form_body(&body).unwrap();
        let parsed: AssetReport = serde_json::from_str(&decoded).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_decode_form_body_missing_field() {
        assert_eq!(decode_form_body("other=1&more=2"), None);
        assert_eq!(decode_form_body(""), None);
    }

    #[test]
    fn test_decode_plus_as_space() {
        assert_eq!(decode_form_body("asset_data=Dell+Inc.").as_deref(), Some("Dell Inc."));
    }
}

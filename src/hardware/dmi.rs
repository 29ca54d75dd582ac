use std::fs;
use std::path::Path;

use smbioslib::SMBiosData;

const DMI_TABLE: &str = "/sys/firmware/dmi/tables/DMI";
const DMI_ID_DIR: &str = "/sys/class/dmi/id";

/// Placeholder strings vendors leave in unset DMI fields.
const PLACEHOLDERS: [&str; 6] = [
    "Not Specified",
    "Not Available",
    "To Be Filled By O.E.M.",
    "Default string",
    "System Serial Number",
    "None",
];

/// Load the SMBIOS table from sysfs. Usually needs root.
pub fn load_smbios() -> Option<SMBiosData> {
    match SMBiosData::try_load_from_file(DMI_TABLE, None) {
        Ok(data) => Some(data),
        Err(_) => {
            // If that fails, try reading the raw data and parsing it
            let table_data = fs::read(DMI_TABLE).ok()?;
            Some(SMBiosData::from_vec_and_version(table_data, None))
        }
    }
}

/// Normalise a DMI string, dropping empty values and vendor placeholders.
pub fn clean_dmi_string(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() || PLACEHOLDERS.iter().any(|p| p.eq_ignore_ascii_case(trimmed)) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Read `/sys/class/dmi/id/<field>`, which the kernel exposes without root
/// for most fields.
pub fn read_dmi_id(field: &str) -> Option<String> {
    read_to_string_trim(Path::new(DMI_ID_DIR).join(field)).and_then(|v| clean_dmi_string(Some(v)))
}

pub fn read_to_string_trim<P: AsRef<Path>>(path: P) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_dmi_string() {
        assert_eq!(clean_dmi_string(Some(" Dell Inc. ".to_string())), Some("Dell Inc.".to_string()));
        assert_eq!(clean_dmi_string(Some("To Be Filled By O.E.M.".to_string())), None);
        assert_eq!(clean_dmi_string(Some("not specified".to_string())), None);
        assert_eq!(clean_dmi_string(Some("   ".to_string())), None);
        assert_eq!(clean_dmi_string(None), None);
    }

    #[test]
    fn test_read_missing_file() {
        assert_eq!(read_to_string_trim("/nonexistent/cmdb/file"), None);
    }
}

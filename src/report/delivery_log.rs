use std::fs::{create_dir_all, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One delivery attempt: `<timestamp>\t<url>\t<message>`. Line breaks in the
/// message are flattened so every attempt stays on one line.
pub fn format_log_line(timestamp: &str, url: &str, message: &str) -> String {
    let flat: String = message
        .trim()
        .chars()
        .map(|c| if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c })
        .collect();
    format!("{timestamp}\t{url}\t{flat}\n")
}

/// Append one line for a delivery attempt. The file is opened and closed on
/// every call.
pub fn append_delivery_log(path: &Path, url: &str, message: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(format_log_line(&timestamp, url, message).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{read_to_string, remove_file};
    use std::path::PathBuf;

    #[test]
    fn test_format_log_line() {
        let line = format_log_line("2024-03-01 10:00:00", "http://cmdb:8000/assets/report/", "ok");
        assert_eq!(line, "2024-03-01 10:00:00\thttp://cmdb:8000/assets/report/\tok\n");
    }

    #[test]
    fn test_format_log_line_flattens_newlines() {
        let line = format_log_line("2024-03-01 10:00:00", "http://x", "line one\r\nline\ttwo\n");
        assert_eq!(line.matches('\n').count(), 1);
        assert_eq!(line.split('\t').count(), 3);
        assert!(line.ends_with("line one  line two\n"));
    }

    #[test]
    fn test_append_delivery_log() {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("tmp/delivery/append.log");
        let _ = remove_file(&test_location);

        append_delivery_log(&test_location, "http://a", "first").unwrap();
        append_delivery_log(&test_location, "http://a", "second").unwrap();

        let text = read_to_string(&test_location).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("\thttp://a\tfirst"));
        assert!(lines[1].ends_with("\thttp://a\tsecond"));
    }
}

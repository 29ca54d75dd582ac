use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::hardware::dmi::read_to_string_trim;
use crate::hardware::types::DiskInfo;

const SECTOR_SIZE: u64 = 512;

/// Entry point: collect all physical disks on this machine.
pub fn collect_disks() -> Vec<DiskInfo> {
    let mut disks = Vec::new();
    let sys_block = Path::new("/sys/block");

    let entries = match fs::read_dir(sys_block) {
        Ok(e) => e,
        Err(_) => return disks,
    };

    for entry in entries.flatten() {
        let name = match entry.file_name().into_string() {
            Ok(n) => n,
            Err(_) => continue,
        };

        if is_virtual_block_device(&name) {
            continue;
        }

        let sys_path = entry.path();
        let dev_path = format!("/dev/{}", name);

        // Skip if the device file doesn't actually exist
        if !Path::new(&dev_path).exists() {
            continue;
        }

        disks.push(collect_single_disk(&name, &sys_path, &dev_path));
    }

    disks.sort_by(|a, b| a.slot.cmp(&b.slot));
    disks
}

fn is_virtual_block_device(name: &str) -> bool {
    name.starts_with("loop")
        || name.starts_with("ram")
        || name.starts_with("dm-")
        || name.starts_with("zram")
        || name.starts_with("md")
        || name.starts_with("sr")
}

/// Collect detailed info for a single disk.
fn collect_single_disk(name: &str, sys_path: &Path, dev_path: &str) -> DiskInfo {
    let device_path = sys_path.join("device");

    let model = read_to_string_trim(device_path.join("model"));
    let manufacturer = read_to_string_trim(device_path.join("vendor"));
    let mut serial = read_to_string_trim(device_path.join("serial"));

    let capacity = read_to_u64(sys_path.join("size")).map(sectors_to_gb);

    // Rotational: 1 = HDD, 0 = SSD/NVMe
    let rotational = read_to_u64(sys_path.join("queue/rotational")).map(|v| v == 1);

    if name.starts_with("nvme") && serial.is_none() {
        // NVMe namespace: "nvme0n1" -> controller "nvme0"
        let controller = name.split('n').take(2).collect::<Vec<_>>().join("n");
        serial = read_to_string_trim(PathBuf::from("/sys/class/nvme").join(controller).join("serial"));
    }

    if serial.is_none() {
        serial = get_serial_from_smartctl(dev_path, name.starts_with("nvme"));
    }

    let subsystem = detect_subsystem(&device_path);
    let is_sas = device_path.join("sas_address").exists();

    let interface_type =
        classify_interface(name, rotational, manufacturer.as_deref(), is_sas, subsystem.as_deref());

    DiskInfo {
        slot: read_scsi_address(&device_path).or_else(|| Some(name.to_string())),
        sn: serial,
        model,
        manufacturer,
        capacity,
        interface_type: interface_type.to_string(),
    }
}

/// Map what sysfs knows about a disk onto the inventory's interface types.
fn classify_interface(
    name: &str,
    rotational: Option<bool>,
    vendor: Option<&str>,
    is_sas: bool,
    subsystem: Option<&str>,
) -> &'static str {
    if name.starts_with("nvme") || rotational == Some(false) {
        return "SSD";
    }
    if is_sas {
        return "SAS";
    }
    // libata presents SATA drives as SCSI devices with vendor "ATA"
    if vendor.map(|v| v.trim() == "ATA").unwrap_or(false) {
        return "SATA";
    }
    match subsystem {
        Some("scsi") => "SCSI",
        _ => "unknown",
    }
}

fn sectors_to_gb(sectors: u64) -> f64 {
    let bytes = sectors * SECTOR_SIZE;
    let gb = bytes as f64 / 1_000_000_000.0;
    (gb * 100.0).round() / 100.0
}

fn read_to_u64<P: AsRef<Path>>(path: P) -> Option<u64> {
    let s = read_to_string_trim(path)?;
    s.parse::<u64>().ok()
}

/// SCSI host:channel:target:lun, the closest thing sysfs has to a bay number.
fn read_scsi_address(device_path: &Path) -> Option<String> {
    let link = fs::read_link(device_path).ok()?;
    let last = link.file_name()?.to_str()?;
    if last.split(':').count() == 4 {
        Some(last.to_string())
    } else {
        None
    }
}

/// Read the "subsystem" symlink, e.g. .../scsi, .../nvme, .../virtio
fn detect_subsystem(device_path: &Path) -> Option<String> {
    let link = fs::read_link(device_path.join("subsystem")).ok()?;
    link.file_name().and_then(|n| n.to_str()).map(|s| s.to_string())
}

/// Get serial number from `smartctl -i`. Requires smartmontools, might
/// require root.
fn get_serial_from_smartctl(dev_path: &str, nvme: bool) -> Option<String> {
    let mut args = vec!["-i"];
    if nvme {
        args.extend_from_slice(&["-d", "nvme"]);
    }
    args.push(dev_path);

    let output = match Command::new("smartctl").args(&args).output() {
        Ok(o) if o.status.success() => o,
        Ok(_) => return None,
        Err(err) => {
            debug!("[hardware] smartctl unavailable for {dev_path}: {err:?}");
            return None;
        }
    };

    let text = String::from_utf8_lossy(&output.stdout);
    parse_labeled_value(&text, &["Serial Number:", "Serial number:"])
}

/// First non-empty value following one of `labels` in tool output.
fn parse_labeled_value(text: &str, labels: &[&str]) -> Option<String> {
    for line in text.lines() {
        let line = line.trim();
        for label in labels {
            if let Some(rest) = line.strip_prefix(label) {
                let value = rest.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

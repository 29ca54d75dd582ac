use log::debug;
use procfs::{Current, Meminfo};
use smbioslib::*;

use crate::hardware::dmi::{clean_dmi_string, load_smbios};
use crate::hardware::types::{MemoryInfo, RamInfo};

pub fn collect_memory_info() -> MemoryInfo {
    let ram = collect_memory_with_smbios();

    let ram_size = total_size_gb(&ram).or_else(|| {
        debug!("[hardware] No DIMMs in SMBIOS, sizing memory from /proc/meminfo");
        Meminfo::current().ok().map(|m| bytes_to_gb(m.mem_total))
    });

    MemoryInfo { ram_size, ram }
}

/// Sum of module capacities (MB) rounded to the nearest GB, never below 1.
fn total_size_gb(ram: &[RamInfo]) -> Option<u64> {
    let total_mb: u64 = ram.iter().filter_map(|r| r.capacity).sum();
    if total_mb == 0 {
        return None;
    }
    Some(((total_mb + 512) / 1024).max(1))
}

/// Round a byte count to the nearest GB. `/proc/meminfo` reports slightly
/// less than what is installed.
fn bytes_to_gb(bytes: u64) -> u64 {
    const GB: u64 = 1024 * 1024 * 1024;
    (bytes + GB / 2) / GB
}

fn collect_memory_with_smbios() -> Vec<RamInfo> {
    let mut dimms = Vec::new();

    let smbios_data = match load_smbios() {
        Some(data) => data,
        None => return dimms,
    };

    for structure in smbios_data.iter() {
        match structure.defined_struct() {
            DefinedStruct::MemoryDevice(memory_device) => {
                // Empty slots report no size
                let capacity = match module_size_mb(&memory_device) {
                    Some(size) => size,
                    None => continue,
                };

                let slot = clean_dmi_string(memory_device.device_locator().to_utf8_lossy())
                    .unwrap_or_else(|| format!("DIMM{}", dimms.len()));

                let model = memory_device.memory_type().and_then(|mem_type| {
                    let type_str = format!("{:?}", mem_type.value).to_uppercase();
                    if type_str == "UNKNOWN" || type_str == "OTHER" {
                        None
                    } else {
                        Some(type_str)
                    }
                });

                dimms.push(RamInfo {
                    slot,
                    capacity: Some(capacity),
                    model,
                    manufacturer: clean_dmi_string(memory_device.manufacturer().to_utf8_lossy()),
                    sn: clean_dmi_string(memory_device.serial_number().to_utf8_lossy()),
                });
            }
            _ => continue,
        }
    }

    dimms
}

fn module_size_mb(memory_device: &SMBiosMemoryDevice<'_>) -> Option<u64> {
    match memory_device.size()? {
        smbioslib::MemorySize::Kilobytes(kb) if kb > 0 => Some(kb as u64 / 1024),
        smbioslib::MemorySize::Megabytes(mb) if mb > 0 => Some(mb as u64),
        smbioslib::MemorySize::SeeExtendedSize => match memory_device.extended_size()? {
            // Use extended size for large memory modules
            smbioslib::MemorySizeExtended::Megabytes(mb) if mb > 0 => Some(mb as u64),
            _ => None,
        },
        _ => None,
    }
}

use std::fs;

use log::debug;
use smbioslib::DefinedStruct;
use sysinfo::System;

use crate::hardware::dmi::{clean_dmi_string, load_smbios, read_dmi_id};
use crate::hardware::types::{NodeInfo, OsInfo};

pub fn collect_node_info() -> NodeInfo {
    let mut node = NodeInfo {
        hostname: get_hostname(),
        ..Default::default()
    };

    collect_dmi_info(&mut node);

    // sysfs exposes most of the same fields without needing the raw table
    if node.manufacturer.is_none() {
        node.manufacturer = read_dmi_id("sys_vendor");
    }
    if node.model.is_none() {
        node.model = read_dmi_id("product_name");
    }
    if node.sn.is_none() {
        node.sn = read_dmi_id("product_serial").or_else(|| read_dmi_id("chassis_serial"));
    }
    node.uuid = read_dmi_id("product_uuid").map(|u| u.to_lowercase());

    node
}

pub fn collect_os_info() -> OsInfo {
    OsInfo {
        os_type: std::env::consts::OS.to_string(),
        os_distribution: System::name(),
        os_release: System::long_os_version().or_else(System::os_version),
    }
}

fn get_hostname() -> String {
    fs::read_to_string("/proc/sys/kernel/hostname")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(System::host_name)
        .unwrap_or_else(|| "unknown".to_string())
}

fn collect_dmi_info(node: &mut NodeInfo) {
    let smbios_data = match load_smbios() {
        Some(data) => data,
        None => {
            debug!("[hardware] SMBIOS table unavailable, falling back to sysfs");
            return;
        }
    };

    let mut chassis_serial_number = None;

    for structure in smbios_data.iter() {
        match structure.defined_struct() {
            DefinedStruct::SystemInformation(system_struct) => {
                node.manufacturer = clean_dmi_string(system_struct.manufacturer().to_utf8_lossy());
                node.model = clean_dmi_string(system_struct.product_name().to_utf8_lossy());
                node.sn = clean_dmi_string(system_struct.serial_number().to_utf8_lossy());
                node.wake_up_type = system_struct
                    .wakeup_type()
                    .map(|wake| format!("{:?}", wake.value));
            }
            DefinedStruct::SystemChassisInformation(chassis_struct) => {
                chassis_serial_number = clean_dmi_string(chassis_struct.serial_number().to_utf8_lossy());
            }
            _ => continue,
        }
    }

    // Whitebox servers often only carry a serial on the chassis
    if node.sn.is_none() {
        node.sn = chassis_serial_number;
    }
}

use serde::{Deserialize, Serialize};

/// Snapshot the agent sends to the server inside the `asset_data` form field.
///
/// Every field is optional on the wire so that reports from older or partial
/// agents still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetReport {
    pub asset_type: String,
    pub sn: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub uuid: Option<String>,
    pub wake_up_type: Option<String>,
    pub hostname: Option<String>,
    pub os_type: Option<String>,
    pub os_distribution: Option<String>,
    pub os_release: Option<String>,
    pub cpu_model: Option<String>,
    pub cpu_count: Option<u32>,
    pub cpu_core_count: Option<u32>,
    pub ram: Vec<RamInfo>,
    /// Total installed memory in GB.
    pub ram_size: Option<u64>,
    pub nic: Vec<NicInfo>,
    pub physical_disk_driver: Vec<DiskInfo>,
    pub agent_version: String,
    pub collected_at: Option<String>,
}

impl Default for AssetReport {
    fn default() -> Self {
        AssetReport {
            asset_type: "server".to_string(),
            sn: None,
            manufacturer: None,
            model: None,
            uuid: None,
            wake_up_type: None,
            hostname: None,
            os_type: None,
            os_distribution: None,
            os_release: None,
            cpu_model: None,
            cpu_count: None,
            cpu_core_count: None,
            ram: Vec::new(),
            ram_size: None,
            nic: Vec::new(),
            physical_disk_driver: Vec::new(),
            agent_version: String::new(),
            collected_at: None,
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct NodeInfo {
    pub hostname: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub sn: Option<String>,
    pub uuid: Option<String>,
    pub wake_up_type: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct OsInfo {
    pub os_type: String,
    pub os_distribution: Option<String>,
    pub os_release: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct CpuInfo {
    pub cpu_model: Option<String>,
    pub cpu_count: Option<u32>,
    pub cpu_core_count: Option<u32>,
}

#[derive(Debug, Default, Serialize)]
pub struct MemoryInfo {
    pub ram_size: Option<u64>,
    pub ram: Vec<RamInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RamInfo {
    pub slot: String,
    /// Module size in MB.
    pub capacity: Option<u64>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub sn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskInfo {
    pub slot: Option<String>,
    pub sn: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    /// Size in GB.
    pub capacity: Option<f64>,
    pub interface_type: String, // "SATA", "SAS", "SCSI", "SSD" or "unknown"
}

impl Default for DiskInfo {
    fn default() -> Self {
        DiskInfo {
            slot: None,
            sn: None,
            model: None,
            manufacturer: None,
            capacity: None,
            interface_type: "unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NicInfo {
    pub name: String,
    pub mac: Option<String>,
    pub model: Option<String>,
    pub ip_address: Option<String>,
    pub net_mask: Option<String>,
    pub bonding: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct IpAddress {
    pub family: String, // "inet" or "inet6"
    pub address: String,
    pub prefix: u8,
}

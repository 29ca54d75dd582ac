use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::Serialize;

use super::error::StoreError;

/// Choice field stored as a small integer.
macro_rules! int_choice {
    ($name:ident, $field:literal, { $($variant:ident = $code:literal => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn code(self) -> i64 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_code(code: i64) -> Result<Self, StoreError> {
                match code {
                    $($code => Ok($name::$variant),)+
                    _ => Err(StoreError::InvalidChoice { field: $field, value: code.to_string() }),
                }
            }

            /// Accepts the label in any case or the numeric code.
            pub fn parse(value: &str) -> Result<Self, StoreError> {
                if let Ok(code) = value.trim().parse::<i64>() {
                    return $name::from_code(code);
                }
                match value.trim().to_lowercase().as_str() {
                    $($label => Ok($name::$variant),)+
                    _ => Err(StoreError::InvalidChoice { field: $field, value: value.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.label())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.code()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                $name::from_code(value.as_i64()?).map_err(|err| FromSqlError::Other(Box::new(err)))
            }
        }
    };
}

/// Choice field stored as text.
macro_rules! text_choice {
    ($name:ident, $field:literal, { $($variant:ident = $value:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn parse(value: &str) -> Result<Self, StoreError> {
                match value {
                    $($value => Ok($name::$variant),)+
                    _ => Err(StoreError::InvalidChoice { field: $field, value: value.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                $name::parse(value.as_str()?).map_err(|err| FromSqlError::Other(Box::new(err)))
            }
        }
    };
}

text_choice!(AssetType, "asset_type", {
    Server = "server",
    NetworkDevice = "networkdevice",
    StorageDevice = "storagedevice",
    SecurityDevice = "securitydevice",
    Software = "software",
});

/// The approval zone also accepts IDC entries.
text_choice!(ApprovalAssetType, "asset_type", {
    Server = "server",
    NetworkDevice = "networkdevice",
    StorageDevice = "storagedevice",
    SecurityDevice = "securitydevice",
    Idc = "IDC",
    Software = "software",
});

int_choice!(AssetStatus, "status", {
    Online = 0 => "online",
    Offline = 1 => "offline",
    Unknown = 2 => "unknown",
    Fault = 3 => "fault",
    Backup = 4 => "backup",
});

int_choice!(ServerSubType, "server.sub_asset_type", {
    PcServer = 0 => "pc_server",
    BladeComputer = 1 => "blade_computer",
    MiniComputer = 2 => "mini_computer",
});

text_choice!(CreatedBy, "created_by", {
    Auto = "auto",
    Manual = "manual",
});

int_choice!(NetworkDeviceSubType, "network_device.sub_asset_type", {
    Router = 0 => "router",
    Switch = 1 => "switch",
    LoadBalancer = 2 => "load_balancer",
    VpnDevice = 4 => "vpn_device",
});

int_choice!(StorageDeviceSubType, "storage_device.sub_asset_type", {
    DiskArray = 0 => "disk_array",
    NetworkStorage = 1 => "network_storage",
    TapeLibrary = 2 => "tape_library",
    TapeMachine = 4 => "tape_machine",
});

int_choice!(SecurityDeviceSubType, "security_device.sub_asset_type", {
    Firewall = 0 => "firewall",
    IntrusionDetection = 1 => "intrusion_detection",
    InternetGateway = 2 => "internet_gateway",
    MaintenanceSystem = 4 => "maintenance_system",
});

int_choice!(SoftwareSubType, "software.sub_asset_type", {
    OperatingSystem = 0 => "operating_system",
    OfficeDevelopment = 1 => "office_development",
    BusinessSoftware = 2 => "business_software",
});

text_choice!(DiskInterface, "interface_type", {
    Sata = "SATA",
    Sas = "SAS",
    Scsi = "SCSI",
    Ssd = "SSD",
    Unknown = "unknown",
});

int_choice!(EventType, "event_type", {
    Other = 0 => "other",
    HardwareChange = 1 => "hardware_change",
    NewAsset = 2 => "new_asset",
    AssetOffline = 3 => "asset_offline",
    AssetOnline = 4 => "asset_online",
    Maintenance = 5 => "maintenance",
    BusinessUpdate = 6 => "business_update",
});

impl Default for AssetType {
    fn default() -> Self {
        AssetType::Server
    }
}

impl Default for AssetStatus {
    fn default() -> Self {
        AssetStatus::Online
    }
}

impl Default for ServerSubType {
    fn default() -> Self {
        ServerSubType::PcServer
    }
}

impl Default for CreatedBy {
    fn default() -> Self {
        CreatedBy::Auto
    }
}

impl Default for DiskInterface {
    fn default() -> Self {
        DiskInterface::Unknown
    }
}

impl Default for EventType {
    fn default() -> Self {
        EventType::AssetOnline
    }
}

//
// Rows. `id` is assigned by the database and ignored on insert.
//

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Asset {
    pub id: i64,
    pub asset_type: AssetType,
    pub name: String,
    pub sn: String,
    pub business_unit_id: Option<i64>,
    pub status: AssetStatus,
    pub manufacturer_id: Option<i64>,
    pub manage_ip: Option<String>,
    pub admin_id: Option<i64>,
    pub idc_id: Option<i64>,
    pub contract_id: Option<i64>,
    pub purchase_day: Option<NaiveDate>,
    pub expire_day: Option<NaiveDate>,
    pub price: Option<f64>,
    pub approved_by_id: Option<i64>,
    pub memo: Option<String>,
    pub c_time: Option<NaiveDateTime>,
    pub m_time: Option<NaiveDateTime>,
}

/// Reference fields set on an existing asset. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    pub business_unit_id: Option<i64>,
    pub idc_id: Option<i64>,
    pub contract_id: Option<i64>,
    pub admin_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Server {
    pub id: i64,
    pub asset_id: i64,
    pub sub_asset_type: ServerSubType,
    pub created_by: CreatedBy,
    /// Host machine, for virtual machines
    pub hosted_on_id: Option<i64>,
    pub model: Option<String>,
    pub raid_type: Option<String>,
    pub os_type: Option<String>,
    pub os_distribution: Option<String>,
    pub os_release: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkDevice {
    pub id: i64,
    pub asset_id: i64,
    pub sub_asset_type: NetworkDeviceSubType,
    pub vlan_ip: Option<String>,
    pub intranet_ip: Option<String>,
    pub model: Option<String>,
    pub firmware: Option<String>,
    pub port_num: Option<i64>,
    pub device_detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageDevice {
    pub id: i64,
    pub asset_id: i64,
    pub sub_asset_type: StorageDeviceSubType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityDevice {
    pub id: i64,
    pub asset_id: i64,
    pub sub_asset_type: SecurityDeviceSubType,
}

/// Only paid software is tracked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Software {
    pub id: i64,
    pub asset_id: i64,
    pub sub_asset_type: SoftwareSubType,
    pub license_num: i64,
    /// e.g. "CentOS release 6.7 (Final)"
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
    pub telephone: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BusinessUnit {
    pub id: i64,
    pub parent_unit_id: Option<i64>,
    pub name: String,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Idc {
    pub id: i64,
    pub name: String,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Contract {
    pub id: i64,
    pub sn: String,
    pub name: String,
    pub memo: Option<String>,
    pub price: i64,
    pub detail: Option<String>,
    pub start_day: Option<NaiveDate>,
    pub end_day: Option<NaiveDate>,
    pub license_num: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub c_day: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cpu {
    pub id: i64,
    pub asset_id: i64,
    pub cpu_model: Option<String>,
    pub cpu_count: i64,
    pub cpu_core_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ram {
    pub id: i64,
    pub asset_id: i64,
    pub sn: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub slot: String,
    /// MB
    pub capacity: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Disk {
    pub id: i64,
    pub asset_id: i64,
    pub sn: String,
    pub slot: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    /// GB
    pub capacity: Option<f64>,
    pub interface_type: DiskInterface,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Nic {
    pub id: i64,
    pub asset_id: i64,
    pub name: Option<String>,
    pub model: String,
    /// Virtual machines can share MACs, so uniqueness is per asset+model+mac
    pub mac: String,
    pub ip_address: Option<String>,
    pub net_mask: Option<String>,
    pub bonding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingAsset {
    pub id: i64,
    pub sn: String,
    pub asset_type: Option<ApprovalAssetType>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub ram_size: Option<i64>,
    pub cpu_model: Option<String>,
    pub cpu_count: Option<i64>,
    pub cpu_core_count: Option<i64>,
    pub os_distribution: Option<String>,
    pub os_type: Option<String>,
    pub os_release: Option<String>,
    /// Raw report snapshot
    pub data: String,
    pub c_time: NaiveDateTime,
    pub m_time: NaiveDateTime,
    pub approved: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventLog {
    pub id: i64,
    pub name: String,
    pub event_type: EventType,
    /// Set when the event concerns an approved asset
    pub asset_id: Option<i64>,
    /// Set when the event concerns an approval zone entry
    pub new_asset_id: Option<i64>,
    pub component: Option<String>,
    pub detail: String,
    pub date: Option<NaiveDateTime>,
    /// Empty for automatic updates
    pub user_id: Option<i64>,
    pub memo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_choice_codes() {
        assert_eq!(AssetStatus::Backup.code(), 4);
        assert_eq!(AssetStatus::from_code(3).unwrap(), AssetStatus::Fault);
        assert_eq!(NetworkDeviceSubType::from_code(4).unwrap(), NetworkDeviceSubType::VpnDevice);
        // 3 is not a valid network device type
        assert!(NetworkDeviceSubType::from_code(3).is_err());
        assert_eq!(EventType::default().code(), 4);
    }

    #[test]
    fn test_int_choice_parse() {
        assert_eq!(AssetStatus::parse("offline").unwrap(), AssetStatus::Offline);
        assert_eq!(AssetStatus::parse("Backup").unwrap(), AssetStatus::Backup);
        assert_eq!(AssetStatus::parse("3").unwrap(), AssetStatus::Fault);
        assert_eq!(SecurityDeviceSubType::parse("firewall").unwrap(), SecurityDeviceSubType::Firewall);
        assert!(matches!(AssetStatus::parse("9"), Err(StoreError::InvalidChoice { .. })));
        assert!(matches!(
            NetworkDeviceSubType::parse("hub"),
            Err(StoreError::InvalidChoice { field: "network_device.sub_asset_type", .. })
        ));
    }

    #[test]
    fn test_text_choice_values() {
        assert_eq!(AssetType::parse("securitydevice").unwrap(), AssetType::SecurityDevice);
        assert_eq!(ApprovalAssetType::parse("IDC").unwrap(), ApprovalAssetType::Idc);
        assert!(AssetType::parse("IDC").is_err());
        assert_eq!(DiskInterface::default().as_str(), "unknown");
        assert_eq!(CreatedBy::Manual.to_string(), "manual");
    }

    #[test]
    #[should_panic(expected = "InvalidChoice")]
    fn test_invalid_text_choice() {
        let _ = DiskInterface::parse("NVMe").unwrap();
    }

    #[test]
    fn test_invalid_choice_read_back() {
        let connection = rusqlite::Connection::open_in_memory().unwrap();
        let result: Result<AssetStatus, StoreError> = connection
            .query_row("SELECT 9", (), |row| row.get(0))
            .map_err(StoreError::from);
        match result {
            Err(StoreError::InvalidChoice { field, value }) => {
                assert_eq!(field, "status");
                assert_eq!(value, "9");
            }
            other => panic!("unexpected result {other:?}"),
        }

        let interface: AssetType = connection
            .query_row("SELECT 'software'", (), |row| row.get(0))
            .unwrap();
        assert_eq!(interface, AssetType::Software);
    }

    #[test]
    fn test_choice_serialize() {
        assert_eq!(serde_json::to_string(&AssetType::NetworkDevice).unwrap(), "\"networkdevice\"");
        assert_eq!(serde_json::to_string(&AssetStatus::Offline).unwrap(), "\"offline\"");
        assert_eq!(serde_json::to_string(&DiskInterface::Ssd).unwrap(), "\"SSD\"");
    }
}

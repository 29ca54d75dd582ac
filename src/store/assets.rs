use std::net::IpAddr;

use log::info;
use rusqlite::{params, OptionalExtension, Row};

use super::models::{
    Asset, AssetStatus, Assignment, EventLog, EventType, NetworkDevice, SecurityDevice, Server,
    Software, StorageDevice, Tag,
};
use super::{now, AssetStore, StoreError};

const ASSET_COLUMNS: &str = "id, asset_type, name, sn, business_unit_id, status, manufacturer_id, manage_ip, \
    admin_id, idc_id, contract_id, purchase_day, expire_day, price, approved_by_id, memo, c_time, m_time";

/// IP address columns must hold a valid IPv4 or IPv6 address.
pub(super) fn check_ip(field: &'static str, value: &Option<String>) -> Result<(), StoreError> {
    match value {
        Some(ip) if ip.parse::<IpAddr>().is_err() => Err(StoreError::InvalidValue {
            field,
            value: ip.clone(),
        }),
        _ => Ok(()),
    }
}

fn asset_from_row(row: &Row) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: row.get("id")?,
        asset_type: row.get("asset_type")?,
        name: row.get("name")?,
        sn: row.get("sn")?,
        business_unit_id: row.get("business_unit_id")?,
        status: row.get("status")?,
        manufacturer_id: row.get("manufacturer_id")?,
        manage_ip: row.get("manage_ip")?,
        admin_id: row.get("admin_id")?,
        idc_id: row.get("idc_id")?,
        contract_id: row.get("contract_id")?,
        purchase_day: row.get("purchase_day")?,
        expire_day: row.get("expire_day")?,
        price: row.get("price")?,
        approved_by_id: row.get("approved_by_id")?,
        memo: row.get("memo")?,
        c_time: row.get("c_time")?,
        m_time: row.get("m_time")?,
    })
}

fn server_from_row(row: &Row) -> rusqlite::Result<Server> {
    Ok(Server {
        id: row.get("id")?,
        asset_id: row.get("asset_id")?,
        sub_asset_type: row.get("sub_asset_type")?,
        created_by: row.get("created_by")?,
        hosted_on_id: row.get("hosted_on_id")?,
        model: row.get("model")?,
        raid_type: row.get("raid_type")?,
        os_type: row.get("os_type")?,
        os_distribution: row.get("os_distribution")?,
        os_release: row.get("os_release")?,
    })
}

impl AssetStore {
    pub fn create_asset(&self, asset: &Asset) -> Result<i64, StoreError> {
        check_ip("manage_ip", &asset.manage_ip)?;
        let created = now();
        self.conn.execute(
            "INSERT INTO assets(asset_type, name, sn, business_unit_id, status, manufacturer_id, manage_ip,
                admin_id, idc_id, contract_id, purchase_day, expire_day, price, approved_by_id, memo, c_time, m_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                asset.asset_type,
                asset.name,
                asset.sn,
                asset.business_unit_id,
                asset.status,
                asset.manufacturer_id,
                asset.manage_ip,
                asset.admin_id,
                asset.idc_id,
                asset.contract_id,
                asset.purchase_day,
                asset.expire_day,
                asset.price,
                asset.approved_by_id,
                asset.memo,
                created,
                created
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_asset(&self, id: i64) -> Result<Asset, StoreError> {
        let query = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?1");
        self.conn
            .query_row(&query, params![id], asset_from_row)
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("asset {id}")))
    }

    pub fn find_asset_by_sn(&self, sn: &str) -> Result<Option<Asset>, StoreError> {
        let query = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE sn = ?1");
        Ok(self.conn.query_row(&query, params![sn], asset_from_row).optional()?)
    }

    /// Newest first.
    pub fn list_assets(&self) -> Result<Vec<Asset>, StoreError> {
        let query = format!("SELECT {ASSET_COLUMNS} FROM assets ORDER BY c_time DESC, id DESC");
        let mut statement = self.conn.prepare(&query)?;
        let rows = statement.query_map((), asset_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn set_manage_ip(&self, asset_id: i64, manage_ip: Option<&str>) -> Result<(), StoreError> {
        let manage_ip = manage_ip.map(str::to_string);
        check_ip("manage_ip", &manage_ip)?;
        let changed = self.conn.execute(
            "UPDATE assets SET manage_ip = ?1, m_time = ?2 WHERE id = ?3",
            params![manage_ip, now(), asset_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("asset {asset_id}")));
        }
        Ok(())
    }

    /// Change the asset status and record it in the event log. Returns false when
    /// the asset already had that status.
    pub fn set_status(
        &self,
        asset_id: i64,
        status: AssetStatus,
        user_id: Option<i64>,
    ) -> Result<bool, StoreError> {
        let asset = self.get_asset(asset_id)?;
        if asset.status == status {
            return Ok(false);
        }

        self.conn.execute(
            "UPDATE assets SET status = ?1, m_time = ?2 WHERE id = ?3",
            params![status, now(), asset_id],
        )?;

        let event_type = if status == AssetStatus::Online {
            EventType::AssetOnline
        } else {
            EventType::AssetOffline
        };
        self.log_event(&EventLog {
            name: asset.name.clone(),
            event_type,
            asset_id: Some(asset_id),
            detail: format!("status changed from {} to {}", asset.status, status),
            user_id,
            ..Default::default()
        })?;
        info!("[store] Asset {} is now {status}", asset.name);
        Ok(true)
    }

    /// Point the asset at its business unit, IDC, contract and admin. Each change
    /// is recorded as a business update.
    pub fn assign(
        &self,
        asset_id: i64,
        assignment: &Assignment,
        user_id: Option<i64>,
    ) -> Result<Asset, StoreError> {
        let asset = self.get_asset(asset_id)?;
        let mut changed = Vec::new();
        let fields = [
            ("business_unit", asset.business_unit_id, assignment.business_unit_id),
            ("idc", asset.idc_id, assignment.idc_id),
            ("contract", asset.contract_id, assignment.contract_id),
            ("admin", asset.admin_id, assignment.admin_id),
        ];
        let show = |id: Option<i64>| id.map_or_else(|| String::from("none"), |id| id.to_string());
        for (field, current, wanted) in fields {
            if wanted.is_some() && wanted != current {
                changed.push(format!("{field} {} -> {}", show(current), show(wanted)));
            }
        }
        if changed.is_empty() {
            return Ok(asset);
        }

        self.conn.execute(
            "UPDATE assets SET
                business_unit_id = COALESCE(?1, business_unit_id),
                idc_id = COALESCE(?2, idc_id),
                contract_id = COALESCE(?3, contract_id),
                admin_id = COALESCE(?4, admin_id),
                m_time = ?5
             WHERE id = ?6",
            params![
                assignment.business_unit_id,
                assignment.idc_id,
                assignment.contract_id,
                assignment.admin_id,
                now(),
                asset_id
            ],
        )?;
        self.log_event(&EventLog {
            name: asset.name.clone(),
            event_type: EventType::BusinessUpdate,
            asset_id: Some(asset_id),
            detail: changed.join(", "),
            user_id,
            ..Default::default()
        })?;
        info!("[store] Updated assignment of {}", asset.name);
        self.get_asset(asset_id)
    }

    /// Event log rows that reference the asset are kept with the asset cleared.
    pub fn delete_asset(&self, asset_id: i64) -> Result<(), StoreError> {
        let deleted = self.conn.execute("DELETE FROM assets WHERE id = ?1", params![asset_id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("asset {asset_id}")));
        }
        info!("[store] Deleted asset {asset_id}");
        Ok(())
    }

    pub fn tag_asset(&self, asset_id: i64, tag_id: i64) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO asset_tags(asset_id, tag_id) VALUES (?1, ?2)",
            params![asset_id, tag_id],
        )?;
        Ok(())
    }

    pub fn asset_tags(&self, asset_id: i64) -> Result<Vec<Tag>, StoreError> {
        let mut statement = self.conn.prepare(
            "SELECT tags.id, tags.name, tags.c_day FROM tags
             JOIN asset_tags ON asset_tags.tag_id = tags.id
             WHERE asset_tags.asset_id = ?1 ORDER BY tags.name",
        )?;
        let rows = statement.query_map(params![asset_id], |row| {
            Ok(Tag {
                id: row.get("id")?,
                name: row.get("name")?,
                c_day: row.get("c_day")?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn add_server(&self, server: &Server) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO servers(asset_id, sub_asset_type, created_by, hosted_on_id, model, raid_type,
                os_type, os_distribution, os_release)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                server.asset_id,
                server.sub_asset_type,
                server.created_by,
                server.hosted_on_id,
                server.model,
                server.raid_type,
                server.os_type,
                server.os_distribution,
                server.os_release
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_server(&self, asset_id: i64) -> Result<Option<Server>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, asset_id, sub_asset_type, created_by, hosted_on_id, model, raid_type,
                    os_type, os_distribution, os_release
                 FROM servers WHERE asset_id = ?1",
                params![asset_id],
                server_from_row,
            )
            .optional()?)
    }

    /// Refresh the reported fields of a server. Returns the names of the fields that changed.
    pub(crate) fn update_server_facts(&self, server: &Server) -> Result<Vec<&'static str>, StoreError> {
        let current = self
            .get_server(server.asset_id)?
            .ok_or_else(|| StoreError::NotFound(format!("server for asset {}", server.asset_id)))?;

        let mut changed = Vec::new();
        if current.model != server.model {
            changed.push("model");
        }
        if current.os_type != server.os_type {
            changed.push("os_type");
        }
        if current.os_distribution != server.os_distribution {
            changed.push("os_distribution");
        }
        if current.os_release != server.os_release {
            changed.push("os_release");
        }
        if changed.is_empty() {
            return Ok(changed);
        }

        self.conn.execute(
            "UPDATE servers SET model = ?1, os_type = ?2, os_distribution = ?3, os_release = ?4 WHERE id = ?5",
            params![
                server.model,
                server.os_type,
                server.os_distribution,
                server.os_release,
                current.id
            ],
        )?;
        Ok(changed)
    }

    pub fn add_network_device(&self, device: &NetworkDevice) -> Result<i64, StoreError> {
        check_ip("vlan_ip", &device.vlan_ip)?;
        check_ip("intranet_ip", &device.intranet_ip)?;
        self.conn.execute(
            "INSERT INTO network_devices(asset_id, sub_asset_type, vlan_ip, intranet_ip, model, firmware,
                port_num, device_detail)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                device.asset_id,
                device.sub_asset_type,
                device.vlan_ip,
                device.intranet_ip,
                device.model,
                device.firmware,
                device.port_num,
                device.device_detail
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_network_device(&self, asset_id: i64) -> Result<Option<NetworkDevice>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, asset_id, sub_asset_type, vlan_ip, intranet_ip, model, firmware, port_num, device_detail
                 FROM network_devices WHERE asset_id = ?1",
                params![asset_id],
                |row| {
                    Ok(NetworkDevice {
                        id: row.get("id")?,
                        asset_id: row.get("asset_id")?,
                        sub_asset_type: row.get("sub_asset_type")?,
                        vlan_ip: row.get("vlan_ip")?,
                        intranet_ip: row.get("intranet_ip")?,
                        model: row.get("model")?,
                        firmware: row.get("firmware")?,
                        port_num: row.get("port_num")?,
                        device_detail: row.get("device_detail")?,
                    })
                },
            )
            .optional()?)
    }

    pub fn add_storage_device(&self, device: &StorageDevice) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO storage_devices(asset_id, sub_asset_type) VALUES (?1, ?2)",
            params![device.asset_id, device.sub_asset_type],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_storage_device(&self, asset_id: i64) -> Result<Option<StorageDevice>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, asset_id, sub_asset_type FROM storage_devices WHERE asset_id = ?1",
                params![asset_id],
                |row| {
                    Ok(StorageDevice {
                        id: row.get("id")?,
                        asset_id: row.get("asset_id")?,
                        sub_asset_type: row.get("sub_asset_type")?,
                    })
                },
            )
            .optional()?)
    }

    pub fn add_security_device(&self, device: &SecurityDevice) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO security_devices(asset_id, sub_asset_type) VALUES (?1, ?2)",
            params![device.asset_id, device.sub_asset_type],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_security_device(&self, asset_id: i64) -> Result<Option<SecurityDevice>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, asset_id, sub_asset_type FROM security_devices WHERE asset_id = ?1",
                params![asset_id],
                |row| {
                    Ok(SecurityDevice {
                        id: row.get("id")?,
                        asset_id: row.get("asset_id")?,
                        sub_asset_type: row.get("sub_asset_type")?,
                    })
                },
            )
            .optional()?)
    }

    pub fn add_software(&self, software: &Software) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO software(asset_id, sub_asset_type, license_num, version) VALUES (?1, ?2, ?3, ?4)",
            params![
                software.asset_id,
                software.sub_asset_type,
                software.license_num,
                software.version
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_software(&self, asset_id: i64) -> Result<Option<Software>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, asset_id, sub_asset_type, license_num, version FROM software WHERE asset_id = ?1",
                params![asset_id],
                |row| {
                    Ok(Software {
                        id: row.get("id")?,
                        asset_id: row.get("asset_id")?,
                        sub_asset_type: row.get("sub_asset_type")?,
                        license_num: row.get("license_num")?,
                        version: row.get("version")?,
                    })
                },
            )
            .optional()?)
    }
}

#[cfg(test)]
mod tests {
    use crate::store::models::{
        Asset, AssetStatus, AssetType, Assignment, BusinessUnit, EventType, Idc, NetworkDevice,
        NetworkDeviceSubType, SecurityDevice, SecurityDeviceSubType, Server, ServerSubType, Software,
        SoftwareSubType, StorageDevice, StorageDeviceSubType,
    };
    use crate::store::{AssetStore, StoreError};
    use chrono::NaiveDate;

    fn server_asset(name: &str, sn: &str) -> Asset {
        Asset {
            name: name.to_string(),
            sn: sn.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_and_get_asset() {
        let store = AssetStore::open_in_memory().unwrap();
        let vendor = store.get_or_create_manufacturer("Dell Inc.").unwrap();
        let asset = Asset {
            manufacturer_id: Some(vendor),
            manage_ip: Some(String::from("10.0.0.5")),
            purchase_day: NaiveDate::from_ymd_opt(2023, 5, 1),
            price: Some(4999.5),
            ..server_asset("web01", "SN-WEB01")
        };
        let id = store.create_asset(&asset).unwrap();

        let stored = store.get_asset(id).unwrap();
        assert_eq!(stored.asset_type, AssetType::Server);
        assert_eq!(stored.status, AssetStatus::Online);
        assert_eq!(stored.manufacturer_id, Some(vendor));
        assert_eq!(stored.purchase_day, NaiveDate::from_ymd_opt(2023, 5, 1));
        assert!(stored.c_time.is_some());
        assert_eq!(stored.c_time, stored.m_time);

        assert_eq!(store.find_asset_by_sn("SN-WEB01").unwrap().unwrap().id, id);
        assert!(store.find_asset_by_sn("missing").unwrap().is_none());
    }

    #[test]
    #[should_panic(expected = "Constraint")]
    fn test_duplicate_sn() {
        let store = AssetStore::open_in_memory().unwrap();
        store.create_asset(&server_asset("web01", "SN-1")).unwrap();
        store.create_asset(&server_asset("web02", "SN-1")).unwrap();
    }

    #[test]
    fn test_duplicate_name() {
        let store = AssetStore::open_in_memory().unwrap();
        store.create_asset(&server_asset("web01", "SN-1")).unwrap();
        let result = store.create_asset(&server_asset("web01", "SN-2"));
        assert!(matches!(result, Err(StoreError::Constraint(_))));
    }

    #[test]
    fn test_invalid_manage_ip() {
        let store = AssetStore::open_in_memory().unwrap();
        let asset = Asset {
            manage_ip: Some(String::from("10.0.0.300")),
            ..server_asset("web01", "SN-1")
        };
        match store.create_asset(&asset) {
            Err(StoreError::InvalidValue { field, .. }) => assert_eq!(field, "manage_ip"),
            other => panic!("unexpected result {other:?}"),
        }

        let id = store.create_asset(&server_asset("web01", "SN-1")).unwrap();
        store.set_manage_ip(id, Some("fe80::1")).unwrap();
        assert_eq!(store.get_asset(id).unwrap().manage_ip.as_deref(), Some("fe80::1"));
        assert!(store.set_manage_ip(id, Some("not-an-ip")).is_err());
    }

    #[test]
    fn test_invalid_choice_rejected_by_database() {
        let store = AssetStore::open_in_memory().unwrap();
        let bad_type = store.conn.execute(
            "INSERT INTO assets(asset_type, name, sn, c_time, m_time) VALUES ('IDC', 'a', 'b', '', '')",
            (),
        );
        assert!(matches!(bad_type.map_err(StoreError::from), Err(StoreError::Constraint(_))));

        let bad_status = store.conn.execute(
            "INSERT INTO assets(status, name, sn, c_time, m_time) VALUES (7, 'a', 'b', '', '')",
            (),
        );
        assert!(matches!(bad_status.map_err(StoreError::from), Err(StoreError::Constraint(_))));
    }

    #[test]
    fn test_list_newest_first() {
        let store = AssetStore::open_in_memory().unwrap();
        let first = store.create_asset(&server_asset("a", "1")).unwrap();
        let second = store.create_asset(&server_asset("b", "2")).unwrap();
        let assets = store.list_assets().unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].id, second);
        assert_eq!(assets[1].id, first);
    }

    #[test]
    fn test_set_status_logs_event() {
        let store = AssetStore::open_in_memory().unwrap();
        let id = store.create_asset(&server_asset("db01", "SN-DB")).unwrap();

        assert!(!store.set_status(id, AssetStatus::Online, None).unwrap());
        assert!(store.set_status(id, AssetStatus::Offline, None).unwrap());
        assert!(store.set_status(id, AssetStatus::Online, None).unwrap());

        let events = store.events_for_asset(id).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::AssetOnline);
        assert_eq!(events[1].event_type, EventType::AssetOffline);
        assert_eq!(events[1].detail, "status changed from online to offline");
    }

    #[test]
    fn test_delete_keeps_events() {
        let store = AssetStore::open_in_memory().unwrap();
        let id = store.create_asset(&server_asset("db01", "SN-DB")).unwrap();
        store.set_status(id, AssetStatus::Fault, None).unwrap();
        store.delete_asset(id).unwrap();

        assert!(matches!(store.get_asset(id), Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete_asset(id), Err(StoreError::NotFound(_))));

        let events = store.list_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].asset_id, None);
        assert_eq!(events[0].name, "db01");
        assert_eq!(events[0].event_type, EventType::AssetOffline);
    }

    #[test]
    fn test_tags() {
        let store = AssetStore::open_in_memory().unwrap();
        let id = store.create_asset(&server_asset("db01", "SN-DB")).unwrap();
        let tag = store.add_tag("production").unwrap();
        store.tag_asset(id, tag).unwrap();
        store.tag_asset(id, tag).unwrap();
        let tags = store.asset_tags(id).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "production");

        // unknown tag
        assert!(store.tag_asset(id, 42).is_err());
    }

    #[test]
    fn test_server_extension() {
        let store = AssetStore::open_in_memory().unwrap();
        let host = store.create_asset(&server_asset("host01", "SN-H")).unwrap();
        let guest = store.create_asset(&server_asset("vm01", "SN-V")).unwrap();
        let host_server = store
            .add_server(&Server {
                asset_id: host,
                model: Some(String::from("PowerEdge R740")),
                ..Default::default()
            })
            .unwrap();
        store
            .add_server(&Server {
                asset_id: guest,
                sub_asset_type: ServerSubType::BladeComputer,
                hosted_on_id: Some(host_server),
                ..Default::default()
            })
            .unwrap();

        let stored = store.get_server(guest).unwrap().unwrap();
        assert_eq!(stored.hosted_on_id, Some(host_server));
        assert_eq!(stored.sub_asset_type, ServerSubType::BladeComputer);

        // one to one
        let duplicate = store.add_server(&Server {
            asset_id: host,
            ..Default::default()
        });
        assert!(matches!(duplicate, Err(StoreError::Constraint(_))));
    }

    #[test]
    fn test_network_device_ips() {
        let store = AssetStore::open_in_memory().unwrap();
        let id = store
            .create_asset(&Asset {
                asset_type: AssetType::NetworkDevice,
                ..server_asset("sw01", "SN-SW")
            })
            .unwrap();

        let mut device = NetworkDevice {
            id: 0,
            asset_id: id,
            sub_asset_type: NetworkDeviceSubType::Switch,
            vlan_ip: Some(String::from("vlan10")),
            intranet_ip: None,
            model: None,
            firmware: None,
            port_num: Some(48),
            device_detail: None,
        };
        assert!(matches!(
            store.add_network_device(&device),
            Err(StoreError::InvalidValue { field: "vlan_ip", .. })
        ));

        device.vlan_ip = Some(String::from("192.168.10.1"));
        store.add_network_device(&device).unwrap();
        let stored = store.get_network_device(id).unwrap().unwrap();
        assert_eq!(stored.port_num, Some(48));
        assert_eq!(stored.sub_asset_type, NetworkDeviceSubType::Switch);
    }

    #[test]
    fn test_software_version_unique() {
        let store = AssetStore::open_in_memory().unwrap();
        let first = store
            .create_asset(&Asset {
                asset_type: AssetType::Software,
                ..server_asset("centos", "SW-1")
            })
            .unwrap();
        let second = store
            .create_asset(&Asset {
                asset_type: AssetType::Software,
                ..server_asset("centos-copy", "SW-2")
            })
            .unwrap();

        let software = Software {
            id: 0,
            asset_id: first,
            sub_asset_type: SoftwareSubType::OperatingSystem,
            license_num: 1,
            version: String::from("CentOS release 6.7 (Final)"),
        };
        store.add_software(&software).unwrap();
        assert_eq!(store.get_software(first).unwrap().unwrap().version, software.version);

        let duplicate = store.add_software(&Software {
            asset_id: second,
            ..software
        });
        assert!(matches!(duplicate, Err(StoreError::Constraint(_))));

        store
            .add_storage_device(&StorageDevice {
                id: 0,
                asset_id: second,
                sub_asset_type: StorageDeviceSubType::TapeMachine,
            })
            .unwrap();
        let storage = store.get_storage_device(second).unwrap().unwrap();
        assert_eq!(storage.sub_asset_type, StorageDeviceSubType::TapeMachine);
        assert!(store.get_storage_device(first).unwrap().is_none());
    }

    #[test]
    fn test_security_device() {
        let store = AssetStore::open_in_memory().unwrap();
        let id = store
            .create_asset(&Asset {
                asset_type: AssetType::SecurityDevice,
                ..server_asset("fw01", "SN-FW")
            })
            .unwrap();
        let device = SecurityDevice {
            id: 0,
            asset_id: id,
            sub_asset_type: SecurityDeviceSubType::Firewall,
        };
        store.add_security_device(&device).unwrap();
        let stored = store.get_security_device(id).unwrap().unwrap();
        assert_eq!(stored.sub_asset_type, SecurityDeviceSubType::Firewall);

        assert!(matches!(store.add_security_device(&device), Err(StoreError::Constraint(_))));
        let orphan = SecurityDevice { asset_id: 99, ..device };
        assert!(matches!(store.add_security_device(&orphan), Err(StoreError::Constraint(_))));
    }

    #[test]
    fn test_assign_logs_business_update() {
        let store = AssetStore::open_in_memory().unwrap();
        let id = store.create_asset(&server_asset("db01", "SN-DB")).unwrap();
        let unit = store
            .add_business_unit(&BusinessUnit {
                name: String::from("payments"),
                ..Default::default()
            })
            .unwrap();
        let idc = store
            .add_idc(&Idc {
                name: String::from("dc-east"),
                ..Default::default()
            })
            .unwrap();
        let admin = store.add_user("ops").unwrap();

        let assignment = Assignment {
            business_unit_id: Some(unit),
            idc_id: Some(idc),
            admin_id: Some(admin),
            ..Default::default()
        };
        let asset = store.assign(id, &assignment, Some(admin)).unwrap();
        assert_eq!(asset.business_unit_id, Some(unit));
        assert_eq!(asset.idc_id, Some(idc));
        assert_eq!(asset.admin_id, Some(admin));
        assert_eq!(asset.contract_id, None);

        // unchanged fields do not log again
        store.assign(id, &assignment, None).unwrap();
        store.assign(id, &Assignment::default(), None).unwrap();
        let events = store.events_for_asset(id).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::BusinessUpdate);
        assert_eq!(events[0].user_id, Some(admin));

        let missing_contract = Assignment {
            contract_id: Some(42),
            ..Default::default()
        };
        assert!(matches!(store.assign(id, &missing_contract, None), Err(StoreError::Constraint(_))));
        assert!(matches!(store.assign(99, &assignment, None), Err(StoreError::NotFound(_))));
    }
}

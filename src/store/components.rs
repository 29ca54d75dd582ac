use rusqlite::{params, OptionalExtension};

use super::assets::check_ip;
use super::models::{Cpu, Disk, Nic, Ram};
use super::{AssetStore, StoreError};

/// Component tables that hang off an asset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ComponentTable {
    Ram,
    Disk,
    Nic,
}

impl ComponentTable {
    fn table(self) -> &'static str {
        match self {
            ComponentTable::Ram => "rams",
            ComponentTable::Disk => "disks",
            ComponentTable::Nic => "nics",
        }
    }
}

impl AssetStore {
    /// Insert or replace the CPU summary of an asset.
    pub fn set_cpu(&self, cpu: &Cpu) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO cpus(asset_id, cpu_model, cpu_count, cpu_core_count) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(asset_id) DO UPDATE SET
                cpu_model = excluded.cpu_model,
                cpu_count = excluded.cpu_count,
                cpu_core_count = excluded.cpu_core_count",
            params![cpu.asset_id, cpu.cpu_model, cpu.cpu_count, cpu.cpu_core_count],
        )?;
        Ok(())
    }

    pub fn get_cpu(&self, asset_id: i64) -> Result<Option<Cpu>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, asset_id, cpu_model, cpu_count, cpu_core_count FROM cpus WHERE asset_id = ?1",
                params![asset_id],
                |row| {
                    Ok(Cpu {
                        id: row.get("id")?,
                        asset_id: row.get("asset_id")?,
                        cpu_model: row.get("cpu_model")?,
                        cpu_count: row.get("cpu_count")?,
                        cpu_core_count: row.get("cpu_core_count")?,
                    })
                },
            )
            .optional()?)
    }

    pub fn add_ram(&self, ram: &Ram) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO rams(asset_id, sn, model, manufacturer, slot, capacity) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![ram.asset_id, ram.sn, ram.model, ram.manufacturer, ram.slot, ram.capacity],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_ram(&self, ram: &Ram) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE rams SET sn = ?1, model = ?2, manufacturer = ?3, slot = ?4, capacity = ?5 WHERE id = ?6",
            params![ram.sn, ram.model, ram.manufacturer, ram.slot, ram.capacity, ram.id],
        )?;
        Ok(())
    }

    /// Memory modules ordered by slot.
    pub fn rams(&self, asset_id: i64) -> Result<Vec<Ram>, StoreError> {
        let mut statement = self.conn.prepare(
            "SELECT id, asset_id, sn, model, manufacturer, slot, capacity FROM rams WHERE asset_id = ?1 ORDER BY slot",
        )?;
        let rows = statement.query_map(params![asset_id], |row| {
            Ok(Ram {
                id: row.get("id")?,
                asset_id: row.get("asset_id")?,
                sn: row.get("sn")?,
                model: row.get("model")?,
                manufacturer: row.get("manufacturer")?,
                slot: row.get("slot")?,
                capacity: row.get("capacity")?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn add_disk(&self, disk: &Disk) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO disks(asset_id, sn, slot, model, manufacturer, capacity, interface_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                disk.asset_id,
                disk.sn,
                disk.slot,
                disk.model,
                disk.manufacturer,
                disk.capacity,
                disk.interface_type
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_disk(&self, disk: &Disk) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE disks SET sn = ?1, slot = ?2, model = ?3, manufacturer = ?4, capacity = ?5, interface_type = ?6
             WHERE id = ?7",
            params![
                disk.sn,
                disk.slot,
                disk.model,
                disk.manufacturer,
                disk.capacity,
                disk.interface_type,
                disk.id
            ],
        )?;
        Ok(())
    }

    pub fn disks(&self, asset_id: i64) -> Result<Vec<Disk>, StoreError> {
        let mut statement = self.conn.prepare(
            "SELECT id, asset_id, sn, slot, model, manufacturer, capacity, interface_type
             FROM disks WHERE asset_id = ?1 ORDER BY slot, sn",
        )?;
        let rows = statement.query_map(params![asset_id], |row| {
            Ok(Disk {
                id: row.get("id")?,
                asset_id: row.get("asset_id")?,
                sn: row.get("sn")?,
                slot: row.get("slot")?,
                model: row.get("model")?,
                manufacturer: row.get("manufacturer")?,
                capacity: row.get("capacity")?,
                interface_type: row.get("interface_type")?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn add_nic(&self, nic: &Nic) -> Result<i64, StoreError> {
        check_ip("ip_address", &nic.ip_address)?;
        self.conn.execute(
            "INSERT INTO nics(asset_id, name, model, mac, ip_address, net_mask, bonding)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                nic.asset_id,
                nic.name,
                nic.model,
                nic.mac,
                nic.ip_address,
                nic.net_mask,
                nic.bonding
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_nic(&self, nic: &Nic) -> Result<(), StoreError> {
        check_ip("ip_address", &nic.ip_address)?;
        self.conn.execute(
            "UPDATE nics SET name = ?1, model = ?2, mac = ?3, ip_address = ?4, net_mask = ?5, bonding = ?6
             WHERE id = ?7",
            params![
                nic.name,
                nic.model,
                nic.mac,
                nic.ip_address,
                nic.net_mask,
                nic.bonding,
                nic.id
            ],
        )?;
        Ok(())
    }

    pub fn nics(&self, asset_id: i64) -> Result<Vec<Nic>, StoreError> {
        let mut statement = self.conn.prepare(
            "SELECT id, asset_id, name, model, mac, ip_address, net_mask, bonding
             FROM nics WHERE asset_id = ?1 ORDER BY name, mac",
        )?;
        let rows = statement.query_map(params![asset_id], |row| {
            Ok(Nic {
                id: row.get("id")?,
                asset_id: row.get("asset_id")?,
                name: row.get("name")?,
                model: row.get("model")?,
                mac: row.get("mac")?,
                ip_address: row.get("ip_address")?,
                net_mask: row.get("net_mask")?,
                bonding: row.get("bonding")?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub(crate) fn delete_component(&self, table: ComponentTable, id: i64) -> Result<(), StoreError> {
        let query = format!("DELETE FROM {} WHERE id = ?1", table.table());
        let deleted = self.conn.execute(&query, params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("{} row {id}", table.table())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ComponentTable;
    use crate::store::models::{Asset, Cpu, Disk, DiskInterface, Nic, Ram};
    use crate::store::{AssetStore, StoreError};

    fn store_with_asset() -> (AssetStore, i64) {
        let store = AssetStore::open_in_memory().unwrap();
        let id = store
            .create_asset(&Asset {
                name: String::from("node1"),
                sn: String::from("SN-NODE1"),
                ..Default::default()
            })
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_set_cpu_replaces() {
        let (store, id) = store_with_asset();
        store
            .set_cpu(&Cpu {
                asset_id: id,
                cpu_model: Some(String::from("Intel(R) Xeon(R) Gold 6130")),
                cpu_count: 2,
                cpu_core_count: 32,
                ..Default::default()
            })
            .unwrap();
        store
            .set_cpu(&Cpu {
                asset_id: id,
                cpu_model: Some(String::from("Intel(R) Xeon(R) Gold 6230")),
                cpu_count: 2,
                cpu_core_count: 40,
                ..Default::default()
            })
            .unwrap();

        let cpu = store.get_cpu(id).unwrap().unwrap();
        assert_eq!(cpu.cpu_core_count, 40);
        assert_eq!(cpu.cpu_model.as_deref(), Some("Intel(R) Xeon(R) Gold 6230"));
    }

    #[test]
    fn test_negative_core_count() {
        let (store, id) = store_with_asset();
        let result = store.set_cpu(&Cpu {
            asset_id: id,
            cpu_count: 1,
            cpu_core_count: -4,
            ..Default::default()
        });
        assert!(matches!(result, Err(StoreError::Constraint(_))));
    }

    #[test]
    fn test_ram_slot_unique() {
        let (store, id) = store_with_asset();
        let ram = Ram {
            asset_id: id,
            slot: String::from("DIMM_A1"),
            capacity: Some(16384),
            ..Default::default()
        };
        store.add_ram(&ram).unwrap();
        assert!(matches!(store.add_ram(&ram), Err(StoreError::Constraint(_))));

        let mut stored = store.rams(id).unwrap().remove(0);
        stored.capacity = Some(32768);
        store.update_ram(&stored).unwrap();
        assert_eq!(store.rams(id).unwrap()[0].capacity, Some(32768));

        store.delete_component(ComponentTable::Ram, stored.id).unwrap();
        assert!(store.rams(id).unwrap().is_empty());
        assert!(matches!(
            store.delete_component(ComponentTable::Ram, stored.id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_disk_interface() {
        let (store, id) = store_with_asset();
        store
            .add_disk(&Disk {
                asset_id: id,
                sn: String::from("S3Z9NB0K123456"),
                slot: Some(String::from("0:0:0:0")),
                capacity: Some(480.1),
                interface_type: DiskInterface::Ssd,
                ..Default::default()
            })
            .unwrap();

        let disks = store.disks(id).unwrap();
        assert_eq!(disks.len(), 1);
        assert_eq!(disks[0].interface_type, DiskInterface::Ssd);

        let bad = store.conn.execute(
            "INSERT INTO disks(asset_id, sn, interface_type) VALUES (?1, 'X', 'NVMe')",
            [id],
        );
        assert!(matches!(bad.map_err(StoreError::from), Err(StoreError::Constraint(_))));
    }

    #[test]
    fn test_nic_unique_per_model_and_mac() {
        let (store, id) = store_with_asset();
        let nic = Nic {
            asset_id: id,
            name: Some(String::from("eth0")),
            model: String::from("I350 Gigabit Network Connection"),
            mac: String::from("00:25:90:aa:bb:cc"),
            ..Default::default()
        };
        store.add_nic(&nic).unwrap();
        assert!(matches!(store.add_nic(&nic), Err(StoreError::Constraint(_))));

        // same mac with another model is a different card
        store
            .add_nic(&Nic {
                model: String::from("virtio"),
                ..nic.clone()
            })
            .unwrap();
        assert_eq!(store.nics(id).unwrap().len(), 2);
    }

    #[test]
    fn test_nic_ip_address_checked() {
        let (store, id) = store_with_asset();
        let nic = Nic {
            asset_id: id,
            model: String::from("I350 Gigabit Network Connection"),
            mac: String::from("00:25:90:aa:bb:cc"),
            ip_address: Some(String::from("10.0.0.256")),
            ..Default::default()
        };
        assert!(matches!(
            store.add_nic(&nic),
            Err(StoreError::InvalidValue { field: "ip_address", .. })
        ));

        let nic_id = store
            .add_nic(&Nic {
                ip_address: Some(String::from("10.0.0.5")),
                ..nic.clone()
            })
            .unwrap();
        let update = Nic {
            id: nic_id,
            ip_address: Some(String::from("eth0")),
            ..nic
        };
        assert!(matches!(
            store.update_nic(&update),
            Err(StoreError::InvalidValue { field: "ip_address", .. })
        ));
        assert_eq!(store.nics(id).unwrap()[0].ip_address.as_deref(), Some("10.0.0.5"));
    }

    #[test]
    fn test_components_removed_with_asset() {
        let (store, id) = store_with_asset();
        store
            .add_ram(&Ram {
                asset_id: id,
                slot: String::from("DIMM_A1"),
                ..Default::default()
            })
            .unwrap();
        store
            .set_cpu(&Cpu {
                asset_id: id,
                cpu_count: 1,
                cpu_core_count: 4,
                ..Default::default()
            })
            .unwrap();
        store.delete_asset(id).unwrap();

        assert!(store.rams(id).unwrap().is_empty());
        assert!(store.get_cpu(id).unwrap().is_none());
    }
}

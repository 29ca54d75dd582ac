use std::collections::HashMap;
use std::hash::Hash;

use log::{debug, info};

use super::approval::{cpu_row, disk_rows, nic_rows, ram_rows, server_row};
use super::components::ComponentTable;
use super::models::{Asset, AssetType, Disk, EventLog, EventType, Nic, Ram};
use super::{AssetStore, StoreError};
use crate::hardware::types::AssetReport;
use crate::report::encode::decode_form_body;

/// What happened to an ingested report.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// New serial number, waiting in the approval zone
    Staged { id: i64 },
    /// Known asset, refreshed in place
    Updated { asset_id: i64, changes: usize },
}

/// Rows that are reconciled against a fresh report by a natural key.
trait Component: Clone + PartialEq {
    type Key: Eq + Hash;
    const TABLE: ComponentTable;
    const NAME: &'static str;

    fn key(&self) -> Self::Key;
    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
    fn describe(&self) -> String;
    fn insert(&self, store: &AssetStore) -> Result<i64, StoreError>;
    fn update(&self, store: &AssetStore) -> Result<(), StoreError>;
}

impl Component for Ram {
    type Key = String;
    const TABLE: ComponentTable = ComponentTable::Ram;
    const NAME: &'static str = "ram";

    fn key(&self) -> String {
        self.slot.clone()
    }
    fn id(&self) -> i64 {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
    fn describe(&self) -> String {
        match self.capacity {
            Some(size) => format!("slot {} ({size} MB)", self.slot),
            None => format!("slot {}", self.slot),
        }
    }
    fn insert(&self, store: &AssetStore) -> Result<i64, StoreError> {
        store.add_ram(self)
    }
    fn update(&self, store: &AssetStore) -> Result<(), StoreError> {
        store.update_ram(self)
    }
}

impl Component for Disk {
    type Key = String;
    const TABLE: ComponentTable = ComponentTable::Disk;
    const NAME: &'static str = "disk";

    fn key(&self) -> String {
        self.sn.clone()
    }
    fn id(&self) -> i64 {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
    fn describe(&self) -> String {
        match self.capacity {
            Some(size) => format!("{} {} ({size} GB)", self.interface_type, self.sn),
            None => format!("{} {}", self.interface_type, self.sn),
        }
    }
    fn insert(&self, store: &AssetStore) -> Result<i64, StoreError> {
        store.add_disk(self)
    }
    fn update(&self, store: &AssetStore) -> Result<(), StoreError> {
        store.update_disk(self)
    }
}

impl Component for Nic {
    type Key = (String, String);
    const TABLE: ComponentTable = ComponentTable::Nic;
    const NAME: &'static str = "nic";

    fn key(&self) -> (String, String) {
        (self.model.clone(), self.mac.clone())
    }
    fn id(&self) -> i64 {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
    fn describe(&self) -> String {
        format!("{} {} ({})", self.name.as_deref().unwrap_or("-"), self.mac, self.model)
    }
    fn insert(&self, store: &AssetStore) -> Result<i64, StoreError> {
        store.add_nic(self)
    }
    fn update(&self, store: &AssetStore) -> Result<(), StoreError> {
        store.update_nic(self)
    }
}

/// Accept either the raw JSON report or the `asset_data=` form body the agent posts.
pub fn parse_report(input: &str) -> Result<(AssetReport, String), StoreError> {
    let trimmed = input.trim();
    let json = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        decode_form_body(trimmed)
            .ok_or_else(|| StoreError::BadReport(String::from("missing asset_data field")))?
    };

    let report: AssetReport =
        serde_json::from_str(&json).map_err(|err| StoreError::BadReport(err.to_string()))?;
    if report.sn.as_deref().map_or(true, |sn| sn.trim().is_empty()) {
        return Err(StoreError::BadReport(String::from("report has no serial number")));
    }
    Ok((report, json))
}

impl AssetStore {
    /// Refresh a known asset from the report, or stage an unknown one for approval.
    pub fn ingest(&self, input: &str) -> Result<IngestOutcome, StoreError> {
        let (report, json) = parse_report(input)?;
        let sn = report.sn.as_deref().unwrap_or_default().trim();

        match self.find_asset_by_sn(sn)? {
            Some(asset) => {
                let changes = self.refresh_asset(&asset, &report)?;
                info!("[store] Refreshed asset {} with {changes} change(s)", asset.name);
                Ok(IngestOutcome::Updated {
                    asset_id: asset.id,
                    changes,
                })
            }
            None => {
                let id = self.stage(&report, &json)?;
                Ok(IngestOutcome::Staged { id })
            }
        }
    }

    /// Apply a fresh report to an existing asset inside one transaction. Every
    /// difference becomes a hardware change event. Returns the number of events.
    fn refresh_asset(&self, asset: &Asset, report: &AssetReport) -> Result<usize, StoreError> {
        let transaction = self.conn.unchecked_transaction()?;
        let mut changes = 0;

        if asset.asset_type == AssetType::Server {
            let reported = server_row(asset.id, report);
            match self.get_server(asset.id)? {
                Some(_) => {
                    let fields = self.update_server_facts(&reported)?;
                    if !fields.is_empty() {
                        self.log_hardware_change(asset, "server", format!("updated {}", fields.join(", ")))?;
                        changes += 1;
                    }
                }
                None => {
                    self.add_server(&reported)?;
                    self.log_hardware_change(asset, "server", String::from("server details added"))?;
                    changes += 1;
                }
            }
        }

        if let Some(mut reported) = cpu_row(asset.id, report) {
            let current = self.get_cpu(asset.id)?;
            if let Some(cpu) = &current {
                reported.id = cpu.id;
            }
            if current.as_ref() != Some(&reported) {
                self.set_cpu(&reported)?;
                let detail = match current {
                    Some(cpu) => format!(
                        "{} x{} ({} cores) -> {} x{} ({} cores)",
                        cpu.cpu_model.as_deref().unwrap_or("unknown"),
                        cpu.cpu_count,
                        cpu.cpu_core_count,
                        reported.cpu_model.as_deref().unwrap_or("unknown"),
                        reported.cpu_count,
                        reported.cpu_core_count
                    ),
                    None => String::from("cpu details added"),
                };
                self.log_hardware_change(asset, "cpu", detail)?;
                changes += 1;
            }
        }

        changes += self.reconcile(asset, self.rams(asset.id)?, ram_rows(asset.id, report))?;
        changes += self.reconcile(asset, self.disks(asset.id)?, disk_rows(asset.id, report))?;
        changes += self.reconcile(asset, self.nics(asset.id)?, nic_rows(asset.id, report))?;

        transaction.commit()?;
        Ok(changes)
    }

    fn reconcile<T: Component>(
        &self,
        asset: &Asset,
        current: Vec<T>,
        reported: Vec<T>,
    ) -> Result<usize, StoreError> {
        let mut changes = 0;
        let mut remaining: HashMap<T::Key, T> =
            current.into_iter().map(|row| (row.key(), row)).collect();

        for mut row in reported {
            match remaining.remove(&row.key()) {
                Some(old) => {
                    row.set_id(old.id());
                    if row != old {
                        row.update(self)?;
                        self.log_hardware_change(
                            asset,
                            T::NAME,
                            format!("changed {} -> {}", old.describe(), row.describe()),
                        )?;
                        changes += 1;
                    }
                }
                None => {
                    row.insert(self)?;
                    self.log_hardware_change(asset, T::NAME, format!("added {}", row.describe()))?;
                    changes += 1;
                }
            }
        }

        for old in remaining.into_values() {
            self.delete_component(T::TABLE, old.id())?;
            self.log_hardware_change(asset, T::NAME, format!("removed {}", old.describe()))?;
            changes += 1;
        }

        debug!("[store] {changes} {} change(s) on {}", T::NAME, asset.name);
        Ok(changes)
    }

    fn log_hardware_change(&self, asset: &Asset, component: &str, detail: String) -> Result<i64, StoreError> {
        self.log_event(&EventLog {
            name: asset.name.clone(),
            event_type: EventType::HardwareChange,
            asset_id: Some(asset.id),
            component: Some(component.to_string()),
            detail,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_report, IngestOutcome};
    use crate::hardware::types::{DiskInfo, RamInfo};
    use crate::report::encode::{encode_form_body, encode_report};
    use crate::store::approval::tests::sample_report;
    use crate::store::models::EventType;
    use crate::store::{AssetStore, StoreError};

    #[test]
    fn test_parse_report_inputs() {
        let report = sample_report("SN-1");
        let json = encode_report(&report).unwrap();

        let (from_json, _) = parse_report(&json).unwrap();
        assert_eq!(from_json, report);

        let (from_form, raw) = parse_report(&encode_form_body(&json)).unwrap();
        assert_eq!(from_form, report);
        assert_eq!(raw, json);
    }

    #[test]
    fn test_parse_report_rejects() {
        assert!(matches!(parse_report("hostname=web"), Err(StoreError::BadReport(_))));
        assert!(matches!(parse_report("{not json"), Err(StoreError::BadReport(_))));
        assert!(matches!(parse_report(r#"{"sn": "  "}"#), Err(StoreError::BadReport(_))));
        assert!(matches!(parse_report(r#"{"hostname": "web"}"#), Err(StoreError::BadReport(_))));
    }

    #[test]
    fn test_ingest_new_sn_is_staged() {
        let store = AssetStore::open_in_memory().unwrap();
        let json = encode_report(&sample_report("SN-NEW")).unwrap();

        let outcome = store.ingest(&encode_form_body(&json)).unwrap();
        assert!(matches!(outcome, IngestOutcome::Staged { .. }));
        assert_eq!(store.pending().unwrap()[0].sn, "SN-NEW");
        assert!(store.list_assets().unwrap().is_empty());

        // a second report for the same sn updates the same entry
        let again = store.ingest(&json).unwrap();
        assert_eq!(again, outcome);
    }

    #[test]
    fn test_ingest_restages_approved_entry() {
        let store = AssetStore::open_in_memory().unwrap();
        let json = encode_report(&sample_report("SN-1")).unwrap();
        store.ingest(&json).unwrap();
        let asset_id = store.approve("SN-1", None).unwrap();
        store.delete_asset(asset_id).unwrap();

        store.ingest(&json).unwrap();
        assert!(!store.staged("SN-1").unwrap().approved);
    }

    #[test]
    fn test_ingest_known_sn_without_changes() {
        let store = AssetStore::open_in_memory().unwrap();
        let json = encode_report(&sample_report("SN-1")).unwrap();
        store.ingest(&json).unwrap();
        let asset_id = store.approve("SN-1", None).unwrap();

        let outcome = store.ingest(&json).unwrap();
        assert_eq!(outcome, IngestOutcome::Updated { asset_id, changes: 0 });
        assert_eq!(store.events_for_asset(asset_id).unwrap().len(), 1);
    }

    #[test]
    fn test_ingest_reconciles_components() {
        let store = AssetStore::open_in_memory().unwrap();
        let mut report = sample_report("SN-1");
        store.ingest(&encode_report(&report).unwrap()).unwrap();
        let asset_id = store.approve("SN-1", None).unwrap();

        // one module resized, one pulled, one added
        report.ram = vec![
            RamInfo {
                slot: String::from("DIMM_A1"),
                capacity: Some(65536),
                ..Default::default()
            },
            RamInfo {
                slot: String::from("DIMM_C1"),
                capacity: Some(32768),
                ..Default::default()
            },
        ];
        // disk replaced
        report.physical_disk_driver = vec![DiskInfo {
            slot: Some(String::from("0:0:0:0")),
            sn: Some(String::from("S3Z9NB0K100002")),
            capacity: Some(960.2),
            interface_type: String::from("SSD"),
            ..Default::default()
        }];
        report.os_release = Some(String::from("Ubuntu 24.04 LTS"));
        report.cpu_core_count = Some(40);

        let outcome = store.ingest(&encode_report(&report).unwrap()).unwrap();
        // server, cpu, 3 ram, 2 disk
        assert_eq!(outcome, IngestOutcome::Updated { asset_id, changes: 7 });

        let rams = store.rams(asset_id).unwrap();
        assert_eq!(rams.len(), 2);
        assert_eq!(rams[0].slot, "DIMM_A1");
        assert_eq!(rams[0].capacity, Some(65536));
        assert_eq!(rams[1].slot, "DIMM_C1");

        let disks = store.disks(asset_id).unwrap();
        assert_eq!(disks.len(), 1);
        assert_eq!(disks[0].sn, "S3Z9NB0K100002");

        let server = store.get_server(asset_id).unwrap().unwrap();
        assert_eq!(server.os_release.as_deref(), Some("Ubuntu 24.04 LTS"));
        assert_eq!(store.get_cpu(asset_id).unwrap().unwrap().cpu_core_count, 40);

        let events = store.events_for_asset(asset_id).unwrap();
        let hardware: Vec<_> = events
            .iter()
            .filter(|event| event.event_type == EventType::HardwareChange)
            .collect();
        assert_eq!(hardware.len(), 7);
        assert!(hardware.iter().any(|event| event.component.as_deref() == Some("server")
            && event.detail == "updated os_release"));
        assert!(hardware.iter().any(|event| event.component.as_deref() == Some("ram")
            && event.detail == "removed slot DIMM_B1 (32768 MB)"));
        assert!(hardware.iter().any(|event| event.component.as_deref() == Some("disk")
            && event.detail == "added SSD S3Z9NB0K100002 (960.2 GB)"));
    }
}

use std::collections::HashSet;
use std::net::IpAddr;

use log::{info, warn};
use rusqlite::{params, OptionalExtension, Row};

use super::models::{
    ApprovalAssetType, Asset, AssetType, Cpu, CreatedBy, Disk, DiskInterface, EventLog, EventType,
    Nic, PendingAsset, Ram, Server,
};
use super::{now, AssetStore, StoreError};
use crate::hardware::types::AssetReport;

const ZONE_COLUMNS: &str = "id, sn, asset_type, manufacturer, model, ram_size, cpu_model, cpu_count, \
    cpu_core_count, os_distribution, os_type, os_release, data, c_time, m_time, approved";

fn pending_from_row(row: &Row) -> rusqlite::Result<PendingAsset> {
    Ok(PendingAsset {
        id: row.get("id")?,
        sn: row.get("sn")?,
        asset_type: row.get("asset_type")?,
        manufacturer: row.get("manufacturer")?,
        model: row.get("model")?,
        ram_size: row.get("ram_size")?,
        cpu_model: row.get("cpu_model")?,
        cpu_count: row.get("cpu_count")?,
        cpu_core_count: row.get("cpu_core_count")?,
        os_distribution: row.get("os_distribution")?,
        os_type: row.get("os_type")?,
        os_release: row.get("os_release")?,
        data: row.get("data")?,
        c_time: row.get("c_time")?,
        m_time: row.get("m_time")?,
        approved: row.get("approved")?,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn to_i64(value: Option<u64>) -> Option<i64> {
    value.and_then(|v| i64::try_from(v).ok())
}

/// Only the asset types with an asset table counterpart can be approved.
fn approved_type(asset_type: ApprovalAssetType) -> Result<AssetType, StoreError> {
    match asset_type {
        ApprovalAssetType::Server => Ok(AssetType::Server),
        ApprovalAssetType::NetworkDevice => Ok(AssetType::NetworkDevice),
        ApprovalAssetType::StorageDevice => Ok(AssetType::StorageDevice),
        ApprovalAssetType::SecurityDevice => Ok(AssetType::SecurityDevice),
        ApprovalAssetType::Software => Ok(AssetType::Software),
        ApprovalAssetType::Idc => Err(StoreError::InvalidChoice {
            field: "asset_type",
            value: asset_type.to_string(),
        }),
    }
}

pub(super) fn server_row(asset_id: i64, report: &AssetReport) -> Server {
    Server {
        asset_id,
        created_by: CreatedBy::Auto,
        model: report.model.clone(),
        os_type: report.os_type.clone(),
        os_distribution: report.os_distribution.clone(),
        os_release: report.os_release.clone(),
        ..Default::default()
    }
}

/// None when the report carries no processor facts at all.
pub(super) fn cpu_row(asset_id: i64, report: &AssetReport) -> Option<Cpu> {
    if report.cpu_model.is_none() && report.cpu_count.is_none() && report.cpu_core_count.is_none() {
        return None;
    }
    Some(Cpu {
        id: 0,
        asset_id,
        cpu_model: report.cpu_model.clone(),
        cpu_count: report.cpu_count.map_or(1, i64::from),
        cpu_core_count: report.cpu_core_count.map_or(1, i64::from),
    })
}

/// Modules without a slot cannot be tracked. Duplicate slots keep the first entry.
pub(super) fn ram_rows(asset_id: i64, report: &AssetReport) -> Vec<Ram> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for module in &report.ram {
        let slot = module.slot.trim();
        if slot.is_empty() || !seen.insert(slot.to_string()) {
            continue;
        }
        rows.push(Ram {
            id: 0,
            asset_id,
            sn: module.sn.clone(),
            model: module.model.clone(),
            manufacturer: module.manufacturer.clone(),
            slot: slot.to_string(),
            capacity: to_i64(module.capacity),
        });
    }
    rows
}

pub(super) fn disk_rows(asset_id: i64, report: &AssetReport) -> Vec<Disk> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for disk in &report.physical_disk_driver {
        let Some(sn) = non_empty(&disk.sn) else {
            warn!("[store] Skipping disk {:?} without a serial number", disk.slot);
            continue;
        };
        if !seen.insert(sn.to_string()) {
            continue;
        }
        rows.push(Disk {
            id: 0,
            asset_id,
            sn: sn.to_string(),
            slot: disk.slot.clone(),
            model: disk.model.clone(),
            manufacturer: disk.manufacturer.clone(),
            capacity: disk.capacity,
            interface_type: DiskInterface::parse(&disk.interface_type).unwrap_or_default(),
        });
    }
    rows
}

/// Interfaces without a MAC are skipped. A missing model is stored as "unknown".
pub(super) fn nic_rows(asset_id: i64, report: &AssetReport) -> Vec<Nic> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for nic in &report.nic {
        let Some(mac) = non_empty(&nic.mac) else {
            continue;
        };
        let model = non_empty(&nic.model).unwrap_or("unknown");
        if !seen.insert((model.to_string(), mac.to_string())) {
            continue;
        }
        let ip_address = nic.ip_address.clone().filter(|ip| {
            let valid = ip.parse::<IpAddr>().is_ok();
            if !valid {
                warn!("[store] Dropping invalid address {ip:?} reported for {}", nic.name);
            }
            valid
        });
        rows.push(Nic {
            id: 0,
            asset_id,
            name: Some(nic.name.clone()).filter(|name| !name.is_empty()),
            model: model.to_string(),
            mac: mac.to_string(),
            ip_address,
            net_mask: nic.net_mask.clone(),
            bonding: nic.bonding.clone(),
        });
    }
    rows
}

impl AssetStore {
    /// Insert or refresh the approval zone entry for `report`. A refreshed entry
    /// goes back to unapproved.
    pub fn stage(&self, report: &AssetReport, raw: &str) -> Result<i64, StoreError> {
        let sn = non_empty(&report.sn)
            .ok_or_else(|| StoreError::BadReport(String::from("report has no serial number")))?;
        let asset_type = ApprovalAssetType::parse(&report.asset_type)?;
        let staged = now();

        self.conn.execute(
            "INSERT INTO new_asset_approval_zone(sn, asset_type, manufacturer, model, ram_size, cpu_model,
                cpu_count, cpu_core_count, os_distribution, os_type, os_release, data, c_time, m_time, approved)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 0)
             ON CONFLICT(sn) DO UPDATE SET
                asset_type = excluded.asset_type,
                manufacturer = excluded.manufacturer,
                model = excluded.model,
                ram_size = excluded.ram_size,
                cpu_model = excluded.cpu_model,
                cpu_count = excluded.cpu_count,
                cpu_core_count = excluded.cpu_core_count,
                os_distribution = excluded.os_distribution,
                os_type = excluded.os_type,
                os_release = excluded.os_release,
                data = excluded.data,
                m_time = excluded.m_time,
                approved = 0",
            params![
                sn,
                asset_type,
                report.manufacturer,
                report.model,
                to_i64(report.ram_size),
                report.cpu_model,
                report.cpu_count,
                report.cpu_core_count,
                report.os_distribution,
                report.os_type,
                report.os_release,
                raw,
                staged,
                staged
            ],
        )?;

        let id = self.conn.query_row(
            "SELECT id FROM new_asset_approval_zone WHERE sn = ?1",
            params![sn],
            |row| row.get(0),
        )?;
        info!("[store] Staged {sn} for approval");
        Ok(id)
    }

    /// Entries still waiting for approval, newest first.
    pub fn pending(&self) -> Result<Vec<PendingAsset>, StoreError> {
        let query = format!(
            "SELECT {ZONE_COLUMNS} FROM new_asset_approval_zone WHERE approved = 0 ORDER BY c_time DESC, id DESC"
        );
        let mut statement = self.conn.prepare(&query)?;
        let rows = statement.query_map((), pending_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn staged(&self, sn: &str) -> Result<PendingAsset, StoreError> {
        let query = format!("SELECT {ZONE_COLUMNS} FROM new_asset_approval_zone WHERE sn = ?1");
        self.conn
            .query_row(&query, params![sn], pending_from_row)
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("no pending asset with sn {sn}")))
    }

    /// The hostname, unless another asset already uses it. Then `hostname-sn`, then the sn.
    fn free_asset_name(&self, hostname: Option<&str>, sn: &str) -> Result<String, StoreError> {
        let Some(hostname) = hostname else {
            return Ok(sn.to_string());
        };
        for candidate in [hostname.to_string(), format!("{hostname}-{sn}")] {
            let taken = self
                .conn
                .query_row("SELECT 1 FROM assets WHERE name = ?1", params![candidate], |_| Ok(()))
                .optional()?
                .is_some();
            if !taken {
                return Ok(candidate);
            }
            warn!("[store] Asset name {candidate} is taken");
        }
        Ok(sn.to_string())
    }

    /// Turn a staged report into an asset with its components. Runs in one
    /// transaction: any failure leaves both the asset tables and the zone entry untouched.
    pub fn approve(&self, sn: &str, approver: Option<&str>) -> Result<i64, StoreError> {
        let transaction = self.conn.unchecked_transaction()?;

        let staged = self.staged(sn)?;
        let report: AssetReport = serde_json::from_str(&staged.data)
            .map_err(|err| StoreError::BadReport(format!("stored snapshot for {sn}: {err}")))?;
        let asset_type = approved_type(staged.asset_type.unwrap_or(ApprovalAssetType::Server))?;

        let approver_id = approver.map(|name| self.get_or_create_user(name)).transpose()?;
        let manufacturer_id = non_empty(&report.manufacturer)
            .map(|name| self.get_or_create_manufacturer(name))
            .transpose()?;
        let name = self.free_asset_name(non_empty(&report.hostname), sn)?;

        let asset_id = self.create_asset(&Asset {
            asset_type,
            name: name.clone(),
            sn: sn.to_string(),
            manufacturer_id,
            approved_by_id: approver_id,
            ..Default::default()
        })?;

        if asset_type == AssetType::Server {
            self.add_server(&server_row(asset_id, &report))?;
        }
        if let Some(cpu) = cpu_row(asset_id, &report) {
            self.set_cpu(&cpu)?;
        }
        for ram in ram_rows(asset_id, &report) {
            self.add_ram(&ram)?;
        }
        for disk in disk_rows(asset_id, &report) {
            self.add_disk(&disk)?;
        }
        for nic in nic_rows(asset_id, &report) {
            self.add_nic(&nic)?;
        }

        self.conn.execute(
            "UPDATE new_asset_approval_zone SET approved = 1, m_time = ?1 WHERE id = ?2",
            params![now(), staged.id],
        )?;
        self.log_event(&EventLog {
            name: name.clone(),
            event_type: EventType::NewAsset,
            asset_id: Some(asset_id),
            new_asset_id: Some(staged.id),
            detail: format!("asset {sn} approved"),
            user_id: approver_id,
            ..Default::default()
        })?;

        transaction.commit()?;
        info!("[store] Approved {sn} as asset {asset_id} ({name})");
        Ok(asset_id)
    }
}

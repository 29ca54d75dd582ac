use chrono::Local;
use log::info;

use crate::hardware;
use crate::hardware::types::AssetReport;

const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn collect_full_inventory() -> AssetReport {
    let node = hardware::collect_node_info();
    let os = hardware::collect_os_info();
    let cpu = hardware::collect_cpu_info();
    let memory = hardware::collect_memory_info();
    let disks = hardware::collect_disks();
    let nics = hardware::collect_network_info();

    info!(
        "[hardware] Collected {} DIMMs, {} disks, {} NICs",
        memory.ram.len(),
        disks.len(),
        nics.len()
    );

    AssetReport {
        asset_type: "server".to_string(),
        sn: node.sn,
        manufacturer: node.manufacturer,
        model: node.model,
        uuid: node.uuid,
        wake_up_type: node.wake_up_type,
        hostname: Some(node.hostname),
        os_type: Some(os.os_type),
        os_distribution: os.os_distribution,
        os_release: os.os_release,
        cpu_model: cpu.cpu_model,
        cpu_count: cpu.cpu_count,
        cpu_core_count: cpu.cpu_core_count,
        ram: memory.ram,
        ram_size: memory.ram_size,
        nic: nics,
        physical_disk_driver: disks,
        agent_version: AGENT_VERSION.to_string(),
        collected_at: Some(Local::now().to_rfc3339()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_full_inventory() {
        let report = collect_full_inventory();
        assert_eq!(report.asset_type, "server");
        assert_eq!(report.agent_version, env!("CARGO_PKG_VERSION"));
        assert!(report.hostname.is_some());

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"physical_disk_driver\""));
    }
}

use std::collections::HashMap;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use std::process::Command;

use log::debug;
use pciid_parser::Database;
use serde_json::Value;

use crate::hardware::dmi::read_to_string_trim;
use crate::hardware::types::{IpAddress, NicInfo};

/// Entry point: collect physical and bonded network interfaces.
pub fn collect_network_info() -> Vec<NicInfo> {
    let iface_addrs = collect_ip_addrs();
    let pci_db = Database::read().ok();

    let mut interfaces = Vec::new();
    let entries = match fs::read_dir("/sys/class/net") {
        Ok(e) => e,
        Err(_) => return interfaces,
    };

    for entry in entries.flatten() {
        let name = match entry.file_name().into_string() {
            Ok(n) => n,
            Err(_) => continue,
        };

        let iface_sys_path = entry.path();

        // Skip virtual interfaces - only collect physical NICs
        if is_virtual_interface(&name, &iface_sys_path) {
            continue;
        }

        let addresses = iface_addrs.get(&name).cloned().unwrap_or_default();
        let primary = primary_ipv4(&addresses);

        interfaces.push(NicInfo {
            mac: read_to_string_trim(iface_sys_path.join("address")),
            model: read_model(&iface_sys_path, pci_db.as_ref()),
            ip_address: primary.map(|a| a.address.clone()),
            net_mask: primary.and_then(|a| prefix_to_netmask(a.prefix)),
            bonding: read_bond_master(&name, &iface_sys_path),
            name,
        });
    }

    interfaces.sort_by(|a, b| a.name.cmp(&b.name));
    interfaces
}

/// Check if a network interface is virtual (not a physical NIC)
fn is_virtual_interface(name: &str, iface_sys_path: &Path) -> bool {
    if name.starts_with("lo")           // loopback
        || name.starts_with("veth")     // virtual ethernet (Docker, etc.)
        || name.starts_with("docker")   // Docker bridge
        || name.starts_with("br-")      // bridge interfaces
        || name.starts_with("virbr")    // libvirt bridge
        || name.starts_with("cni")      // Container Network Interface
        || name.starts_with("flannel")  // Kubernetes flannel
        || name.starts_with("kube")     // Kubernetes interfaces
        || name.starts_with("tun")      // tunnel interfaces
        || name.starts_with("tap")      // tap interfaces
        || name.starts_with("vmnet")    // VMware interfaces
        || name.contains("vlan")        // VLAN interfaces
    {
        return true;
    }

    // Bond/team masters have no PCI device but are tracked
    if name.starts_with("bond") || name.starts_with("team") {
        return false;
    }

    !iface_sys_path.join("device").exists()
}

/// Vendor + device name from the PCI id database, falling back to the
/// kernel driver name.
fn read_model(iface_sys_path: &Path, pci_db: Option<&Database>) -> Option<String> {
    let device_path = iface_sys_path.join("device");
    if !device_path.exists() {
        return None;
    }

    let vendor_id = read_to_string_trim(device_path.join("vendor"));
    let device_id = read_to_string_trim(device_path.join("device"));

    if let (Some(db), Some(vendor), Some(device)) = (pci_db, vendor_id, device_id) {
        if let Some((vendor_name, device_name)) = lookup_pci_ids(db, &vendor, &device) {
            return Some(format!("{} {}", vendor_name, device_name));
        }
    }

    read_driver(&device_path)
}

/// Look up vendor and device names using PCI database
fn lookup_pci_ids(db: &Database, vendor_hex: &str, device_hex: &str) -> Option<(String, String)> {
    let vendor_id = u16::from_str_radix(vendor_hex.strip_prefix("0x").unwrap_or(vendor_hex), 16).ok()?;
    let device_id = u16::from_str_radix(device_hex.strip_prefix("0x").unwrap_or(device_hex), 16).ok()?;

    let vendor = db.vendors.get(&vendor_id)?;
    let device_name = vendor
        .devices
        .get(&device_id)
        .map(|d| d.name.clone())
        .unwrap_or_else(|| format!("Unknown Device [{}]", device_hex));

    Some((vendor.name.clone(), device_name))
}

/// Get driver name via /sys/class/net/<iface>/device/driver -> symlink basename.
fn read_driver(device_path: &Path) -> Option<String> {
    let link = fs::read_link(device_path.join("driver")).ok()?;
    link.file_name().and_then(|n| n.to_str()).map(|s| s.to_string())
}

/// Bond/team an interface belongs to. A bond master reports itself.
fn read_bond_master(iface: &str, iface_sys_path: &Path) -> Option<String> {
    if iface.starts_with("bond") || iface.starts_with("team") {
        return Some(iface.to_string());
    }

    let master_link = fs::read_link(iface_sys_path.join("master")).ok()?;
    master_link.file_name().and_then(|n| n.to_str()).map(|s| s.to_string())
}

fn primary_ipv4(addresses: &[IpAddress]) -> Option<&IpAddress> {
    addresses.iter().find(|a| a.family == "inet")
}

/// Dotted-quad netmask for an IPv4 prefix length.
fn prefix_to_netmask(prefix: u8) -> Option<String> {
    if prefix > 32 {
        return None;
    }
    let bits = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
    Some(Ipv4Addr::from(bits).to_string())
}

//
// IP addresses via `ip -j addr`
//

fn collect_ip_addrs() -> HashMap<String, Vec<IpAddress>> {
    let output = Command::new("ip").args(["-j", "addr"]).output();

    match output {
        Ok(o) if o.status.success() => parse_ip_addr_json(&o.stdout),
        Ok(_) => HashMap::new(),
        Err(err) => {
            debug!("[hardware] Failed to run ip -j addr: {err:?}");
            HashMap::new()
        }
    }
}

fn parse_ip_addr_json(data: &[u8]) -> HashMap<String, Vec<IpAddress>> {
    let mut map: HashMap<String, Vec<IpAddress>> = HashMap::new();

    let json: Value = match serde_json::from_slice(data) {
        Ok(v) => v,
        Err(_) => return map,
    };

    let arr = match json.as_array() {
        Some(a) => a,
        None => return map,
    };

    for iface in arr {
        let ifname = match iface.get("ifname").and_then(|v| v.as_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };

        let mut addrs = Vec::new();

        if let Some(addr_info) = iface.get("addr_info").and_then(|v| v.as_array()) {
            for addr in addr_info {
                let family = addr.get("family").and_then(|v| v.as_str()).unwrap_or("");
                let local = addr.get("local").and_then(|v| v.as_str()).unwrap_or("");
                let prefix = addr.get("prefixlen").and_then(|v| v.as_u64()).unwrap_or(0) as u8;

                if local.is_empty() {
                    continue;
                }

                addrs.push(IpAddress {
                    family: family.to_string(),
                    address: local.to_string(),
                    prefix,
                });
            }
        }

        map.insert(ifname, addrs);
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_to_netmask() {
        assert_eq!(prefix_to_netmask(24).as_deref(), Some("255.255.255.0"));
        assert_eq!(prefix_to_netmask(20).as_deref(), Some("255.255.240.0"));
        assert_eq!(prefix_to_netmask(32).as_deref(), Some("255.255.255.255"));
        assert_eq!(prefix_to_netmask(0).as_deref(), Some("0.0.0.0"));
        assert_eq!(prefix_to_netmask(33), None);
    }

    #[test]
    fn test_parse_ip_addr_json() {
        let data = br#"[
            {"ifindex":1,"ifname":"lo","addr_info":[{"family":"inet","local":"127.0.0.1","prefixlen":8}]},
            {"ifindex":2,"ifname":"eno1","addr_info":[
                {"family":"inet6","local":"fe80::1","prefixlen":64},
                {"family":"inet","local":"10.0.3.17","prefixlen":22}
            ]},
            {"ifindex":3,"ifname":"eno2","addr_info":[]}
        ]"#;

        let map = parse_ip_addr_json(data);
        assert_eq!(map.len(), 3);

        let eno1 = &map["eno1"];
        assert_eq!(eno1.len(), 2);
        let primary = primary_ipv4(eno1).unwrap();
        assert_eq!(primary.address, "10.0.3.17");
        assert_eq!(prefix_to_netmask(primary.prefix).as_deref(), Some("255.255.252.0"));
        assert!(map["eno2"].is_empty());
    }

    #[test]
    fn test_parse_ip_addr_bad_json() {
        assert!(parse_ip_addr_json(b"not json").is_empty());
        assert!(parse_ip_addr_json(b"{}").is_empty());
    }

    #[test]
    fn test_is_virtual_interface() {
        let missing = Path::new("/nonexistent/cmdb/net");
        assert!(is_virtual_interface("lo", missing));
        assert!(is_virtual_interface("docker0", missing));
        assert!(!is_virtual_interface("bond0", missing));
        // no device link means virtual
        assert!(is_virtual_interface("eth0", missing));
    }
}

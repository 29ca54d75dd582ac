use std::collections::HashSet;

use log::debug;
use procfs::{Current, CpuInfo as ProcCpuInfo};
use smbioslib::*;

use crate::hardware::dmi::{clean_dmi_string, load_smbios};
use crate::hardware::types::CpuInfo;

/// One populated processor socket as reported by SMBIOS.
#[derive(Debug, Default)]
struct CpuSocket {
    model_name: Option<String>,
    num_cores: Option<u32>,
}

pub fn collect_cpu_info() -> CpuInfo {
    let sockets = collect_with_smbios();
    let mut info = summarize_sockets(&sockets);

    if info.cpu_model.is_none() || info.cpu_count.is_none() || info.cpu_core_count.is_none() {
        debug!("[hardware] CPU data incomplete in SMBIOS, reading /proc/cpuinfo");
        fill_from_procfs(&mut info);
    }

    info
}

/// Reduce per-socket data to the model / socket count / total core count the
/// inventory stores. Sockets without a model string are unpopulated.
fn summarize_sockets(sockets: &[CpuSocket]) -> CpuInfo {
    let populated: Vec<&CpuSocket> = sockets.iter().filter(|s| s.model_name.is_some()).collect();

    let cpu_model = populated.first().and_then(|s| s.model_name.clone());
    let total_cores: u32 = populated.iter().filter_map(|s| s.num_cores).sum();

    CpuInfo {
        cpu_model,
        cpu_count: if populated.is_empty() { None } else { Some(populated.len() as u32) },
        cpu_core_count: if total_cores > 0 { Some(total_cores) } else { None },
    }
}

fn collect_with_smbios() -> Vec<CpuSocket> {
    let mut sockets = Vec::new();
    let smbios_data = match load_smbios() {
        Some(data) => data,
        None => return sockets,
    };

    for structure in smbios_data.iter() {
        match structure.defined_struct() {
            DefinedStruct::ProcessorInformation(processor) => {
                let mut cpu = CpuSocket {
                    model_name: clean_dmi_string(processor.processor_version().to_utf8_lossy()),
                    num_cores: None,
                };

                if let Some(core_count) = processor.core_count() {
                    match core_count {
                        smbioslib::CoreCount::Count(count) if count > 0 => {
                            cpu.num_cores = Some(count as u32);
                        }
                        _ => {}
                    }
                }

                sockets.push(cpu);
            }
            _ => continue,
        }
    }

    sockets
}

fn fill_from_procfs(info: &mut CpuInfo) {
    let cpuinfo = match ProcCpuInfo::current() {
        Ok(result) => result,
        Err(err) => {
            debug!("[hardware] Failed to read /proc/cpuinfo: {err:?}");
            return;
        }
    };

    let (model, sockets, cores) = summarize_cpuinfo(&cpuinfo);
    if info.cpu_model.is_none() {
        info.cpu_model = model;
    }
    if info.cpu_count.is_none() {
        info.cpu_count = sockets;
    }
    if info.cpu_core_count.is_none() {
        info.cpu_core_count = cores;
    }
}

/// Model name, socket count and physical core count from `/proc/cpuinfo`.
fn summarize_cpuinfo(cpuinfo: &ProcCpuInfo) -> (Option<String>, Option<u32>, Option<u32>) {
    let model = cpuinfo.model_name(0).map(|m| m.trim().to_string());

    let mut physical_ids = HashSet::new();
    for cpu in 0..cpuinfo.num_cores() {
        if let Some(id) = cpuinfo.get_field(cpu, "physical id") {
            physical_ids.insert(id.trim().to_string());
        }
    }
    let sockets = physical_ids.len().max(1) as u32;

    // "cpu cores" is per socket; virtual machines often omit it
    let cores = cpuinfo
        .get_field(0, "cpu cores")
        .and_then(|c| c.trim().parse::<u32>().ok())
        .map(|per_socket| per_socket * sockets)
        .unwrap_or(cpuinfo.num_cores() as u32);

    (model, Some(sockets), if cores > 0 { Some(cores) } else { None })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_sockets() {
        let sockets = vec![
            CpuSocket {
                model_name: Some("Intel(R) Xeon(R) Gold 6230 CPU @ 2.10GHz".to_string()),
                num_cores: Some(20),
            },
            CpuSocket {
                model_name: Some("Intel(R) Xeon(R) Gold 6230 CPU @ 2.10GHz".to_string()),
                num_cores: Some(20),
            },
            // empty socket
            CpuSocket { model_name: None, num_cores: None },
        ];

        let info = summarize_sockets(&sockets);
        assert_eq!(info.cpu_model.as_deref(), Some("Intel(R) Xeon(R) Gold 6230 CPU @ 2.10GHz"));
        assert_eq!(info.cpu_count, Some(2));
        assert_eq!(info.cpu_core_count, Some(40));
    }

    #[test]
    fn test_summarize_no_sockets() {
        let info = summarize_sockets(&[]);
        assert_eq!(info.cpu_model, None);
        assert_eq!(info.cpu_count, None);
        assert_eq!(info.cpu_core_count, None);
    }

    #[test]
    fn test_collect_cpu_info() {
        let info = collect_cpu_info();
        // procfs fallback always yields at least one socket on linux
        if cfg!(target_os = "linux") {
            assert!(info.cpu_count.unwrap_or_default() >= 1);
        }
    }
}

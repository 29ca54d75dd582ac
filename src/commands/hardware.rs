use crate::cli::HardwareCommands;
use crate::hardware::{
    collect_full_inventory,
    collect_memory_info,
    collect_cpu_info,
    collect_network_info,
    collect_disks,
    collect_node_info,
    collect_os_info,
};
use crate::output::output_data;

pub fn handle_hardware_command(cmd: &HardwareCommands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        HardwareCommands::Inventory { format } => {
            let inventory = collect_full_inventory();
            output_data(&inventory, format)?;
        }
        HardwareCommands::Cpu { format } => {
            let cpu_info = collect_cpu_info();
            output_data(&cpu_info, format)?;
        }
        HardwareCommands::Memory { format } => {
            let memory_info = collect_memory_info();
            output_data(&memory_info, format)?;
        }
        HardwareCommands::Storage { format } => {
            let storage_info = collect_disks();
            output_data(&storage_info, format)?;
        }
        HardwareCommands::Network { format } => {
            let network_info = collect_network_info();
            output_data(&network_info, format)?;
        }
        HardwareCommands::Node { format } => {
            let node_info = collect_node_info();
            output_data(&node_info, format)?;
        }
        HardwareCommands::Os { format } => {
            let os_info = collect_os_info();
            output_data(&os_info, format)?;
        }
    }
    Ok(())
}

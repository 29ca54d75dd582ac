use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serde::Serialize;

use crate::cli::{DbCommands, ExtensionCommands};
use crate::config::Settings;
use crate::output::{output_data, print_info, print_success, print_warning};
use crate::store::models::{
    Asset, AssetStatus, AssetType, Assignment, BusinessUnit, Contract, Cpu, CreatedBy, Disk, Idc, Manufacturer,
    NetworkDevice, NetworkDeviceSubType, Nic, Ram, SecurityDevice, SecurityDeviceSubType, Server,
    ServerSubType, Software, SoftwareSubType, StorageDevice, StorageDeviceSubType, Tag,
};
use crate::store::{AssetStore, IngestOutcome, StoreError};

/// An asset with everything hanging off it, for `db show`.
#[derive(Debug, Serialize)]
struct AssetDetail {
    asset: Asset,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_unit: Option<BusinessUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    idc: Option<Idc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contract: Option<Contract>,
    #[serde(skip_serializing_if = "Option::is_none")]
    server: Option<Server>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network_device: Option<NetworkDevice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_device: Option<StorageDevice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    security_device: Option<SecurityDevice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    software: Option<Software>,
    cpu: Option<Cpu>,
    ram: Vec<Ram>,
    disk: Vec<Disk>,
    nic: Vec<Nic>,
    tags: Vec<Tag>,
}

impl AssetDetail {
    fn load(store: &AssetStore, asset: Asset) -> Result<AssetDetail, StoreError> {
        Ok(AssetDetail {
            business_unit: asset.business_unit_id.map(|id| store.get_business_unit(id)).transpose()?,
            idc: asset.idc_id.map(|id| store.get_idc(id)).transpose()?,
            contract: asset.contract_id.map(|id| store.get_contract(id)).transpose()?,
            server: store.get_server(asset.id)?,
            network_device: store.get_network_device(asset.id)?,
            storage_device: store.get_storage_device(asset.id)?,
            security_device: store.get_security_device(asset.id)?,
            software: store.get_software(asset.id)?,
            cpu: store.get_cpu(asset.id)?,
            ram: store.rams(asset.id)?,
            disk: store.disks(asset.id)?,
            nic: store.nics(asset.id)?,
            tags: store.asset_tags(asset.id)?,
            asset,
        })
    }
}

pub fn handle_db_command(cmd: &DbCommands, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let store = AssetStore::open(&settings.database)?;

    match cmd {
        DbCommands::Init => {
            print_success(&format!("Database ready at {}", settings.database.display()));
        }
        DbCommands::Ingest { file } => {
            let input = read_input(file.as_deref())?;
            match store.ingest(&input)? {
                IngestOutcome::Staged { id } => {
                    print_success(&format!("New asset staged for approval (entry {id})"));
                }
                IngestOutcome::Updated { asset_id, changes: 0 } => {
                    print_info(&format!("Asset {asset_id} is up to date"));
                }
                IngestOutcome::Updated { asset_id, changes } => {
                    print_success(&format!("Asset {asset_id} updated with {changes} hardware change(s)"));
                }
            }
        }
        DbCommands::Pending { format } => {
            let pending = store.pending()?;
            if pending.is_empty() {
                print_info("No assets waiting for approval");
            } else {
                output_data(&pending, format)?;
            }
        }
        DbCommands::Approve { sn, approver } => {
            let asset_id = store.approve(sn, approver.as_deref())?;
            print_success(&format!("Approved {sn} as asset {asset_id}"));
        }
        DbCommands::Assets { format } => {
            output_data(&store.list_assets()?, format)?;
        }
        DbCommands::Show { sn, format } => {
            let asset = find_asset(&store, sn)?;
            output_data(&AssetDetail::load(&store, asset)?, format)?;
        }
        DbCommands::Status { sn, status, user } => {
            let asset = find_asset(&store, sn)?;
            let status = AssetStatus::parse(status)?;
            let user_id = user
                .as_deref()
                .map(|name| store.get_or_create_user(name))
                .transpose()?;
            if store.set_status(asset.id, status, user_id)? {
                print_success(&format!("{} is now {status}", asset.name));
            } else {
                print_warning(&format!("{} is already {status}", asset.name));
            }
        }
        DbCommands::Delete { sn } => {
            let asset = find_asset(&store, sn)?;
            store.delete_asset(asset.id)?;
            print_success(&format!("Deleted asset {} ({sn})", asset.name));
        }
        DbCommands::Events { sn, format } => {
            let events = match sn {
                Some(sn) => store.events_for_asset(find_asset(&store, sn)?.id)?,
                None => store.list_events()?,
            };
            output_data(&events, format)?;
        }
        DbCommands::Manufacturer { name, telephone, memo } => {
            let id = store.add_manufacturer(&Manufacturer {
                id: 0,
                name: name.clone(),
                telephone: telephone.clone(),
                memo: memo.clone(),
            })?;
            print_success(&format!("Added manufacturer {name} ({id})"));
        }
        DbCommands::Manufacturers { format } => {
            output_data(&store.list_manufacturers()?, format)?;
        }
        DbCommands::Unit { name, parent, memo } => {
            let id = store.add_business_unit(&BusinessUnit {
                id: 0,
                parent_unit_id: *parent,
                name: name.clone(),
                memo: memo.clone(),
            })?;
            print_success(&format!("Added business unit {name} ({id})"));
        }
        DbCommands::Idc { name, memo } => {
            let id = store.add_idc(&Idc {
                id: 0,
                name: name.clone(),
                memo: memo.clone(),
            })?;
            print_success(&format!("Added IDC {name} ({id})"));
        }
        DbCommands::Contract {
            sn,
            name,
            price,
            start,
            end,
            license_num,
            detail,
            memo,
        } => {
            let id = store.add_contract(&Contract {
                id: 0,
                sn: sn.clone(),
                name: name.clone(),
                memo: memo.clone(),
                price: *price,
                detail: detail.clone(),
                start_day: *start,
                end_day: *end,
                license_num: *license_num,
            })?;
            print_success(&format!("Added contract {sn} ({id})"));
        }
        DbCommands::Tag { sn, tag } => {
            let asset = find_asset(&store, sn)?;
            let tag_id = store.get_or_create_tag(tag)?;
            store.tag_asset(asset.id, tag_id)?;
            print_success(&format!("Tagged {} with {tag}", asset.name));
        }
        DbCommands::Tags { format } => {
            output_data(&store.list_tags()?, format)?;
        }
        DbCommands::Assign {
            sn,
            unit,
            idc,
            contract,
            admin,
            manage_ip,
            user,
        } => {
            let asset = find_asset(&store, sn)?;
            let user_id = user.as_deref().map(|name| store.get_or_create_user(name)).transpose()?;
            let assignment = Assignment {
                business_unit_id: *unit,
                idc_id: *idc,
                contract_id: *contract,
                admin_id: admin.as_deref().map(|name| store.get_or_create_user(name)).transpose()?,
            };
            store.assign(asset.id, &assignment, user_id)?;
            if let Some(ip) = manage_ip {
                store.set_manage_ip(asset.id, Some(ip))?;
            }
            print_success(&format!("Updated {}", asset.name));
        }
        DbCommands::Extend { sn, details } => {
            let asset = find_asset(&store, sn)?;
            extend_asset(&store, &asset, details)?;
            print_success(&format!("Recorded {} details for {}", asset.asset_type, asset.name));
        }
    }
    Ok(())
}

/// Insert the extension row matching `details`. The asset type must agree.
fn extend_asset(store: &AssetStore, asset: &Asset, details: &ExtensionCommands) -> Result<i64, StoreError> {
    let expected = match details {
        ExtensionCommands::Server { .. } => AssetType::Server,
        ExtensionCommands::Network { .. } => AssetType::NetworkDevice,
        ExtensionCommands::Storage { .. } => AssetType::StorageDevice,
        ExtensionCommands::Security { .. } => AssetType::SecurityDevice,
        ExtensionCommands::Software { .. } => AssetType::Software,
    };
    if asset.asset_type != expected {
        return Err(StoreError::InvalidValue {
            field: "asset_type",
            value: format!("{} is a {}, not a {expected}", asset.sn, asset.asset_type),
        });
    }

    match details {
        ExtensionCommands::Server {
            sub_type,
            hosted_on,
            model,
            raid_type,
        } => {
            let hosted_on_id = match hosted_on {
                Some(host_sn) => {
                    let host = find_asset(store, host_sn)?;
                    let server = store
                        .get_server(host.id)?
                        .ok_or_else(|| StoreError::NotFound(format!("no server details for {host_sn}")))?;
                    Some(server.id)
                }
                None => None,
            };
            store.add_server(&Server {
                asset_id: asset.id,
                sub_asset_type: ServerSubType::parse(sub_type)?,
                created_by: CreatedBy::Manual,
                hosted_on_id,
                model: model.clone(),
                raid_type: raid_type.clone(),
                ..Default::default()
            })
        }
        ExtensionCommands::Network {
            sub_type,
            vlan_ip,
            intranet_ip,
            model,
            firmware,
            port_num,
            detail,
        } => store.add_network_device(&NetworkDevice {
            id: 0,
            asset_id: asset.id,
            sub_asset_type: NetworkDeviceSubType::parse(sub_type)?,
            vlan_ip: vlan_ip.clone(),
            intranet_ip: intranet_ip.clone(),
            model: model.clone(),
            firmware: firmware.clone(),
            port_num: *port_num,
            device_detail: detail.clone(),
        }),
        ExtensionCommands::Storage { sub_type } => store.add_storage_device(&StorageDevice {
            id: 0,
            asset_id: asset.id,
            sub_asset_type: StorageDeviceSubType::parse(sub_type)?,
        }),
        ExtensionCommands::Security { sub_type } => store.add_security_device(&SecurityDevice {
            id: 0,
            asset_id: asset.id,
            sub_asset_type: SecurityDeviceSubType::parse(sub_type)?,
        }),
        ExtensionCommands::Software {
            sub_type,
            license_num,
            version,
        } => store.add_software(&Software {
            id: 0,
            asset_id: asset.id,
            sub_asset_type: SoftwareSubType::parse(sub_type)?,
            license_num: *license_num,
            version: version.clone(),
        }),
    }
}

fn find_asset(store: &AssetStore, sn: &str) -> Result<Asset, StoreError> {
    store
        .find_asset_by_sn(sn)?
        .ok_or_else(|| StoreError::NotFound(format!("no asset with sn {sn}")))
}

fn read_input(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => fs::read_to_string(path),
        _ => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

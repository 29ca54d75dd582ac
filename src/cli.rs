use std::ffi::OsString;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
#[command(name = "cmdb")]
#[command(about = "Asset inventory agent and CMDB store")]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Diagnostic log level: error, warn, info or debug
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect asset data from this machine and print it
    #[command(name = "collect_data")]
    CollectData {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },

    /// Collect asset data and report it to the CMDB server
    #[command(name = "report_data")]
    ReportData,

    /// Inspect individual hardware probes
    #[command(subcommand)]
    Hardware(HardwareCommands),

    /// Manage the asset database
    #[command(subcommand)]
    Db(DbCommands),
}

#[derive(Subcommand, Debug)]
pub enum HardwareCommands {
    /// Collect the full asset report
    Inventory {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Collect CPU information
    Cpu {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Collect memory information
    Memory {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Collect physical disk information
    Storage {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Collect network interface information
    Network {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Collect node identity (vendor, model, serial number)
    Node {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Collect operating system information
    Os {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Create the database and its tables
    Init,
    /// Ingest a report (raw JSON or an asset_data= form body)
    Ingest {
        /// Report file, stdin when omitted or "-"
        file: Option<PathBuf>,
    },
    /// List reports waiting for approval
    Pending {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Approve a pending report and create the asset
    Approve {
        /// Serial number of the pending report
        sn: String,

        /// User name recorded as the approver
        #[arg(short, long)]
        approver: Option<String>,
    },
    /// List assets, newest first
    Assets {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Show an asset with its components
    Show {
        /// Asset serial number
        sn: String,

        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Change the status of an asset
    Status {
        /// Asset serial number
        sn: String,

        /// online, offline, unknown, fault, backup or the numeric code
        status: String,

        /// User name recorded on the event
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Delete an asset. Its event log entries are kept
    Delete {
        /// Asset serial number
        sn: String,
    },
    /// Show the event log
    Events {
        /// Only events of this asset
        #[arg(long)]
        sn: Option<String>,

        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Add a manufacturer
    Manufacturer {
        name: String,
        #[arg(long)]
        telephone: Option<String>,
        #[arg(long)]
        memo: Option<String>,
    },
    /// List manufacturers
    Manufacturers {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Add a business unit
    Unit {
        name: String,

        /// Id of the parent business unit
        #[arg(long)]
        parent: Option<i64>,
        #[arg(long)]
        memo: Option<String>,
    },
    /// Add an IDC (machine room)
    Idc {
        name: String,
        #[arg(long)]
        memo: Option<String>,
    },
    /// Add a contract
    Contract {
        /// Contract number
        sn: String,
        name: String,
        #[arg(long, default_value_t = 0)]
        price: i64,

        /// First day of the contract (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day of the contract (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        license_num: Option<i64>,
        #[arg(long)]
        detail: Option<String>,
        #[arg(long)]
        memo: Option<String>,
    },
    /// Attach a tag to an asset, creating the tag if needed
    Tag {
        /// Asset serial number
        sn: String,
        tag: String,
    },
    /// List tags
    Tags {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Set the business unit, IDC, contract, admin or management IP of an asset
    Assign {
        /// Asset serial number
        sn: String,
        #[arg(long)]
        unit: Option<i64>,
        #[arg(long)]
        idc: Option<i64>,
        #[arg(long)]
        contract: Option<i64>,

        /// User name of the asset admin
        #[arg(long)]
        admin: Option<String>,
        #[arg(long)]
        manage_ip: Option<String>,

        /// User name recorded on the event
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Record the type specific details of an asset
    Extend {
        /// Asset serial number
        sn: String,

        #[command(subcommand)]
        details: ExtensionCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExtensionCommands {
    /// Server entered by hand
    Server {
        /// pc_server, blade_computer or mini_computer
        #[arg(long, default_value = "pc_server")]
        sub_type: String,

        /// Serial number of the host, for virtual machines
        #[arg(long)]
        hosted_on: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        raid_type: Option<String>,
    },
    /// Router, switch, load balancer or VPN device
    Network {
        /// router, switch, load_balancer or vpn_device
        #[arg(long, default_value = "router")]
        sub_type: String,
        #[arg(long)]
        vlan_ip: Option<String>,
        #[arg(long)]
        intranet_ip: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        firmware: Option<String>,
        #[arg(long)]
        port_num: Option<i64>,
        #[arg(long)]
        detail: Option<String>,
    },
    /// Disk array, network storage or tape device
    Storage {
        /// disk_array, network_storage, tape_library or tape_machine
        #[arg(long, default_value = "disk_array")]
        sub_type: String,
    },
    /// Firewall, intrusion detection or other security device
    Security {
        /// firewall, intrusion_detection, internet_gateway or maintenance_system
        #[arg(long, default_value = "firewall")]
        sub_type: String,
    },
    /// Licensed software
    Software {
        /// operating_system, office_development or business_software
        #[arg(long, default_value = "operating_system")]
        sub_type: String,
        #[arg(long, default_value_t = 1)]
        license_num: i64,
        #[arg(long)]
        version: String,
    },
}

/// What `main` should do with the command line.
#[derive(Debug)]
pub enum Dispatch {
    /// Run the selected action once
    Run(Cli),
    /// Print the text and exit successfully
    Help(String),
    /// Print the usage error and exit with status 2
    Usage(String),
}

pub fn help_text() -> String {
    Cli::command().render_help().to_string()
}

/// Route the command line. Anything that does not name a known action ends in
/// help text, while a known action with bad options is a usage error.
pub fn dispatch<I, T>(args: I) -> Dispatch
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    let command = Cli::command();
    let is_action = |arg: &OsString| {
        arg.to_str()
            .is_some_and(|name| command.get_subcommands().any(|sub| sub.get_name() == name))
    };

    if let Some(first) = args.get(1).and_then(|arg| arg.to_str()) {
        if !first.starts_with('-') && !is_action(&args[1]) {
            return Dispatch::Help(help_text());
        }
    }
    let names_action = args.iter().skip(1).any(is_action);

    match Cli::try_parse_from(&args) {
        Ok(cli) if cli.command.is_none() => Dispatch::Help(help_text()),
        Ok(cli) => Dispatch::Run(cli),
        Err(err) => match err.kind() {
            ErrorKind::InvalidSubcommand => Dispatch::Help(help_text()),
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::MissingSubcommand
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => Dispatch::Help(err.to_string()),
            _ if !names_action => Dispatch::Help(help_text()),
            _ => Dispatch::Usage(err.to_string()),
        },
    }
}

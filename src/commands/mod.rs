pub mod agent;
pub mod hardware;
pub mod store;

pub use agent::{handle_collect_data, handle_report_data};
pub use hardware::handle_hardware_command;
pub use store::handle_db_command;

use crate::cli::Commands;
use crate::config::Settings;

/// Run the selected action exactly once.
pub fn run_command(command: &Commands, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::CollectData { format } => handle_collect_data(format),
        Commands::ReportData => handle_report_data(settings),
        Commands::Hardware(cmd) => handle_hardware_command(cmd),
        Commands::Db(cmd) => handle_db_command(cmd, settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DbCommands;
    use crate::store::AssetStore;
    use std::fs::remove_file;
    use std::path::PathBuf;

    #[test]
    fn test_run_db_init() {
        let mut database = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        database.push("tmp/run/init.db");
        let _ = remove_file(&database);
        let settings = Settings {
            database: database.clone(),
            ..Default::default()
        };

        run_command(&Commands::Db(DbCommands::Init), &settings).unwrap();
        assert!(database.exists());

        run_command(&Commands::Db(DbCommands::Assets { format: String::from("json") }), &settings).unwrap();
        let store = AssetStore::open(&database).unwrap();
        assert!(store.list_assets().unwrap().is_empty());
    }

    #[test]
    fn test_run_reports_handler_errors() {
        let mut database = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        database.push("tmp/run/errors.db");
        let settings = Settings {
            database,
            ..Default::default()
        };
        let command = Commands::Db(DbCommands::Approve {
            sn: String::from("SN-MISSING"),
            approver: None,
        });
        let err = run_command(&command, &settings).unwrap_err();
        assert!(err.to_string().contains("SN-MISSING"));
    }
}

mod hardware;
mod cli;
mod commands;
mod config;
mod logging;
mod output;
mod report;
mod store;

use std::process::exit;

use cli::{dispatch, Dispatch};
use commands::run_command;
use config::load_settings;
use logging::setup_logging;
use output::print_error;

fn main() {
    let cli = match dispatch(std::env::args_os()) {
        Dispatch::Run(cli) => cli,
        Dispatch::Help(text) => {
            println!("{text}");
            return;
        }
        Dispatch::Usage(text) => {
            eprint!("{text}");
            exit(2);
        }
    };

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            print_error(&e.to_string());
            exit(1);
        }
    };
    setup_logging(cli.log_level.as_deref().unwrap_or(&settings.log_level));

    let Some(command) = &cli.command else {
        return;
    };
    if let Err(e) = run_command(command, &settings) {
        print_error(&e.to_string());
        exit(1);
    }
}

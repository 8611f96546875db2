use std::process::exit;

use colored::Colorize;

fn main() {
    if let Err(e) = dcsgap::app::run_cli() {
        eprintln!("{} {}", "error:".bright_red().bold(), e);
        exit(1);
    }
}

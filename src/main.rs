use colored::Colorize;
use std::process;

fn main() {
    if let Err(e) = cfdock::cli::run() {
        eprintln!("{}", format!("Error: {}", e).red());
        process::exit(e.exit_code());
    }
}

//! Inventa - interactive machine inventory reporter.
//!
//! Parameterless by contract: one invocation produces one timestamped
//! report file in the working directory, then waits for acknowledgment.
//! Internal failures degrade the report; the process always exits zero.

use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("{}", "Generating inventory report, please wait...".bold());
    println!();

    match inventactl::run() {
        Ok(path) => println!("{} {}", "Report generated:".green(), path.display()),
        Err(e) => eprintln!("{} {:#}", "Could not write the report:".red(), e),
    }

    println!();
    print!("Press Enter to exit...");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

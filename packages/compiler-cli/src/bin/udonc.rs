//! Main entry point for the Udon assembly compiler.

use clap::{Arg, Command};
use std::path::Path;
use std::process;
use udon_compiler_cli::config::ProjectConfig;
use udon_compiler_cli::driver::run_build;
use udon_compiler_cli::logging::{ConsoleLogger, LogLevel};

fn main() {
    let matches = Command::new("udonc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Udon assembly compiler")
        .arg(
            Arg::new("project")
                .short('p')
                .long("project")
                .value_name("PATH")
                .help("Path to udonc.toml"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .num_args(0)
                .help("Emit debug-level diagnostics"),
        )
        .get_matches();

    let temp_project;
    let project_path = if let Some(p) = matches.get_one::<String>("project") {
        Path::new(p)
    } else if Path::new("udonc.toml").exists() {
        temp_project = Path::new("udonc.toml").to_path_buf();
        temp_project.as_path()
    } else {
        eprintln!("Error: no project configuration found (expected udonc.toml in cwd, or --project)");
        process::exit(1);
    };

    let level = if matches.get_flag("verbose") { LogLevel::Debug } else { LogLevel::Info };
    let logger = ConsoleLogger::new(level);

    let config = ProjectConfig::load(project_path).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    let project_dir = project_path.parent().unwrap_or_else(|| Path::new("."));

    match run_build(&config, project_dir, &logger) {
        Ok(summary) => {
            println!("compiled {} entry class(es), {} warning(s)", summary.assemblies_written, summary.warnings.len());
        }
        Err(errors) => {
            for error in &errors {
                eprintln!("Error: {}", error);
            }
            process::exit(1);
        }
    }
}

use anyhow::Context;
use lldb_demux::config::{self, CliOptions, Mode, USAGE};
use lldb_demux::debugger::{DebuggerAction, FilterSession, STARTUP_SETTINGS};
use lldb_demux::executor::run_filter;
use lldb_demux::nav::NavEmitter;
use lldb_demux::{FilterError, PatternSet};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let opts = match CliOptions::parse(&args) {
        Ok(opts) => opts,
        Err(FilterError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    init_tracing(opts.log_file.as_deref())?;

    match opts.mode {
        Mode::PrintInit => {
            for setting in STARTUP_SETTINGS {
                println!("{setting}");
            }
        }
        Mode::Command { action, args } => {
            let action = DebuggerAction::parse(&action, &args)
                .map_err(|e| anyhow::anyhow!("{e}\n{USAGE}"))?;
            println!("{}", action.command()?);
        }
        Mode::Filter => {
            let patterns = match &opts.patterns {
                Some(path) => config::load_patterns(path)?,
                None => PatternSet::lldb()?,
            };
            let mut session = FilterSession::new(patterns);

            let mut nav = match &opts.locations {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("cannot create {}", path.display()))?;
                    Some(NavEmitter::new(file))
                }
                None => None,
            };

            tracing::info!("filtering debugger output from stdin");
            let stdin = io::stdin();
            let stdout = io::stdout();
            run_filter(
                &mut session,
                &mut stdin.lock(),
                &mut stdout.lock(),
                nav.as_mut(),
            )?;

            if let Some(location) = session.location() {
                tracing::info!(%location, "last known location");
            }
        }
    }

    Ok(())
}

/// RUST_LOG=lldb_demux=debug for flush decisions, =trace for every line.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .compact()
                .try_init();
        }
    }
    Ok(())
}

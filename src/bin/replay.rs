// Replays a captured debugger transcript through a filter session.
// Usage: cargo run --bin replay -- transcript.txt [CHUNK_SIZE]

use anyhow::Context;
use lldb_demux::FilterSession;
use std::fs;
use std::io::{self, Write};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(path) = args.get(1) else {
        anyhow::bail!("usage: replay TRANSCRIPT [CHUNK_SIZE]");
    };
    let chunk_size = match args.get(2) {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("invalid chunk size: {raw}"))?
            .max(1),
        None => 1,
    };

    let data = fs::read(path).with_context(|| format!("cannot read {path}"))?;
    let mut session = FilterSession::lldb()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for chunk in data.chunks(chunk_size) {
        let result = session.feed(chunk);
        out.write_all(result.text.as_bytes())?;
        for update in &result.updates {
            eprintln!(
                "-> {} ({})",
                update.location,
                update.reason.as_deref().unwrap_or("frame")
            );
        }
    }
    let result = session.finish();
    out.write_all(result.text.as_bytes())?;
    out.flush()?;

    match session.location() {
        Some(location) => eprintln!("final location: {location}"),
        None => eprintln!("no location resolved"),
    }
    Ok(())
}

use std::env;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Write};

use storage_trace::*;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: storage-trace [demo | decode <trace log>]";

fn main() -> std::result::Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        None | Some("demo") => demo(),
        Some("decode") => decode(args.get(2).ok_or(USAGE)?),
        Some(_) => Err(USAGE.into()),
    }
}

/// Emits a small I/O and bucket workload with the environment's configuration.
fn demo() -> std::result::Result<(), Box<dyn Error>> {
    let mut session = TraceSession::from_env()?;
    if !session.config().enabled() {
        println!("tracing disabled, set PGTRACE_IO_TRACING or PGTRACE_BUCKET_TRACING to true");
        return Ok(());
    }
    session.start()?;
    let path = session.path().map(|p| p.to_path_buf());

    let relid = 16384u32;
    for blocknum in 0..10u32 {
        iotrace_event!(session, EventKind::ReadIoStart, relid, blocknum)?;
        iotrace_event!(session, EventKind::ReadIoFinish, relid, blocknum)?;
    }
    buckettrace_event!(session, EventKind::BucketCreate, 1, 64)?;
    buckettrace_event!(session, EventKind::BucketScan, 1, 10)?;
    iotrace_event!(session, EventKind::WriteIoStart, relid, 3)?;
    iotrace_event!(session, EventKind::WriteIoFinish, relid, 3)?;

    session.stop()?;
    if let Some(path) = path {
        println!("trace written to {}", path.display());
    }
    Ok(())
}

fn decode(path: &str) -> std::result::Result<(), Box<dyn Error>> {
    let reader = BufReader::new(File::open(path)?);
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    for line in read_log(reader) {
        let line = line?;
        write!(lock, "{:>14} ns  {:<13}", line.time, line.kind)?;
        for value in &line.values {
            write!(lock, " {value}")?;
        }
        writeln!(lock)?;
    }
    Ok(())
}

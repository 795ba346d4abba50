use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use listests::cancel::CancelToken;
use listests::cli::Args;
use listests::engine;
use listests::error::{Error, OutputError};
use listests::logging;
use listests::output::OutputFormatter;

/// Exit status of a run stopped by Ctrl+C, as shells report SIGINT.
const INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbosity());

    let cancel = CancelToken::new();
    watch_interrupt(cancel.clone());

    match run(&args, cancel.clone()) {
        Ok(()) if cancel.is_cancelled() => ExitCode::from(INTERRUPTED),
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, cancel: CancelToken) -> Result<()> {
    args.validate().context("Invalid arguments")?;
    let format = args.output_format()?;
    let base = std::env::current_dir().context("Cannot determine working directory")?;

    info!(dir = %args.dir.display(), "discovering tests");
    let stream = engine::find_tests(&args.load_request(), &args.finder_options(), cancel.clone())
        .context("Failed to load packages")?;

    let formatter = OutputFormatter::new(format, base).with_cancel(cancel);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match formatter.write_all(&mut out, stream) {
        Ok(count) => debug!(tests = count, "done"),
        Err(Error::Output(OutputError::Write(e))) if e.kind() == io::ErrorKind::BrokenPipe => {
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to write output"),
    }

    match out.flush() {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("Failed to write output"),
    }
}

/// Flips `cancel` on Ctrl+C. The listener runs on its own thread with a
/// single-threaded runtime so the walk itself stays synchronous.
fn watch_interrupt(cancel: CancelToken) {
    let spawned = std::thread::Builder::new()
        .name("interrupt".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!(error = %e, "cannot listen for interrupts");
                    return;
                }
            };
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    debug!("interrupt received");
                    cancel.cancel();
                }
            });
        });

    if let Err(e) = spawned {
        warn!(error = %e, "cannot listen for interrupts");
    }
}

use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use caplog::output::{OutputLogger, SharedOutputBuffer, DEFAULT_CAPACITY};
use caplog::subprocess::{ExitStatus, ProcessCommandBuilder, SubprocessManager};

/// Run a command and capture its output in a bounded console buffer
#[derive(Parser)]
#[command(name = "caplog")]
#[command(about = "Run a command and capture its output in a bounded console buffer", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Capture buffer capacity in bytes
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Drain the child through a single combined blocking pipe instead of
    /// separate async stdout/stderr pipes
    #[arg(long)]
    blocking: bool,

    /// Kill the child if it runs longer than this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Program to run, followed by its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2)
        .init();

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let buffer = SharedOutputBuffer::with_capacity(cli.capacity);
    let console = OutputLogger::new(Arc::new(buffer.clone()));

    let manager = if cli.blocking {
        SubprocessManager::blocking()
    } else {
        SubprocessManager::production()
    };

    let Some((program, args)) = cli.command.split_first() else {
        anyhow::bail!("no command given");
    };
    let mut builder = ProcessCommandBuilder::new(program).args(args);
    if let Some(secs) = cli.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    let result = manager.launch(builder.build(), &console).await;
    debug!("launch result: {result:?}");

    // Render the captured console once, the way a UI would on its final
    // frame. Launch failures were interleaved into the same store, so this
    // is printed before the error is surfaced.
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    {
        let captured = buffer.lock();
        for span in captured.view().spans() {
            out.write_all(span)?;
        }
    }
    out.flush()?;

    let code = match result? {
        ExitStatus::Success => 0,
        ExitStatus::Error(code) => code,
        ExitStatus::Signal(signal) => 128 + signal,
        ExitStatus::Timeout => 124,
    };
    Ok(code)
}

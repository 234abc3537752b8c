//! a compact terminal process and resource monitor.

use {
    clap::Parser,
    ctop::{App, Config, ProcessSourceKind, source::HelperCommand},
    std::{
        fs::File,
        io,
        path::{Path, PathBuf},
        sync::Mutex,
        time::Duration,
    },
    tracing::info,
    tracing_subscriber::EnvFilter,
};

type Error = Box<dyn std::error::Error>;

/// a compact terminal process and resource monitor.
///
/// use the up and down arrows to scroll through processes, and `q` to quit.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// read the process table from this helper program's output.
    #[arg(long, value_name = "PATH")]
    helper: Option<PathBuf>,

    /// how long to wait for the helper program, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = HelperCommand::DEFAULT_TIMEOUT.as_millis() as u64)]
    helper_timeout: u64,

    /// write logs to this file. filter them with `RUST_LOG`.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<(), Error> {
    let config = Cli::parse().into_config();
    init_logging(config.log_file.as_deref())?;
    info!(processes = ?config.processes, "starting");

    App::new(config)?.run()?;

    Ok(())
}

/// logs go to `path`, or nowhere: the dashboard owns stdout.
fn init_logging(path: Option<&Path>) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match path {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .init(),
    }

    Ok(())
}

// === impl Cli ===

impl Cli {
    fn into_config(self) -> Config {
        let Self {
            helper,
            helper_timeout,
            log_file,
        } = self;

        let processes = match helper {
            Some(program) => ProcessSourceKind::Helper {
                program,
                timeout: Duration::from_millis(helper_timeout),
            },
            None => ProcessSourceKind::InProcess,
        };

        Config {
            processes,
            log_file,
            ..Config::default()
        }
    }
}

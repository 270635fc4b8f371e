//! Demo gateway embedded in an in-memory host.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use camino::Utf8PathBuf;
use clap::Parser;
use hostgate::dispatch::{HostDispatcher, host_channel};
use hostgate::events::EventHub;
use hostgate::host::memory::MemoryHost;
use hostgate::shutdown::{ShutdownSignal, SystemShutdownSignal};
use hostgate::{Gateway, GatewayOptions, HostSide, telemetry};
use hostgate_config::{DEFAULT_LOG_FILTER, LogFormat, LogSettings, SettingsStore};
use tracing::{error, info, warn};

const MAIN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::main");

/// Serves an in-memory host's configuration, controllers and events.
#[derive(Debug, Parser)]
#[command(name = "hostgate", version, about)]
struct Cli {
    /// Root directory of the settings store.
    #[arg(long, value_name = "DIR", default_value = ".")]
    config_dir: Utf8PathBuf,
    /// Log filter expression.
    #[arg(long, value_name = "FILTER", default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,
    /// Log output format.
    #[arg(long, value_name = "FORMAT", default_value_t = LogFormat::default())]
    log_format: LogFormat,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = telemetry::initialise(&cli.log_settings()) {
        return report_startup_failure(&error);
    }

    let (dispatcher, mut host_loop) = host_channel();
    let gateway = Gateway::new(
        GatewayOptions::default(),
        dispatcher.clone(),
        Arc::new(EventHub::new()),
        SettingsStore::new(&cli.config_dir),
    );
    let mut side = gateway.attach(MemoryHost::sample());
    if let Err(error) = side.start() {
        error!(target: MAIN_TARGET, error = %error, "gateway failed to start");
        return ExitCode::FAILURE;
    }

    if let Err(error) = spawn_signal_watcher(dispatcher) {
        error!(target: MAIN_TARGET, error = %error, "failed to spawn signal thread");
        side.shutdown();
        return ExitCode::FAILURE;
    }

    host_loop.run(&mut side);
    side.shutdown();
    info!(target: MAIN_TARGET, "exiting");
    ExitCode::SUCCESS
}

impl Cli {
    fn log_settings(&self) -> LogSettings {
        LogSettings::new(self.log_filter.as_str(), self.log_format)
    }
}

/// Reports an error raised before any subscriber is installed.
fn report_startup_failure(error: &dyn std::error::Error) -> ExitCode {
    // Nothing else can report a failed stderr write.
    if writeln!(io::stderr().lock(), "hostgate: {error}").is_err() {
        return ExitCode::from(2);
    }
    ExitCode::FAILURE
}

fn spawn_signal_watcher(dispatcher: HostDispatcher<HostSide<MemoryHost>>) -> io::Result<()> {
    thread::Builder::new()
        .name("hostgate-signals".to_owned())
        .spawn(move || {
            if let Err(error) = SystemShutdownSignal.wait() {
                error!(target: MAIN_TARGET, error = %error, "signal handling unavailable");
            }
            if dispatcher.schedule(HostSide::shutdown).is_err() {
                warn!(target: MAIN_TARGET, "host loop already stopped");
            }
            dispatcher.quit();
        })
        .map(drop)
}

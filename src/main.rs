use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use voice_controller::{Config, LogDispatcher, MemoryBus, MessageBus, RemoteBus, SessionLoop};

/// voicectl - voice-command front-end for robot subsystems
#[derive(Parser)]
#[command(name = "voicectl", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "VOICECTL_CONFIG")]
    config: Option<PathBuf>,

    /// Wake word override
    #[arg(short, long, env = "VOICECTL_WAKE_WORD")]
    wake_word: Option<String>,

    /// Bus WebSocket URL override
    #[arg(short, long, env = "VOICECTL_BUS_URL")]
    bus_url: Option<String>,

    /// Use an in-process bus instead of connecting to a broker
    /// (smoke runs on machines without one)
    #[arg(long)]
    embedded: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,voice_controller=info",
        1 => "info,voice_controller=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(wake_word) = cli.wake_word {
        config.wake_word = wake_word;
    }
    if let Some(url) = cli.bus_url {
        config.bus.url = url;
    }

    let bus: Arc<dyn MessageBus> = if cli.embedded {
        tracing::info!("using embedded in-process bus");
        Arc::new(MemoryBus::new())
    } else {
        tracing::info!(url = %config.bus.url, "connecting to bus");
        Arc::new(RemoteBus::connect(&config.bus.url).await?)
    };

    let mut session = SessionLoop::new(Arc::clone(&bus), &config, Box::new(LogDispatcher)).await?;
    tracing::info!(wake_word = %config.wake_word, "voice controller ready - say the wake word");

    tokio::select! {
        result = session.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
        }
    }

    // Dropping the session and bus releases the subscription and the
    // broker connection on every exit path.
    tracing::debug!("cleaning up");
    Ok(())
}

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use felt::config::FeltConfig;
use felt::notify::SerialLink;
use felt::{EmotionAnnotator, run};

#[derive(Parser, Debug)]
#[command(name = "felt", about = "Emotion overlay and notifier daemon")]
struct Cli {
    #[arg(long, default_value = "/run/psyche/felt.sock")]
    socket: PathBuf,

    /// TOML config file with a [serial] table. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial device the microcontroller listens on, e.g. /dev/ttyACM0.
    #[arg(long)]
    serial_port: Option<String>,

    #[arg(long)]
    baud: Option<u32>,

    #[arg(long)]
    serial_timeout_secs: Option<f64>,

    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    #[arg(short = 'd', long)]
    daemon: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .init();
    if cli.daemon {
        daemonize::Daemonize::new()
            .start()
            .map_err(|e| anyhow::anyhow!(e))?;
    }

    let mut cfg = match &cli.config {
        Some(path) => FeltConfig::load(path).await?,
        None => FeltConfig::default(),
    };
    if cli.serial_port.is_some() {
        cfg.serial.port = cli.serial_port;
    }
    if let Some(baud) = cli.baud {
        cfg.serial.baud = baud;
    }
    if let Some(secs) = cli.serial_timeout_secs {
        cfg.serial.timeout_secs = secs;
    }

    let link = SerialLink::open_or_offline(
        cfg.serial.port.as_deref(),
        cfg.serial.baud,
        cfg.serial.timeout(),
    );
    let annotator = Arc::new(EmotionAnnotator::new(link));
    run(cli.socket, annotator).await
}

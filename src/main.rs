use anyhow::Result;
use clap::Parser;

use whalewatch::app::{self, AppCfg};
use whalewatch::config::Config;

#[derive(Parser, Debug)]
#[command(version, about = "Open-interest whale monitor with AI trade advisory")]
struct Args {
    /// Futures symbol to monitor
    #[arg(long, default_value = "BTCUSDT")]
    symbol: String,

    /// Minutes between sampling cycles
    #[arg(long, default_value = "5")]
    interval_minutes: u64,

    /// Whale threshold multiplier applied to the baseline
    #[arg(long, default_value = "1.1")]
    sensitivity: f64,

    /// Path to the OI history CSV
    #[arg(long, default_value = "oi_history.csv")]
    history_path: String,

    /// Path to config file (optional)
    #[arg(long)]
    config: Option<String>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    // Load base configuration from file if provided
    let base_config = if let Some(config_path) = &args.config {
        Some(Config::from_file(config_path)?)
    } else {
        None
    };

    // CLI args > Config file > Defaults
    let app_cfg = if let Some(cfg) = base_config {
        let mut app_cfg = AppCfg::from_config(cfg, args.once);

        // Override with CLI args only when they differ from the defaults
        if args.symbol != "BTCUSDT" {
            app_cfg.symbol = args.symbol;
        }
        if args.interval_minutes != 5 {
            app_cfg.interval_minutes = args.interval_minutes;
        }
        if args.sensitivity != 1.1 {
            app_cfg.sensitivity = args.sensitivity;
        }
        if args.history_path != "oi_history.csv" {
            app_cfg.history_path = args.history_path;
        }

        app_cfg
    } else {
        AppCfg {
            symbol: args.symbol,
            interval_minutes: args.interval_minutes,
            sensitivity: args.sensitivity,
            history_path: args.history_path,
            advisor: Default::default(),
            once: args.once,
        }
    };

    app::run(app_cfg).await
}

mod chat;
mod common;
mod config;
mod console;
mod network;
mod ui;

use std::error::Error;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use network::{ClientSettings, HttpTransport, TrackerApi, TrackerClient};
use reqwest::Url;
use tokio::sync::mpsc;
use ui::ChatApp;

const MIN_POLL_INTERVAL_MS: u64 = 250;

#[derive(Parser)]
#[command(
    name = "tracker_chat",
    version,
    about = "Chat client for the tracker server"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Tracker server base URL (overrides config and TRACKER_URL)
    #[arg(long, value_name = "URL")]
    server: Option<String>,
    /// Channel to poll and broadcast to
    #[arg(long)]
    channel: Option<String>,
    #[arg(long, value_name = "MS")]
    poll_interval_ms: Option<u64>,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, PartialEq, Eq)]
enum Mode {
    /// Run without UI, chatting over stdin/stdout
    Headless {
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    // Khởi tạo Logger để debug
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    apply_overrides(&mut app_config, &cli);

    let base_url = Url::parse(&app_config.server_url)?;
    let settings = ClientSettings {
        channel: app_config.channel.clone(),
        poll_interval: Duration::from_millis(app_config.poll_interval_ms.max(MIN_POLL_INTERVAL_MS)),
        advertised_ip: base_url.host_str().unwrap_or("127.0.0.1").to_string(),
    };
    log::info!(
        "Using tracker {} (channel `{}`)",
        base_url,
        settings.channel
    );
    let transport = HttpTransport::new(base_url)?;

    // 1. Tạo các kênh giao tiếp (Channels)
    // UI -> Network
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Network -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    // 2. Khởi chạy Network Task (Chạy ngầm)
    tokio::spawn(async move {
        let client = TrackerClient::new(TrackerApi::new(transport), settings, event_tx, cmd_rx);
        client.run().await;
    });

    match cli.mode {
        Some(Mode::Headless { username, password }) => {
            console::run_headless(username, password, app_config.channel, cmd_tx, event_rx).await
        }
        None => run_gui(app_config, cli.config, cmd_tx, event_rx),
    }
}

fn apply_overrides(app_config: &mut config::AppConfig, cli: &Cli) {
    if let Ok(url) = std::env::var("TRACKER_URL") {
        app_config.server_url = url;
    }
    if let Ok(channel) = std::env::var("CHAT_CHANNEL") {
        app_config.channel = channel;
    }
    if let Some(url) = &cli.server {
        app_config.server_url = url.clone();
    }
    if let Some(channel) = &cli.channel {
        app_config.channel = channel.clone();
    }
    if let Some(ms) = cli.poll_interval_ms {
        app_config.poll_interval_ms = ms;
    }
}

fn run_gui(
    app_config: config::AppConfig,
    config_path: String,
    cmd_tx: mpsc::Sender<common::NetworkCommand>,
    event_rx: mpsc::Receiver<common::NetworkEvent>,
) -> Result<(), Box<dyn Error>> {
    // 3. Khởi chạy UI (Chạy trên Main Thread)
    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);

    eframe::run_native(
        "Tracker Chat",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");

            log::info!("Client UI started for channel `{}`", app_config.channel);

            Ok(Box::new(ChatApp::new(
                cc,
                &app_config,
                config_path.clone(),
                cmd_tx.clone(),
                event_receiver,
            )))
        }),
    )?;
    Ok(())
}

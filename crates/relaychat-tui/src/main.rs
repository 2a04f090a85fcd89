//! Relay chat terminal client entry point.

use std::{fs::File, path::PathBuf, sync::Mutex, time::Duration};

use clap::Parser;
use relaychat_app::{App, Runtime, compose};
use relaychat_client::{Identity, ReconnectPolicy, Session, SessionConfig, SystemEnv};
use relaychat_tui::TerminalDriver;
use tracing_subscriber::EnvFilter;

/// Relay chat terminal client
#[derive(Parser, Debug)]
#[command(name = "relaychat")]
#[command(about = "Terminal client for relay chat servers")]
#[command(version)]
struct Args {
    /// Relay WebSocket URL
    #[arg(short, long, env = "RELAYCHAT_URL", default_value = "ws://localhost:5000")]
    server: String,

    /// Username to log in with. Skips the login screen.
    #[arg(short, long)]
    username: Option<String>,

    /// Room to enter on first connect
    #[arg(short, long, default_value = "general")]
    room: String,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level when `RUST_LOG` is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Give up after this many reconnect attempts. Retries forever if unset.
    #[arg(long)]
    max_reconnect_attempts: Option<u32>,

    /// Typing debounce window in milliseconds
    #[arg(long, default_value_t = 1000)]
    typing_debounce_ms: u64,

    /// Ring the terminal bell on new messages while unfocused
    #[arg(long)]
    bell: bool,
}

impl Args {
    /// Retry timing for the transport.
    fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy { max_attempts: self.max_reconnect_attempts, ..ReconnectPolicy::default() }
    }

    /// Session tunables entering `room` on first connect.
    fn session_config(&self, room: String) -> SessionConfig {
        SessionConfig {
            typing_debounce: Duration::from_millis(self.typing_debounce_ms),
            default_room: room,
            ..SessionConfig::default()
        }
    }
}

/// `RUST_LOG` directives win over `fallback`.
fn log_filter(env: Option<&str>, fallback: &str) -> EnvFilter {
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // The terminal belongs to the UI, so logs only go to a file
    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        tracing_subscriber::fmt()
            .with_env_filter(log_filter(env.as_deref(), &args.log_level))
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }

    let room = compose::room_name(&args.room)?.to_string();
    let mut app = App::new(args.server.clone(), room.clone());
    if let Some(username) = &args.username {
        let username = compose::username(username)?;
        app = app.with_identity(Identity::new(username, room.clone()));
    }

    tracing::info!(server = %args.server, "starting");
    let driver = TerminalDriver::new(&args.server, args.reconnect_policy(), args.bell)?;
    let session = Session::new(SystemEnv::new(), args.session_config(room));

    Ok(Runtime::new(driver, app, session).run().await?)
}

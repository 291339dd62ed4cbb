//! Gesture drawer client
//!
//! # Usage
//! ```bash
//! drawguess-drawer --server ws://localhost:8765/ws --landmarks hand.jsonl
//! ```
//!
//! Console commands: `c` clear, `r` reset, `f` upload, `g` ask the AI,
//! `h <text>` set a hint and ask, `q` quit.

use anyhow::{Context, Result};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use drawguess_rs::client::{
    connect_and_register, Command, DrawerSession, JsonLinesSource, LandmarkSource,
    ReconnectPolicy, Reconnector, RelayStream, Sample, VisionConfig, VisionGuesser,
};
use drawguess_rs::gesture::InputConfig;
use drawguess_rs::websocket::{ClientMessage, ClientRole, ServerMessage};

/// Drawguess drawer - draw with hand gestures
#[derive(Parser, Debug)]
#[command(name = "drawguess-drawer")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay WebSocket URL
    #[arg(short, long, env = "DRAWGUESS_SERVER", default_value = "ws://127.0.0.1:8765/ws")]
    server: String,

    /// JSON-lines landmark stream
    #[arg(short, long, env = "DRAWGUESS_LANDMARKS")]
    landmarks: PathBuf,

    /// Frames processed per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Where uploaded drawings are saved
    #[arg(long, env = "DRAWGUESS_SNAPSHOT_DIR", default_value = "snapshots")]
    snapshot_dir: PathBuf,

    /// Chat-completions API base for the AI guess
    #[arg(long, env = "DRAWGUESS_VISION_API_BASE")]
    vision_api_base: Option<String>,

    #[arg(long, env = "DRAWGUESS_VISION_API_KEY", hide_env_values = true)]
    vision_api_key: Option<String>,

    #[arg(long, env = "DRAWGUESS_VISION_MODEL")]
    vision_model: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "drawguess_drawer=info,drawguess_rs=info")]
    log_level: String,
}

impl Args {
    fn vision_config(&self) -> VisionConfig {
        let mut config = VisionConfig::default();
        if let Some(base) = &self.vision_api_base {
            config.api_base = base.clone();
        }
        if let Some(model) = &self.vision_model {
            config.model = model.clone();
        }
        config.api_key = self.vision_api_key.clone();
        config
    }
}

/// Why the frame loop stopped
enum Exit {
    Quit,
    Disconnected,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let source = JsonLinesSource::open(&args.landmarks)
        .with_context(|| format!("Failed to open landmark source {:?}", args.landmarks))?;
    let mut samples = spawn_capture(source);
    let mut commands = Some(spawn_console());

    let guesser = VisionGuesser::new(args.vision_config()).context("Failed to build HTTP client")?;
    let mut session = DrawerSession::new(InputConfig::default()).context("Failed to create canvas")?;
    let frame_interval = Duration::from_secs_f64(1.0 / f64::from(args.fps.max(1)));

    let mut reconnector = Reconnector::new(ReconnectPolicy::default());
    let url = args.server.as_str();

    loop {
        let stream = reconnector
            .establish(move || connect_and_register(url, ClientRole::Drawer))
            .await
            .context("Could not reach the relay")?;

        let exit = run_session(
            stream,
            &mut session,
            &mut samples,
            &mut commands,
            &guesser,
            &args,
            frame_interval,
        )
        .await;

        match exit {
            Exit::Quit => break,
            Exit::Disconnected => tracing::warn!("Lost connection to relay, reconnecting"),
        }
    }

    Ok(())
}

async fn run_session(
    stream: RelayStream,
    session: &mut DrawerSession,
    samples: &mut mpsc::Receiver<Sample>,
    commands: &mut Option<mpsc::Receiver<Command>>,
    guesser: &VisionGuesser,
    args: &Args,
    frame_interval: Duration,
) -> Exit {
    let (mut write, mut read) = stream.split();
    let mut ticker = tokio::time::interval(frame_interval);

    loop {
        let outbound: Vec<ClientMessage> = tokio::select! {
            _ = ticker.tick() => {
                match samples.try_recv() {
                    Ok(sample) => session.on_frame(sample.frame(), Instant::now()),
                    Err(TryRecvError::Empty) => Vec::new(),
                    Err(TryRecvError::Disconnected) => {
                        tracing::info!("Landmark source ended");
                        let _ = write.close().await;
                        return Exit::Quit;
                    }
                }
            }
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    match ServerMessage::parse(&text) {
                        Ok(msg) => session.handle_server_message(msg),
                        Err(e) => tracing::warn!("Malformed server message: {}", e),
                    }
                    Vec::new()
                }
                Some(Ok(Message::Close(_))) | None => return Exit::Disconnected,
                Some(Ok(_)) => Vec::new(),
                Some(Err(e)) => {
                    tracing::warn!("Receive failed: {}", e);
                    return Exit::Disconnected;
                }
            },
            command = next_command(commands) => match command {
                Some(Command::Quit) => {
                    let _ = write.close().await;
                    return Exit::Quit;
                }
                Some(command) => run_command(command, session, guesser, args).await,
                None => {
                    tracing::info!("Console closed, commands disabled");
                    *commands = None;
                    Vec::new()
                }
            },
        };

        for msg in outbound {
            let text = match msg.to_json() {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to serialize {:?}: {}", msg, e);
                    continue;
                }
            };
            if let Err(e) = write.send(Message::Text(text)).await {
                tracing::warn!("Send failed: {}", e);
                return Exit::Disconnected;
            }
        }
    }
}

/// Next console command. Never resolves once the console is closed.
async fn next_command(commands: &mut Option<mpsc::Receiver<Command>>) -> Option<Command> {
    match commands {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn run_command(
    command: Command,
    session: &mut DrawerSession,
    guesser: &VisionGuesser,
    args: &Args,
) -> Vec<ClientMessage> {
    match command {
        Command::Clear => vec![session.clear()],
        Command::Reset => vec![session.reset()],
        Command::Upload => match session.upload(Some(&args.snapshot_dir)) {
            Ok(msg) => vec![msg],
            Err(e) => {
                tracing::warn!("Upload failed: {}", e);
                Vec::new()
            }
        },
        Command::Guess => {
            session.guess(guesser).await;
            Vec::new()
        }
        Command::Hint(hint) => {
            session.set_hint(hint);
            session.guess(guesser).await;
            Vec::new()
        }
        Command::Quit => Vec::new(),
    }
}

/// Read the landmark source on its own thread. The channel holds one sample
/// so a file source is consumed at the frame rate.
fn spawn_capture<S: LandmarkSource + Send + 'static>(mut source: S) -> mpsc::Receiver<Sample> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        while let Some(sample) = source.next_sample() {
            if tx.blocking_send(sample).is_err() {
                break;
            }
        }
    });
    rx
}

fn spawn_console() -> mpsc::Receiver<Command> {
    let (tx, rx) = mpsc::channel(8);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match Command::parse(&line) {
                Some(command) => {
                    if tx.blocking_send(command).is_err() {
                        break;
                    }
                }
                None => eprintln!("Unknown command: {}", line.trim()),
            }
        }
    });
    rx
}

//! CrossMacro engine entry point.
//!
//! Composition root: wires a platform [`capture::CaptureProvider`] and
//! [`coordinate::CoordinateStrategy`] together behind the `record`
//! subcommand, and a platform [`playback::SimulationProvider`] behind
//! `play`, per §6's CLI surface. `expand` runs the text-expansion core
//! standalone against whatever capture backend is available.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ record  -- CaptureProvider -> CoordinateStrategy -> RecordingPipeline -> macro file
//!  └─ play    -- macro file -> PlaybackEngine -> SimulationProvider
//!  └─ expand  -- CaptureProvider -> TextExpansionEngine -> SimulationProvider (backspace/paste/type)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crossmacro_core::domain::macro_event::MacroSequence;
use crossmacro_core::domain::raw_event::{RawEventKind, RawInputEvent};
use crossmacro_core::domain::schedule::PlaybackSpeed;
use crossmacro_core::domain::text_expansion::TextExpansion;
use crossmacro_core::keymap::evdev::Key;

use crossmacro_engine::capture::CaptureProvider;
use crossmacro_engine::coordinate::{AbsoluteStrategy, CoordinateStrategy, RelativeStrategy};
use crossmacro_engine::infrastructure::config;
use crossmacro_engine::playback::{PlaybackEngine, PlaybackMode, SimulationProvider};
use crossmacro_engine::position::{PositionQueryAdapter, PositionRegistry};
use crossmacro_engine::recording::{RecordingConfig, RecordingPipeline};

#[derive(Parser)]
#[command(name = "crossmacro-engine", about = "Records, replays, and expands keyboard/mouse macros")]
struct Cli {
    #[arg(long, default_value = "info", env = "CROSSMACRO_LOG")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Records input to a macro file until Ctrl+C.
    Record {
        /// Destination macro file (JSON, camelCase, per §6).
        path: PathBuf,
        /// Poll compositor cursor position instead of accumulating relative
        /// deltas. Only takes effect where a position provider is available.
        #[arg(long)]
        absolute: bool,
        #[arg(long)]
        no_mouse: bool,
        #[arg(long)]
        no_keyboard: bool,
    },
    /// Replays a macro file.
    Play {
        /// Macro file to read.
        path: PathBuf,
        /// Repeat indefinitely until Ctrl+C.
        #[arg(long)]
        r#loop: bool,
        /// Repeat this many times (ignored if `--loop` is set).
        #[arg(long)]
        repeat: Option<u32>,
        /// Playback speed multiplier, 0.1-10.0.
        #[arg(long, default_value_t = 1.0)]
        speed: f32,
        /// Re-query the screen resolution for absolute-coordinate clamping
        /// instead of the hard-coded fallback.
        #[arg(long)]
        absolute: bool,
    },
    /// Runs the text-expansion core against live capture until Ctrl+C.
    Expand,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())))
        .init();

    let cancel = CancellationToken::new();
    let ctrlc_cancel = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        ctrlc_cancel.cancel();
    });

    match cli.command {
        Command::Record { path, absolute, no_mouse, no_keyboard } => {
            run_record(path, absolute, !no_mouse, !no_keyboard, cancel).await
        }
        Command::Play { path, r#loop, repeat, speed, absolute } => {
            run_play(path, r#loop, repeat, speed, absolute, cancel).await
        }
        Command::Expand => run_expand(cancel).await,
    }
}

// ── record ──────────────────────────────────────────────────────────────────

async fn run_record(path: PathBuf, absolute: bool, record_mouse: bool, record_keyboard: bool, cancel: CancellationToken) -> anyhow::Result<()> {
    let engine_config = config::load_config().unwrap_or_else(|e| {
        warn!(error = %e, "falling back to default config");
        config::EngineConfig::default()
    });

    let mut provider = detect_capture_provider(engine_config.capture.socket_path_override.as_deref()).await?;
    provider.configure(record_mouse, record_keyboard);
    let (event_rx, error_rx) = provider.start(cancel.clone()).map_err(|e| anyhow::anyhow!(e))?;

    let record_config = RecordingConfig {
        record_mouse,
        record_keyboard,
        ignored_keys: engine_config.capture.ignored_keys,
        absolute_coordinates: absolute,
    };

    info!(?path, absolute, "recording started, press Ctrl+C to finish");

    let sequence = if absolute {
        let strategy = AbsoluteStrategy::spawn(PositionQueryAdapter::new(PositionRegistry::detect()));
        record_loop(strategy, record_config, event_rx, error_rx, cancel).await
    } else {
        record_loop(RelativeStrategy::new(), record_config, event_rx, error_rx, cancel).await
    };

    provider.dispose();

    let json = serde_json::to_string_pretty(&sequence)?;
    std::fs::write(&path, json)?;
    info!(?path, events = sequence.events.len(), "macro saved");
    Ok(())
}

async fn record_loop<S: CoordinateStrategy>(
    strategy: S,
    config: RecordingConfig,
    mut event_rx: mpsc::UnboundedReceiver<RawInputEvent>,
    mut error_rx: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
) -> MacroSequence {
    let mut pipeline = RecordingPipeline::new(config, strategy);
    let start = Instant::now();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = event_rx.recv() => match event {
                Some(event) => pipeline.handle_event(&event, start.elapsed().as_millis() as i64),
                None => break,
            },
            error = error_rx.recv() => {
                if let Some(message) = error {
                    warn!(%message, "capture provider reported an error");
                } else {
                    break;
                }
            }
        }
    }

    pipeline.finish("recorded-macro")
}

// ── play ────────────────────────────────────────────────────────────────────

async fn run_play(path: PathBuf, r#loop: bool, repeat: Option<u32>, speed: f32, absolute: bool, cancel: CancellationToken) -> anyhow::Result<()> {
    let engine_config = config::load_config().unwrap_or_else(|e| {
        warn!(error = %e, "falling back to default config");
        config::EngineConfig::default()
    });

    let content = std::fs::read_to_string(&path)?;
    let sequence: MacroSequence = serde_json::from_str(&content)?;
    sequence.validate().map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut provider = detect_simulation_provider(engine_config.capture.socket_path_override.as_deref()).await?;

    // Resolution detection can block for up to the fallback provider's
    // timeout (compositor probes plus the simulated "no answer" wait), so
    // it runs off the async worker thread like every other sync bridge here.
    let (width, height) = tokio::task::spawn_blocking(|| PositionRegistry::detect().get_screen_resolution().unwrap_or((5120, 1440)))
        .await
        .unwrap_or((5120, 1440));

    let speed = PlaybackSpeed::new(speed).map_err(|e| anyhow::anyhow!("{e}"))?;
    let mode = match (r#loop, repeat) {
        (true, _) => PlaybackMode::LoopN(0),
        (false, Some(n)) => PlaybackMode::LoopN(n),
        (false, None) => PlaybackMode::Once,
    };

    info!(?path, events = sequence.events.len(), speed = speed.get(), "playback started");

    let mut engine = PlaybackEngine::new(provider.as_mut(), width, height, absolute, Duration::from_millis(500));
    let result = engine.run(&sequence, speed, mode, &cancel).await;
    provider.dispose();

    result.map_err(|e| anyhow::anyhow!("{e}"))?;
    info!("playback finished");
    Ok(())
}

// ── expand ──────────────────────────────────────────────────────────────────

async fn run_expand(cancel: CancellationToken) -> anyhow::Result<()> {
    let engine_config = config::load_config().unwrap_or_default();
    let Some(dictionary_path) = engine_config.expansion.dictionary_path else {
        warn!("no expansion.dictionary_path configured, nothing to expand against");
        return Ok(());
    };

    let dictionary: Vec<TextExpansion> = {
        let content = std::fs::read_to_string(&dictionary_path)?;
        toml::from_str(&content)?
    };

    let mut provider = detect_capture_provider(engine_config.capture.socket_path_override.as_deref()).await?;
    provider.configure(false, true);
    let (mut event_rx, mut error_rx) = provider.start(cancel.clone()).map_err(|e| anyhow::anyhow!(e))?;

    let simulator: Arc<dyn crossmacro_expand::application::KeySimulator> = Arc::new(EngineKeySimulator::new(
        detect_simulation_provider(engine_config.capture.socket_path_override.as_deref()).await?,
    ));
    let clipboard: Arc<dyn crossmacro_expand::application::ClipboardService> =
        Arc::new(crossmacro_expand::infrastructure::SystemClipboard::new());
    let layout: Arc<dyn crossmacro_expand::domain::LayoutService> = Arc::new(QwertyLayout);
    let fallback_layout: Arc<dyn crossmacro_expand::application::FallbackLayoutService> = Arc::new(QwertyFallbackLayout);

    let mut engine = crossmacro_expand::TextExpansionEngine::new(dictionary, simulator, Some(clipboard), layout, fallback_layout);

    info!("text expansion started, press Ctrl+C to stop");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = event_rx.recv() => match event {
                Some(event) if matches!(event.kind, RawEventKind::Key) => {
                    let _ = engine.process_key_event(event.code, event.value).await;
                }
                Some(_) => {}
                None => break,
            },
            error = error_rx.recv() => {
                if let Some(message) = error {
                    warn!(%message, "capture provider reported an error");
                } else {
                    break;
                }
            }
        }
    }
    provider.dispose();
    Ok(())
}

/// Bridges a [`SimulationProvider`] (synchronous) to
/// [`crossmacro_expand::application::KeySimulator`] (async) with a held
/// `tokio::sync::Mutex`, the inverse of the `block_in_place` bridge
/// `infrastructure::simulation::uinput_daemon` uses to go the other way.
struct EngineKeySimulator {
    provider: tokio::sync::Mutex<Box<dyn SimulationProvider>>,
}

impl EngineKeySimulator {
    fn new(provider: Box<dyn SimulationProvider>) -> Self {
        Self { provider: tokio::sync::Mutex::new(provider) }
    }
}

#[async_trait::async_trait]
impl crossmacro_expand::application::KeySimulator for EngineKeySimulator {
    async fn emit_key(&self, code: i32, pressed: bool) {
        let mut provider = self.provider.lock().await;
        if let Err(e) = provider.emit_key(code, pressed) {
            error!(error = %e, "simulation provider failed to emit key");
        }
    }

    async fn release_all(&self) {
        let mut provider = self.provider.lock().await;
        let _ = provider.release_all();
    }
}

/// US QWERTY layout — `crossmacro-engine`'s CLI has no OS keyboard-layout
/// query to defer to, unlike a GUI shell (out of scope) would. Sufficient
/// for the ASCII dictionary triggers §4.10 describes.
struct QwertyLayout;

impl crossmacro_expand::domain::LayoutService for QwertyLayout {
    fn char_for(&self, code: i32, shift: bool, _alt_gr: bool) -> Option<char> {
        let lower = ascii_for_key(Key::from_code(code as u16))?;
        Some(if shift { lower.to_ascii_uppercase() } else { lower })
    }
}

struct QwertyFallbackLayout;

impl crossmacro_expand::application::FallbackLayoutService for QwertyFallbackLayout {
    fn key_for(&self, ch: char) -> Option<(i32, bool, bool)> {
        let lower = ch.to_ascii_lowercase();
        let key = key_for_ascii(lower)?;
        Some((key as i32, ch.is_ascii_uppercase(), false))
    }
}

fn ascii_for_key(key: Key) -> Option<char> {
    let ch = match key {
        Key::A => 'a', Key::B => 'b', Key::C => 'c', Key::D => 'd', Key::E => 'e',
        Key::F => 'f', Key::G => 'g', Key::H => 'h', Key::I => 'i', Key::J => 'j',
        Key::K => 'k', Key::L => 'l', Key::M => 'm', Key::N => 'n', Key::O => 'o',
        Key::P => 'p', Key::Q => 'q', Key::R => 'r', Key::S => 's', Key::T => 't',
        Key::U => 'u', Key::V => 'v', Key::W => 'w', Key::X => 'x', Key::Y => 'y',
        Key::Z => 'z',
        Key::Digit0 => '0', Key::Digit1 => '1', Key::Digit2 => '2', Key::Digit3 => '3',
        Key::Digit4 => '4', Key::Digit5 => '5', Key::Digit6 => '6', Key::Digit7 => '7',
        Key::Digit8 => '8', Key::Digit9 => '9',
        Key::Space => ' ',
        Key::Semicolon => ';', Key::Comma => ',', Key::Dot => '.', Key::Slash => '/',
        _ => return None,
    };
    Some(ch)
}

fn key_for_ascii(ch: char) -> Option<Key> {
    let key = match ch {
        'a' => Key::A, 'b' => Key::B, 'c' => Key::C, 'd' => Key::D, 'e' => Key::E,
        'f' => Key::F, 'g' => Key::G, 'h' => Key::H, 'i' => Key::I, 'j' => Key::J,
        'k' => Key::K, 'l' => Key::L, 'm' => Key::M, 'n' => Key::N, 'o' => Key::O,
        'p' => Key::P, 'q' => Key::Q, 'r' => Key::R, 's' => Key::S, 't' => Key::T,
        'u' => Key::U, 'v' => Key::V, 'w' => Key::W, 'x' => Key::X, 'y' => Key::Y,
        'z' => Key::Z,
        '0' => Key::Digit0, '1' => Key::Digit1, '2' => Key::Digit2, '3' => Key::Digit3,
        '4' => Key::Digit4, '5' => Key::Digit5, '6' => Key::Digit6, '7' => Key::Digit7,
        '8' => Key::Digit8, '9' => Key::Digit9,
        ' ' => Key::Space,
        ';' => Key::Semicolon, ',' => Key::Comma, '.' => Key::Dot, '/' => Key::Slash,
        _ => return None,
    };
    Some(key)
}

// ── platform detection ──────────────────────────────────────────────────────

async fn detect_capture_provider(socket_path_override: Option<&str>) -> anyhow::Result<Box<dyn CaptureProvider>> {
    #[cfg(target_os = "linux")]
    {
        use crossmacro_engine::capture::{evdev_legacy::EvdevLegacyProvider, ipc::IpcCaptureProvider};
        use crossmacro_engine::infrastructure::ipc::IpcClient;

        match IpcClient::connect(socket_path_override).await {
            Ok((client, events)) => {
                info!("connected to crossmacro-daemon for capture");
                return Ok(Box::new(IpcCaptureProvider::new(client, events, tokio::runtime::Handle::current())));
            }
            Err(e) => warn!(error = %e, "daemon unreachable, falling back to direct evdev capture"),
        }
        return EvdevLegacyProvider::discover().map(|p| Box::new(p) as Box<dyn CaptureProvider>).map_err(|e| anyhow::anyhow!(e));
    }
    #[cfg(target_os = "windows")]
    {
        use crossmacro_engine::capture::windows::WindowsCaptureProvider;
        return Ok(Box::new(WindowsCaptureProvider::new()));
    }
    #[cfg(target_os = "macos")]
    {
        use crossmacro_engine::capture::macos::MacosCaptureProvider;
        return MacosCaptureProvider::new().map(|p| Box::new(p) as Box<dyn CaptureProvider>).map_err(|e| anyhow::anyhow!(e));
    }
    #[allow(unreachable_code)]
    {
        anyhow::bail!("no capture provider available on this platform")
    }
}

async fn detect_simulation_provider(socket_path_override: Option<&str>) -> anyhow::Result<Box<dyn SimulationProvider>> {
    #[cfg(target_os = "linux")]
    {
        use crossmacro_engine::infrastructure::ipc::IpcClient;
        use crossmacro_engine::infrastructure::simulation::{uinput_daemon::UinputDaemonProvider, xtest::XTestProvider};

        match IpcClient::connect(socket_path_override).await {
            Ok((client, _events)) => {
                info!("connected to crossmacro-daemon for simulation");
                return Ok(Box::new(UinputDaemonProvider::new(client, tokio::runtime::Handle::current())));
            }
            Err(e) => warn!(error = %e, "daemon unreachable, falling back to XTest simulation"),
        }
        return XTestProvider::new().map(|p| Box::new(p) as Box<dyn SimulationProvider>).map_err(|e| anyhow::anyhow!(e));
    }
    #[cfg(target_os = "windows")]
    {
        use crossmacro_engine::infrastructure::simulation::windows::WindowsInputProvider;
        return Ok(Box::new(WindowsInputProvider::new()));
    }
    #[cfg(target_os = "macos")]
    {
        use crossmacro_engine::infrastructure::simulation::macos::MacosSimulationProvider;
        return MacosSimulationProvider::new().map(|p| Box::new(p) as Box<dyn SimulationProvider>).map_err(|e| anyhow::anyhow!(e));
    }
    #[allow(unreachable_code)]
    {
        anyhow::bail!("no simulation provider available on this platform")
    }
}

mod display;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use space_shooter::assets::{Assets, Context};
use space_shooter::audio::{AudioSink, ChannelPool, SilentSink, DEFAULT_CHANNELS};
use space_shooter::compute::Game;
use space_shooter::config::{StageTable, Tuning};
use space_shooter::input::KeyTracker;

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Parser)]
#[command(name = "space_shooter", about = "Vertical-scrolling arcade shooter in the terminal")]
struct Cli {
    /// TOML stage table; the built-in six stages are used when absent.
    #[arg(long, env = "SHOOTER_STAGES")]
    stages: Option<PathBuf>,

    /// Seed for a reproducible run.
    #[arg(long, env = "SHOOTER_SEED")]
    seed: Option<u64>,

    /// Simulation and render rate.
    #[arg(long, env = "SHOOTER_FPS", default_value_t = 30)]
    fps: u32,

    /// Log destination; the terminal belongs to the renderer.
    #[arg(long, env = "SHOOTER_LOG_FILE", default_value = "space_shooter.log")]
    log_file: PathBuf,

    /// Number of sound channels.
    #[arg(long, env = "SHOOTER_CHANNELS", default_value_t = DEFAULT_CHANNELS)]
    channels: usize,
}

fn init_tracing(path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let writer = Mutex::new(file);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
    Ok(())
}

#[cfg(feature = "audio")]
fn open_sink(channels: usize) -> Box<dyn AudioSink> {
    match space_shooter::audio::ToneSink::new(channels) {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            tracing::warn!(error = %e, "audio disabled");
            Box::new(SilentSink)
        }
    }
}

#[cfg(not(feature = "audio"))]
fn open_sink(_channels: usize) -> Box<dyn AudioSink> {
    Box::new(SilentSink)
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Fixed-step loop: drain key events, tick once, render, sleep off the rest
/// of the frame.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut Game,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
    fps: u32,
) -> AppResult<()> {
    let frame_time = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
    let dt = frame_time.as_secs_f32();
    let mut keys = KeyTracker::new();
    let mut frame: u64 = 0;

    while game.is_running() {
        let frame_start = Instant::now();
        frame += 1;

        while let Ok(ev) = rx.try_recv() {
            if let Event::Key(key) = ev {
                keys.record(key, frame);
            }
        }

        let input = keys.take_frame(frame);
        game.tick(&input, dt, rng)?;
        display::render(out, game)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_file)?;

    let stages = match &cli.stages {
        Some(path) => StageTable::load(path)?,
        None => StageTable::default(),
    };
    let audio = ChannelPool::new(cli.channels, open_sink(cli.channels));
    let ctx = Context::new(Assets::procedural(), audio)?;
    let mut game = Game::new(Tuning::default(), stages, ctx)?;
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(seed = ?cli.seed, fps = cli.fps, "starting");

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Terminals without the kitty protocol fall back to the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread to blocking event reads so the loop never blocks.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = game_loop(&mut out, &mut game, &rx, &mut rng, cli.fps);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    info!(score = game.run().score, "session ended");
    result
}

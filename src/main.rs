use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::terminal;
use neonscan::backdrop::BackdropKind;
use neonscan::config::{self, AppConfig};
use neonscan::error::Result;
use neonscan::graphics::Rgb;
use neonscan::terminal::{Renderer, TerminalGuard};
use neonscan::widget::NeonWidget;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "neonscan")]
#[command(version, about = "Neon console front end with a 3D wave backdrop and a payload scanner", long_about = None)]
struct Args {
    /// Frame rate cap (clamped to 10..=240)
    #[arg(long, default_value_t = 60)]
    fps: u64,

    /// View to open first, e.g. `scanner` or `#logs`
    #[arg(long)]
    view: Option<String>,

    /// Background effect; overrides the configuration file
    #[arg(long, value_enum)]
    backdrop: Option<BackdropKind>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for reproducible scans and particle layouts
    #[arg(long)]
    seed: Option<u64>,

    /// Diagnostics go here; the terminal is taken by the UI
    #[arg(long, default_value = "neonscan.log")]
    log_file: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log = File::create(&args.log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("neonscan={}", args.log_level))),
        )
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log))
        .init();

    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => AppConfig::default(),
    };
    let backdrop = args.backdrop.unwrap_or(config.canvas.backdrop);
    let background = config.canvas.background;
    info!(backdrop = %backdrop, seed = ?args.seed, "starting");

    let (cols, rows) = match termsize::get() {
        Some(size) => (size.cols, size.rows),
        None => terminal::size()?,
    };

    let mut widget = NeonWidget::new(config, backdrop, args.seed);
    widget.layout(cols, rows);
    widget.open(args.view.as_deref());

    let mut guard = TerminalGuard::enter()?;
    let res = run(&mut guard, &mut widget, args.fps, background);
    drop(guard);

    info!(events = widget.feed().counter(), "exiting");
    res
}

fn run(
    guard: &mut TerminalGuard,
    widget: &mut NeonWidget,
    fps: u64,
    background: Rgb,
) -> Result<()> {
    let fps_cap = fps.clamp(10, 240);
    let frame_dt = Duration::from_millis((1000.0 / fps_cap as f64).round() as u64);
    let start = Instant::now();
    let mut next_frame = Instant::now();

    let frame = widget.paint();
    let mut renderer = Renderer::new(frame.width(), frame.height());
    renderer.clear_all(guard.stdout(), background)?;

    loop {
        while event::poll(Duration::from_millis(0))? {
            let event = event::read()?;
            let now_ms = start.elapsed().as_millis() as u64;
            widget.event(&event, now_ms);
            if let Event::Resize(cols, rows) = event {
                renderer.resize(cols as usize, rows as usize);
                renderer.clear_all(guard.stdout(), background)?;
            }
        }
        if widget.should_quit() {
            return Ok(());
        }

        if Instant::now() < next_frame {
            std::thread::sleep(Duration::from_millis(1));
            continue;
        }
        next_frame += frame_dt;
        // Catch up after a stall instead of rendering a burst of frames
        if next_frame < Instant::now() {
            next_frame = Instant::now() + frame_dt;
        }

        widget.update(start.elapsed().as_millis() as u64);
        let frame = widget.paint();
        renderer.draw(guard.stdout(), &frame)?;
    }
}

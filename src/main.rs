use clap::Parser;
use linebot::app::{self, App};
use linebot::config::{self, SURFACE_HEIGHT, SURFACE_WIDTH, WINDOW_HEIGHT, WINDOW_WIDTH};
use linebot::logging;
use linebot::program::{Program, Template};
use linebot::render::Renderer;
use linebot::sensors::SensorArrayConfig;
use linebot::simulation::{SensorNoise, Simulation};
use linebot::track::TrackSurface;
use log::{error, info};
use macroquad::prelude::*;
use std::path::PathBuf;

// --- Command Line Arguments ---
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Track image (PNG/JPEG) to start from instead of the sample loop.
    #[arg(long)]
    track: Option<PathBuf>,

    /// Program file to show in the editor panel. It does not change how the robot drives.
    #[arg(long, conflicts_with = "template")]
    program: Option<PathBuf>,

    /// Built-in program template to show in the editor panel.
    #[arg(long, value_enum, default_value_t = Template::Default)]
    template: Template,

    /// Number of sensors in a generated, evenly spread layout (1 to 8).
    /// Without it the stock five-sensor bar is used.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=8))]
    sensors: Option<u8>,

    /// Uniform sensor noise in percent of each reading (0 disables it).
    #[arg(long, default_value_t = 0.0)]
    sensor_noise: f64,

    /// Seed for the sensor noise generator.
    #[arg(long)]
    seed: Option<u64>,

    /// Start driving as soon as the window opens.
    #[arg(long)]
    start: bool,

    /// Debug filter to specify log topics (e.g., "sim,sensor,drive")
    /// Available topics: sim, sensor, drive, policy, track
    #[arg(long)]
    debug_filter: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Line Follower Simulator".to_owned(),
        window_width: WINDOW_WIDTH,
        window_height: WINDOW_HEIGHT,
        window_resizable: false,
        ..Default::default()
    }
}

fn build_app(args: &Args) -> Result<App, Box<dyn std::error::Error>> {
    let mut surface = TrackSurface::with_sample_track(SURFACE_WIDTH, SURFACE_HEIGHT);
    if let Some(path) = &args.track {
        surface.replace_all(app::load_track_image(path, SURFACE_WIDTH, SURFACE_HEIGHT)?)?;
    }

    let program = match &args.program {
        Some(path) => Program::from_file(path)?,
        None => Program::from_template(args.template)?,
    };

    let sensors = match args.sensors {
        Some(count) => SensorArrayConfig::with_count(count as usize),
        None => SensorArrayConfig::default(),
    };
    let simulation = Simulation::new(SURFACE_WIDTH, SURFACE_HEIGHT, sensors)
        .with_noise(SensorNoise::new(args.sensor_noise, args.seed));

    let mut app = App::new(surface, simulation, program);
    if args.start {
        app.start();
    }
    Ok(app)
}

#[macroquad::main(window_conf)]
async fn main() {
    let args = Args::parse();

    let level = logging::parse_level(&args.log_level);
    if let Err(e) = logging::init_logger(level, args.debug_filter.clone()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    info!("Initializing line follower simulator ({} FPS nominal)...", config::FRAME_RATE);

    let mut app = match build_app(&args) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to set up simulator: {}", e);
            std::process::exit(1);
        }
    };

    let mut renderer = Renderer::new();
    app.run(&mut renderer).await;
}

use std::f64::consts::TAU;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use foundation::Millis;
use foundation::math::{Vec3, look_at_euler};
use game::GameConfig;
use game::outputs::{EXPLORE_COUNTRY, GAME_OVER_TEXT, STATE, TARGET_COUNTRY};
use globe_quiz::replay::{Script, replay};
use globe_quiz::settings::{AtlasSource, QuizSetup, load_game_config};
use globe_quiz::{CAMERA, Host, QuizEffect, SimulatedHost};
use rand::SeedableRng;
use rand::rngs::StdRng;
use scene::components::Transform;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Point-at-the-country globe quiz")]
struct Args {
    /// GeoJSON FeatureCollection of countries (default: bundled sample)
    #[arg(long)]
    atlas: Option<PathBuf>,

    /// JSON game config; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for target selection
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON event script on a virtual clock and print the outputs
    Replay {
        script: PathBuf,

        /// Print every published value instead of only the latest ones
        #[arg(long)]
        history: bool,
    },

    /// Orbit a simulated camera around the globe in real time
    Run {
        /// How long to run
        #[arg(long, default_value_t = 30)]
        seconds: u64,

        /// Explore the globe instead of playing a game
        #[arg(long)]
        explore: bool,

        /// Orbit period in seconds
        #[arg(long, default_value_t = 12.0)]
        period: f64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_game_config(path)?,
        None => GameConfig::default(),
    };
    let atlas = args
        .atlas
        .clone()
        .map(AtlasSource::File)
        .unwrap_or_default();
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let setup = QuizSetup::new(config, rng).with_atlas(atlas);

    match args.command {
        Command::Replay { script, history } => {
            let script = Script::from_path(&script)?;
            let report = replay(&script, setup);
            if history {
                for published in report.outputs.history() {
                    println!(
                        "{}",
                        serde_json::json!({
                            "name": published.name,
                            "value": globe_quiz::replay::output_json(&published.value),
                        })
                    );
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&report.latest_json())?);
            }
        }
        Command::Run {
            seconds,
            explore,
            period,
        } => run_live(setup, seconds, explore, period).await,
    }
    Ok(())
}

async fn run_live(setup: QuizSetup<StdRng>, seconds: u64, explore: bool, period: f64) {
    let tick_ms = setup.config.tick_interval_ms.max(1);
    let mut host = SimulatedHost::with_scene(
        orbit_camera(0.0, period),
        Transform::identity(),
        Transform::identity(),
    );
    let mut effect = QuizEffect::initialize(&mut host, setup, Millis::ZERO);
    if explore {
        host.request_state("EXPLORE");
    }

    let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
    let start = tokio::time::Instant::now();
    loop {
        interval.tick().await;
        let elapsed = start.elapsed();
        if elapsed.as_secs() >= seconds {
            break;
        }
        let now = Millis(elapsed.as_millis() as u64);
        host.set_transform(CAMERA, orbit_camera(elapsed.as_secs_f64(), period));
        effect.tick(now, &mut host);

        for published in host.outputs().drain() {
            if matches!(
                published.name,
                STATE | TARGET_COUNTRY | EXPLORE_COUNTRY | GAME_OVER_TEXT
            ) {
                if let Some(text) = published.value.as_text() {
                    info!(output = published.name, value = text, %now);
                }
            }
        }
    }
    effect.shutdown(&mut host);
    info!(seconds, "run finished");
}

/// Camera circling the globe along a tilted orbit, always facing its center.
fn orbit_camera(t_secs: f64, period: f64) -> Transform {
    let angle = TAU * t_secs / period.max(0.1);
    let eye = Vec3::new(0.3 * angle.sin(), 0.12 * (angle * 0.5).sin(), 0.3 * angle.cos());
    let camera = Transform::translate(eye);
    match look_at_euler(eye, Vec3::ZERO) {
        Some(rotation) => camera.with_rotation(rotation),
        None => camera,
    }
}

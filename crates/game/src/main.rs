//! Otter World - headless driver.
//!
//! Loads the world in batches, then flies a scripted otter around for a while
//! at 60 Hz and logs what the crowd does about it.
//!
//! Usage: `otterworld [--seconds N] [--write-config]`

use anyhow::{bail, Context, Result};
use engine_core::Time;
use glam::Vec2;
use otterworld::{FrameInput, GameConfig, Session, SessionPhase};

const FRAME_DT: f32 = 1.0 / 60.0;
const DEFAULT_SECONDS: f32 = 40.0;
const CENSUS_INTERVAL: u64 = 5 * 60;

struct Args {
    seconds: f32,
    write_config: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        seconds: DEFAULT_SECONDS,
        write_config: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seconds" => {
                let value = it.next().context("--seconds needs a value")?;
                args.seconds = value
                    .parse()
                    .with_context(|| format!("invalid --seconds value {value:?}"))?;
            }
            "--write-config" => args.write_config = true,
            other => bail!("unknown argument {other:?}"),
        }
    }
    Ok(args)
}

/// Scripted input: stroll, take off, glide down, blast the crowd, circle.
fn scripted_input(t: f32, frame: u64) -> FrameInput {
    let mut input = FrameInput {
        camera_yaw: t * 0.05,
        ..Default::default()
    };
    match t {
        t if t < 8.0 => input.move_dir = Vec2::new(0.0, 1.0),
        t if t < 14.0 => {
            input.move_dir = Vec2::new(0.3, 1.0).normalize();
            input.want_fly = true;
        }
        t if t < 20.0 => {
            input.move_dir = Vec2::new(0.0, 1.0);
            input.want_descend = true;
        }
        _ => {
            let a = t * 0.4;
            input.move_dir = Vec2::new(a.cos(), a.sin());
            input.fire_rocket = frame % 30 == 0;
        }
    }
    // One repel blast a second after landing, then every ten seconds.
    if t >= 21.0 && frame % 600 == 0 {
        input.repel = true;
    }
    input
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let config = GameConfig::load();
    if args.write_config {
        config.save();
        log::info!("Wrote config.ron");
        return Ok(());
    }

    log::info!("Starting Otter World (seed {})", config.seed);
    let mut session = Session::new(config.clone());

    let mut last_reported = 0;
    while session.load_step() == SessionPhase::Loading {
        let pct = (session.progress() * 100.0) as u32;
        if pct >= last_reported + 25 {
            log::info!("Loading terrain... {}%", pct);
            last_reported = pct;
        }
    }

    let mut time = Time::with_max_delta(config.max_frame_delta);
    let total_frames = (args.seconds.max(0.0) / FRAME_DT) as u64;
    for frame in 0..total_frames {
        time.advance(FRAME_DT);
        let t = time.elapsed_seconds();
        let input = scripted_input(t, frame);
        session.step(time.delta_seconds(), t, &input);

        if session.is_game_over() {
            log::info!("Game over at {:.1}s, respawning", t);
            session.respawn();
        }

        if frame % CENSUS_INTERVAL == 0 {
            let otter = session.otter();
            let instances = session.crowd().instance_data();
            let bytes: &[u8] = bytemuck::cast_slice(&instances);
            log::info!(
                "t={:5.1}s otter {:?} at ({:.1}, {:.1}, {:.1}) | {} | debris {} | rockets {}",
                t,
                otter.state(),
                otter.position().x,
                otter.position().y,
                otter.position().z,
                session.crowd().counts(),
                session.crowd().debris().active_count(),
                session.rockets().active_count(),
            );
            log::debug!("Crowd instance buffer: {} bytes", bytes.len());
        }
    }

    let counts = session.crowd().counts();
    log::info!(
        "Finished after {} frames: {} riding, {} dead, {} debris chunks thrown",
        time.frame_count(),
        counts.riding,
        counts.dead,
        session.crowd().debris().spawned_total()
    );
    Ok(())
}

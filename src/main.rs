//! Bounce Box entry point
//!
//! Loads or generates a scene and runs it either on the virtual clock (as
//! fast as possible) or in real time behind the background pump.
//!
//! Usage: bounce-box [SCENE.json] [--seed N] [--balls K] [--realtime] [--millis T]

use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use bounce_box::consts::PUMP_QUANTUM_MS;
use bounce_box::platform::{WallClock, pump};
use bounce_box::renderer::{LogRenderer, Renderer};
use bounce_box::sim::{Clock, Millis, Simulation, StepClock};
use bounce_box::{SimConfig, SimError, SimResult};

const DEFAULT_RUN_MS: Millis = 10_000;
const DEFAULT_BALLS: usize = 5;

#[derive(Debug, Default)]
struct Args {
    scene: Option<String>,
    seed: Option<u64>,
    balls: Option<usize>,
    realtime: bool,
    millis: Option<Millis>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> SimResult<Args> {
    fn value<T: std::str::FromStr>(flag: &str, raw: Option<String>) -> SimResult<T> {
        raw.as_deref()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| SimError::InvalidConfig(format!("{flag} expects a number")))
    }

    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => parsed.seed = Some(value("--seed", args.next())?),
            "--balls" => parsed.balls = Some(value("--balls", args.next())?),
            "--millis" => parsed.millis = Some(value("--millis", args.next())?),
            "--realtime" => parsed.realtime = true,
            flag if flag.starts_with("--") => {
                return Err(SimError::InvalidConfig(format!("unknown option {flag}")));
            }
            _ if parsed.scene.is_none() => parsed.scene = Some(arg),
            _ => return Err(SimError::InvalidConfig(format!("unexpected argument {arg}"))),
        }
    }
    Ok(parsed)
}

fn scene(args: &Args) -> SimResult<SimConfig> {
    if let Some(path) = &args.scene {
        return SimConfig::load(path);
    }
    match (args.seed, args.balls) {
        (None, None) => Ok(SimConfig::default()),
        (seed, balls) => {
            let seed = seed.unwrap_or(0);
            log::info!("Generating scene with seed: {}", seed);
            Ok(SimConfig::random_box(seed, balls.unwrap_or(DEFAULT_BALLS)))
        }
    }
}

fn report<C: Clock, R: Renderer>(sim: &Simulation<C, R>) {
    let world = sim.world();
    log::info!(
        "t={}ms: {} events delivered, kinetic energy {:.1}",
        sim.now(),
        sim.dispatched(),
        world.kinetic_energy()
    );
    for (i, body) in world.bodies.iter().enumerate() {
        log::info!(
            "  ball {}: pos ({:.1}, {:.1}) vel ({:.1}, {:.1})",
            i,
            body.position.x,
            body.position.y,
            body.velocity.x,
            body.velocity.y
        );
    }
}

fn run(args: Args) -> SimResult<()> {
    let config = scene(&args)?;
    let millis = args.millis.unwrap_or(DEFAULT_RUN_MS);

    if args.realtime {
        let mut sim = Simulation::with_painter(&config, WallClock::new(), LogRenderer::new())?;
        sim.start()?;
        let sim = Arc::new(Mutex::new(sim));
        let pump = pump::spawn(Arc::clone(&sim), Duration::from_millis(PUMP_QUANTUM_MS))?;
        thread::sleep(Duration::from_millis(millis));
        pump.stop()?;

        let sim = sim.lock().map_err(|_| SimError::PumpPoisoned)?;
        log::info!("{} frames painted", sim.renderer().frames());
        report(&*sim);
    } else {
        let mut sim = Simulation::with_painter(&config, StepClock::new(), LogRenderer::new())?;
        sim.start()?;
        sim.run_for(millis)?;
        log::info!("{} frames painted", sim.renderer().frames());
        report(&sim);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Bounce Box starting...");

    let result = parse_args(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("bounce-box: {err}");
            ExitCode::FAILURE
        }
    }
}

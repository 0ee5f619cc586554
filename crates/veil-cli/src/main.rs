//! `veil` – MotionVeil command line front end.
//!
//! Runs a headless privatization session:
//!
//! 1. Loads `~/.veilmotion/config.toml` (writing defaults on first run).
//! 2. Builds the privacy profiles and pipeline from the configuration.
//! 3. Drives the pipeline from a simulated tracking rig at the configured
//!    frame rate, fanning events out to the analytics log, the broadcast
//!    bus and (optionally) an NDJSON recorder.
//! 4. Intercepts **Ctrl-C** to end the session after the current frame and
//!    print the run summary.

mod config;

use colored::Colorize;
use std::sync::atomic::Ordering;
use tracing::warn;

use veil_pipeline::{
    GroundQuery, MechanismKind, PipelineConfig, PrivacyPipeline, ProfileSelection, ProfileSet,
};
use veil_runtime::{
    AnalyticsLog, BroadcastConsumer, JsonlRecorder, PoseBus, Session, SessionConfig, init_tracing,
};
use veil_tracking::{FlatGround, SweepTracker};

fn main() {
    // Tracing must come up before the Tokio runtime; the OTLP exporter is
    // synchronous for exactly this reason.
    let _guard = init_tracing("veil");

    print_banner();

    // ── Configuration ─────────────────────────────────────────────────────
    let mut cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };
    config::apply_env_overrides(&mut cfg);
    let cfg = cfg;

    // ── Pipeline assembly ─────────────────────────────────────────────────
    let selection = ProfileSelection {
        context: cfg.context,
        strength_percent: cfg.strength_percent,
    };
    let profiles = ProfileSet::build(
        selection,
        cfg.eye_mechanism,
        cfg.hand_mechanism,
        &cfg.mechanism_settings,
    );
    let mut pipeline = PrivacyPipeline::new(
        PipelineConfig {
            max_displacement: cfg.max_displacement,
            gaze_project_distance: cfg.gaze_project_distance,
        },
        profiles,
    );

    pipeline.add_consumer(Box::new(AnalyticsLog::new()));
    let bus = PoseBus::default();
    pipeline.add_consumer(Box::new(BroadcastConsumer::new(bus.clone())));

    if let Some(path) = &cfg.record_path {
        match JsonlRecorder::create(path) {
            Ok(recorder) => {
                println!("  Recording to {}", path.display().to_string().bold());
                pipeline.add_consumer(Box::new(recorder));
            }
            Err(e) => println!("{}: {}", "Recorder error".red(), e),
        }
    }

    println!();
    println!("  Context     : {}", cfg.context.to_string().bold());
    println!(
        "  Strength    : {} ({} effective)",
        cfg.strength_percent,
        format!("{:.1}", selection.effective_strength()).bold()
    );
    println!("  Eye / head  : {}", mechanism_label(cfg.eye_mechanism).bold());
    println!("  Hands       : {}", mechanism_label(cfg.hand_mechanism).bold());
    println!("  Frame rate  : {} Hz", cfg.frame_hz);
    println!();

    // ── Session ───────────────────────────────────────────────────────────
    let mut session = Session::new(
        pipeline,
        SessionConfig {
            frame_hz: cfg.frame_hz,
            frame_budget: cfg.frame_budget,
        },
    );

    let stop = session.stop_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – ending session …".yellow().bold());
        stop.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}: {}", "Failed to start async runtime".red(), e);
            return;
        }
    };

    let ground = cfg.ground_height.map(FlatGround::new);
    let mut tracker = SweepTracker::new(cfg.frame_hz);
    let stats = runtime.block_on(
        session.run(
            &mut tracker,
            ground.as_ref().map(|g| g as &dyn GroundQuery),
        ),
    );

    println!();
    println!(
        "  {} Session complete: {} frames, {} events emitted.",
        "✓".green().bold(),
        stats.frames.to_string().bold(),
        stats.events.to_string().bold()
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn mechanism_label(kind: Option<MechanismKind>) -> &'static str {
    match kind {
        Some(MechanismKind::Gaussian) => "gaussian",
        Some(MechanismKind::Quantize) => "quantize",
        Some(MechanismKind::Noop) => "noop",
        Some(MechanismKind::GazeJitter) => "gaze-jitter",
        None => "passthrough (none configured)",
    }
}

fn print_banner() {
    println!();
    println!("{}", r#" _   __     _ __"#.bold().cyan());
    println!("{}", r#"| | / /__  (_) /"#.bold().cyan());
    println!("{}", r#"| |/ / -_)/ / / "#.bold().cyan());
    println!("{}", r#"|___/\__//_/_/  "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "MotionVeil".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Pose privatization for XR motion streams");
    println!();
}

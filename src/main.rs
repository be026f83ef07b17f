//! Behavior Gate - Two-trial behavioral verification
//!
//! Runs timed cursor and gaze trials, condenses each into a feature vector,
//! and accepts or rejects the session on cross-trial similarity.

use behavior_gate::app::cli::{Cli, Commands, ConfigAction};
use behavior_gate::app::config::Config;
use behavior_gate::capture::gaze_pump::{GazePump, ScriptedScene};
use behavior_gate::capture::pointer_source::SyntheticPointerSource;
use behavior_gate::capture::ring_buffer::SampleRingBuffer;
use behavior_gate::session::{SessionReport, TrialController, TrialPhase};
use behavior_gate::similarity::SimilarityMode;
use behavior_gate::time::clock::MonotonicClock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Initialize the monotonic clock
    MonotonicClock::init();

    // Load config
    let mut config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    // Execute command
    match cli.command {
        Commands::Verify {
            duration,
            first_seed,
            second_seed,
            mode,
            output,
            label,
        } => {
            if let Some(secs) = duration {
                config.trial.trial_duration_secs = secs;
            }
            if let Some(mode) = mode {
                config.similarity.mode = mode.parse::<SimilarityMode>()?;
            }
            config.validate()?;
            run_verify(first_seed, second_seed, output, label, &config)?;
        }
        Commands::Inspect { report } => {
            run_inspect(&report)?;
        }
        Commands::Config { action } => {
            run_config(action, &config)?;
        }
    }

    Ok(())
}

fn run_verify(
    first_seed: u64,
    second_seed: u64,
    output: Option<PathBuf>,
    label: Option<String>,
    config: &Config,
) -> anyhow::Result<()> {
    let controller = TrialController::new(config)?;

    // Set up Ctrl+C handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_handler = stop_flag.clone();

    ctrlc::set_handler(move || {
        stop_flag_handler.store(true, Ordering::SeqCst);
    })?;

    info!(
        "Running two {:.1}s trials (actor seeds {} and {})",
        config.trial.trial_duration_secs, first_seed, second_seed
    );
    info!("Press Ctrl+C to abort");

    for seed in [first_seed, second_seed] {
        run_trial(seed, &controller, config, &stop_flag)?;

        if stop_flag.load(Ordering::SeqCst) {
            warn!("Interrupted; aborting session");
            controller.cancel();
            return Ok(());
        }
    }

    let decision = controller.final_decision()?;

    println!("\nSession decision ({} mode):", decision.mode);
    println!("  Mouse similarity:   {:.2}", decision.mouse_similarity);
    println!("  Eye similarity:     {:.2}", decision.eye_similarity);
    println!("  Overall similarity: {:.2}", decision.overall_similarity);
    println!(
        "  Result: {}",
        if decision.accepted { "ACCEPTED" } else { "REJECTED" }
    );

    if let Some(path) = output {
        let session_label = label.unwrap_or_else(|| {
            chrono::Local::now()
                .format("session_%Y%m%d_%H%M%S")
                .to_string()
        });
        let report = SessionReport::from_controller(session_label, config, &controller);

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        report.save(&path)?;
        info!("Saved session report to {:?}", path);
        println!("  Report: {}", path.display());
    }

    Ok(())
}

/// Run a single trial to completion: open the window, wire the synthetic
/// sources to it, and drain pointer samples until the timer closes it.
fn run_trial(
    seed: u64,
    controller: &TrialController,
    config: &Config,
    stop_flag: &Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let trial = controller.start_trial()?;
    info!("Trial {} started (actor seed {})", trial.index, seed);

    // Pointer samples travel through the lock-free ring; gaze frames are fed
    // to the controller directly by the pump.
    let buffer = SampleRingBuffer::with_capacity(config.capture.ring_buffer_size);
    let (producer, mut consumer) = buffer.split();

    let mut pointer = SyntheticPointerSource::new();
    pointer.start(
        producer,
        trial.sampling_token.clone(),
        config.capture.pointer_rate_hz,
        seed,
    )?;

    let scene = ScriptedScene::new(seed).with_blink_every(24);
    let mut pump = GazePump::new();
    pump.start(
        scene.clone(),
        scene.clone(),
        scene,
        controller.clone(),
        trial.sampling_token.clone(),
        config.capture.frame_rate_hz,
    )?;

    // Drain loop; samples popped after the window closes are dropped by the
    // controller.
    loop {
        for sample in consumer.pop_batch(100) {
            controller.ingest_pointer(sample);
        }

        if controller.status().phase != TrialPhase::TrialActive(trial.index) {
            break;
        }
        if stop_flag.load(Ordering::SeqCst) {
            break;
        }

        std::thread::sleep(std::time::Duration::from_millis(10));
    }

    // The trial token is cancelled once the window closes, so both loops are
    // already winding down; stop() joins them.
    pointer.stop();
    pump.stop();

    if let Some(result) = controller.trial_result(trial.index) {
        info!(
            "Trial {} closed: {} velocity samples, {} gaze frames ({} pointer events discarded, {} gaze frames rejected)",
            result.trial_index,
            result.velocity_samples,
            result.gaze_frames,
            result.discarded_pointer_events,
            result.rejected_gaze_frames
        );
    }

    Ok(())
}

fn run_inspect(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("Report file not found: {:?}", path);
    }

    let report = SessionReport::load(path)?;
    let m = &report.metadata;

    println!("Session {}", m.id);
    println!("  Label:          {}", m.label);
    println!("  Created:        {}", m.created_at);
    println!("  Mode:           {}", m.similarity_mode);
    println!("  Trial duration: {:.1}s", m.trial_duration_secs);

    for trial in &report.trials {
        println!("\nTrial {} (completed {})", trial.trial_index, trial.completed_at);
        println!("  Velocity samples:         {}", trial.velocity_samples);
        println!("  Gaze frames:              {}", trial.gaze_frames);
        println!("  Discarded pointer events: {}", trial.discarded_pointer_events);
        println!("  Rejected gaze frames:     {}", trial.rejected_gaze_frames);

        let f = &trial.features;
        println!(
            "  Features: v={:.2} a={:.2} angle_sd={:.2} gaze=({:.1}, {:.1})",
            f.mean_velocity, f.mean_acceleration, f.angle_stddev, f.mean_gaze_x, f.mean_gaze_y
        );
    }

    match &report.decision {
        Some(d) => {
            println!("\nDecision ({} mode):", d.mode);
            println!("  Mouse similarity:   {:.2}", d.mouse_similarity);
            println!("  Eye similarity:     {:.2}", d.eye_similarity);
            println!("  Overall similarity: {:.2}", d.overall_similarity);
            println!(
                "  Result: {}",
                if d.accepted { "ACCEPTED" } else { "REJECTED" }
            );
        }
        None => println!("\nNo decision recorded (session incomplete)"),
    }

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = config.to_toml()?;
            println!("Configuration ({:?}):\n", Config::default_path());
            println!("{}", toml_str);
        }
        ConfigAction::Init { force } => {
            let config_path = Config::default_path();

            if config_path.exists() && !force {
                anyhow::bail!(
                    "Config already exists at {:?}. Use --force to overwrite.",
                    config_path
                );
            }

            config.save_default()?;
            println!("Created config at {:?}", config_path);
            println!("\nConfig content:\n{}", config.to_toml()?);

            std::fs::create_dir_all(Cli::reports_dir())?;
            println!("Created reports directory: {:?}", Cli::reports_dir());
        }
    }

    Ok(())
}

//! Headless runner: steps a simulation with a fixed frame time, replays scripted
//! pointer clicks, and writes PNG snapshots of the trail field.

use circular_queue::CircularQueue;
use log::{error, info, warn};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use slime_trails::{
    render::{save_png, FieldRenderer},
    settings::{Settings, DEFAULT_SETTINGS_FILE},
    PointerEvent, Simulation, SlimeError,
};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver},
    time::{Duration, Instant},
};

const STEP_TIME_WINDOW: usize = 120;
const SETTINGS_EXTENSIONS: [&str; 4] = ["toml", "yaml", "json", "ini"];

fn main() -> Result<(), SlimeError> {
    dotenv::dotenv().ok();
    env_logger::init();

    let settings_name = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SLIME_SETTINGS").ok())
        .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string());
    let settings_path = resolve_settings_path(&settings_name);

    let mut settings = match &settings_path {
        Some(_) => Settings::load_from_file(&settings_name)?,
        None => {
            warn!(
                "no settings file named '{}' found, running with defaults",
                settings_name
            );
            Settings::default()
        }
    };

    let mut simulation = Simulation::new(&settings)?;
    let mut renderer = FieldRenderer::new(settings.color_mode);

    // Keep the watcher alive for the whole run, dropping it stops the events
    let (_watcher, settings_changed) = match (&settings_path, settings.watch_settings) {
        (Some(path), true) => {
            let (watcher, receiver) = watch_settings(path)?;
            (Some(watcher), Some(receiver))
        }
        _ => (None, None),
    };

    let output_dir = PathBuf::from(&settings.output_dir);
    fs::create_dir_all(&output_dir)?;

    let mut step_times: CircularQueue<Duration> = CircularQueue::with_capacity(STEP_TIME_WINDOW);

    info!(
        "running {} frames of {}s each",
        settings.frame_count, settings.frame_dt
    );

    for frame in 0..settings.frame_count {
        if let Some(receiver) = &settings_changed {
            if receiver.try_iter().count() > 0 {
                reload_settings(&settings_name, &mut settings, &mut simulation, &mut renderer);
            }
        }

        for pointer in settings.pointer_events.iter().filter(|p| p.frame == frame) {
            match PointerEvent::from_display(
                pointer.x,
                pointer.y,
                settings.display_width,
                settings.display_height,
                simulation.width(),
                simulation.height(),
            ) {
                Some(event) => simulation.handle_pointer(event),
                None => warn!("ignoring unmappable pointer event {:?}", pointer),
            }
        }

        let started = Instant::now();
        simulation.step(settings.frame_dt)?;
        step_times.push(started.elapsed());

        if settings.snapshot_interval > 0 && (frame + 1) % settings.snapshot_interval == 0 {
            let path = output_dir.join(format!("frame_{:05}.png", frame + 1));
            let field = simulation.current_field();
            let rgba = renderer.draw(&field, simulation.deposit_value(), simulation.trail_color());
            save_png(&path, &rgba, simulation.width(), simulation.height())?;

            info!(
                "frame {}: mean step time {:.2?} over the last {} frames, snapshot at {}",
                frame + 1,
                mean_duration(&step_times),
                step_times.len(),
                path.display()
            );
        }
    }

    Ok(())
}

fn resolve_settings_path(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    if path.is_file() {
        return Some(path.to_path_buf());
    }

    SETTINGS_EXTENSIONS
        .iter()
        .map(|extension| path.with_extension(extension))
        .find(|candidate| candidate.is_file())
}

fn watch_settings(path: &Path) -> Result<(RecommendedWatcher, Receiver<()>), SlimeError> {
    let (sender, receiver) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) if event.kind.is_modify() => {
                // The receiver going away just means the run is over
                let _ = sender.send(());
            }
            Ok(_) => (),
            Err(e) => error!("settings watcher error: {}", e),
        }
    })?;
    watcher.watch(path, RecursiveMode::NonRecursive)?;
    info!("watching {} for changes", path.display());

    Ok((watcher, receiver))
}

fn reload_settings(
    settings_name: &str,
    settings: &mut Settings,
    simulation: &mut Simulation,
    renderer: &mut FieldRenderer,
) {
    let new_settings = match Settings::load_from_file(settings_name) {
        Ok(new_settings) => new_settings,
        Err(e) => {
            error!("failed to reload settings, keeping the old ones: {}", e);
            return;
        }
    };

    if settings.did_tunable_settings_change(&new_settings) {
        info!("tunable settings have changed, running an update...");
    }
    if settings.did_field_settings_change(&new_settings) {
        info!("field settings have changed, the trail field will be reset");
    }

    if let Err(e) = simulation.apply_settings(&new_settings) {
        error!(
            "failed to update the simulation after a settings change with error: {}",
            e
        );
        return;
    }

    renderer.set_color_mode(new_settings.color_mode);
    *settings = new_settings;
}

fn mean_duration(durations: &CircularQueue<Duration>) -> Duration {
    if durations.len() == 0 {
        return Duration::ZERO;
    }

    durations.iter().sum::<Duration>() / durations.len() as u32
}

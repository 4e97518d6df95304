//! Play command: headless playback that logs what a renderer would be given

use super::{load_registry, resolve_reference};
use anyhow::{Context, Result};
use mosh_animation::animation::{PoseConsumer, PoseUpdate};
use mosh_animation::clip::AnimationClipData;
use mosh_animation::loader::spawn_batch_load;
use mosh_animation::settings::PlaybackSettings;
use mosh_animation::AnimationSystem;
use mosh_runtime::{PlaybackClock, RuntimeSystem};
use std::path::Path;

pub struct PlayArgs {
    pub path: String,
    pub list: Option<String>,
    pub settings: Option<String>,
    pub models: Option<String>,
    pub tick_rate: f64,
    pub speed: Option<f64>,
    pub looping: bool,
    pub backwards: bool,
    pub max_seconds: Option<f64>,
}

pub fn run(args: PlayArgs) -> Result<()> {
    let settings = build_settings(&args)?;
    let registry = load_registry(args.models.as_deref())?;
    let reference = resolve_reference(&args.path, args.list.as_deref())?;

    if settings.looping && args.max_seconds.is_none() {
        tracing::warn!("Looping without --max-seconds plays until interrupted");
    }
    if settings.play_backwards && args.max_seconds.is_none() {
        tracing::warn!("Backward playback holds at frame 0 and plays until interrupted");
    }

    let pending = spawn_batch_load(reference, registry, settings.clone())
        .context("Failed to start loading animations")?;

    let mut system = AnimationSystem::new(settings, Box::new(PoseLogger::default()));
    system.set_pending(pending);
    system.initialize()?;

    let mut clock = PlaybackClock::with_tick_rate(args.tick_rate);
    loop {
        let dt = clock.tick();
        system.update(dt)?;

        if system.is_complete() {
            break;
        }
        if args.max_seconds.is_some_and(|max| clock.total_time >= max) {
            tracing::info!("Stopping after {:.2}s", clock.total_time);
            break;
        }
        std::thread::sleep(clock.time_until_next_tick());
    }

    system.shutdown()?;
    Ok(())
}

fn build_settings(args: &PlayArgs) -> Result<PlaybackSettings> {
    let mut settings = match &args.settings {
        Some(path) => PlaybackSettings::load_from_file(Path::new(path))
            .with_context(|| format!("Failed to load settings {}", path))?,
        None => PlaybackSettings::default(),
    };

    if let Some(speed) = args.speed {
        settings.speed = speed;
    }
    settings.looping |= args.looping;
    settings.play_backwards |= args.backwards;
    settings.validate().context("Invalid playback settings")?;
    Ok(settings)
}

/// Logs one line per character per whole source frame reached.
#[derive(Default)]
struct PoseLogger {
    last_frame: Vec<Option<usize>>,
}

impl PoseConsumer for PoseLogger {
    fn begin_character(&mut self, index: usize, clip: &AnimationClipData) {
        if self.last_frame.len() <= index {
            self.last_frame.resize(index + 1, None);
        }
        self.last_frame[index] = None;
        tracing::info!(
            character = index,
            "Playing {} ({}, {} frames @ {} fps, {:.2}s)",
            clip.name(),
            clip.gender(),
            clip.frame_count(),
            clip.frame_rate(),
            clip.duration()
        );
    }

    fn apply_pose(&mut self, index: usize, update: &PoseUpdate) {
        let Some(last) = self.last_frame.get_mut(index) else {
            return;
        };
        if *last == Some(update.frame.frame_before) {
            return;
        }
        *last = Some(update.frame.frame_before);

        let root = update.pose.translation;
        tracing::debug!(
            character = index,
            frame = update.frame.frame,
            first = update.first_frame,
            "root ({:.3}, {:.3}, {:.3}), {} joints",
            root.x,
            root.y,
            root.z,
            update.pose.rotations.len()
        );
    }

    fn end_character(&mut self, index: usize) {
        tracing::info!(character = index, "Animation ended");
    }
}

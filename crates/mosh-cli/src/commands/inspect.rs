//! Inspect command: print the contents of one animation file

use super::load_registry;
use anyhow::{Context, Result};
use mosh_animation::clip::AnimationClipData;
use mosh_animation::loader::load_clip_from_file;
use mosh_animation::settings::PlaybackSettings;
use std::path::Path;

pub struct InspectArgs {
    pub file: String,
    pub format: String,
    pub models: Option<String>,
}

pub fn run(args: InspectArgs) -> Result<()> {
    let registry = load_registry(args.models.as_deref())?;
    let clip = load_clip_from_file(Path::new(&args.file), &registry, &PlaybackSettings::default())
        .with_context(|| format!("Failed to load {}", args.file))?;

    if args.format == "json" {
        print_clip_json(&clip)
    } else {
        print_clip_text(&clip);
        Ok(())
    }
}

fn print_clip_text(clip: &AnimationClipData) {
    let first = clip.translation(0);
    let last = clip.translation(clip.frame_count() - 1);

    println!("Animation: {}", clip.name());
    println!("  Model:    {} ({} joints)", clip.model_name(), clip.joint_count());
    println!("  Gender:   {}", clip.gender());
    println!("  Frames:   {} @ {} fps", clip.frame_count(), clip.frame_rate());
    println!("  Duration: {:.3}s", clip.duration());
    println!("  Betas:    {}", clip.body_shape().len());
    println!(
        "  Root:     ({:.3}, {:.3}, {:.3}) -> ({:.3}, {:.3}, {:.3})",
        first.x, first.y, first.z, last.x, last.y, last.z
    );
}

fn print_clip_json(clip: &AnimationClipData) -> Result<()> {
    let output = serde_json::json!({
        "name": clip.name(),
        "model": clip.model_name(),
        "gender": clip.gender().to_string(),
        "frame_rate": clip.frame_rate(),
        "frame_count": clip.frame_count(),
        "joint_count": clip.joint_count(),
        "duration": clip.duration(),
        "betas": clip.body_shape(),
        "first_translation": clip.translation(0).to_array(),
        "last_translation": clip.translation(clip.frame_count() - 1).to_array(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

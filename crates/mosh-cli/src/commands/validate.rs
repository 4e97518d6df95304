//! Validate command: load a batch and report every file that fails

use super::{load_registry, resolve_reference};
use anyhow::Result;
use mosh_animation::loader::{load_batch, LoadReport};
use mosh_animation::settings::PlaybackSettings;

pub struct ValidateArgs {
    pub path: String,
    pub list: Option<String>,
    pub models: Option<String>,
    pub format: String,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let registry = load_registry(args.models.as_deref())?;
    let reference = resolve_reference(&args.path, args.list.as_deref())?;
    let report = load_batch(&reference, &registry, &PlaybackSettings::default());

    if args.format == "json" {
        print_report_json(&report)?;
    } else {
        print_report_text(&report);
    }

    if !report.is_complete() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report_text(report: &LoadReport) {
    println!(
        "{} of {} animation sets loaded ({} clips)",
        report.groups.len(),
        report.lines_total,
        report.clip_count()
    );

    if report.failures.is_empty() {
        println!("All animations loaded.");
        return;
    }

    println!();
    for failure in &report.failures {
        println!("  [ERROR] {}: {}", failure.file, failure.error);
    }
}

fn print_report_json(report: &LoadReport) -> Result<()> {
    let failures: Vec<serde_json::Value> = report
        .failures
        .iter()
        .map(|f| {
            serde_json::json!({
                "file": f.file,
                "error": f.error.to_string(),
            })
        })
        .collect();

    let sets: Vec<Vec<&str>> = report
        .groups
        .iter()
        .map(|group| group.iter().map(|clip| clip.name()).collect())
        .collect();

    let output = serde_json::json!({
        "valid": report.is_complete(),
        "lines": report.lines_total,
        "sets_loaded": report.groups.len(),
        "clips_loaded": report.clip_count(),
        "sets": sets,
        "failures": failures,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

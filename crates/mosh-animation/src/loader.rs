//! JSON animation loading, animation list files, and batch loading
//!
//! A batch is a list of lines; each line names one or more files that play
//! together. A file that fails to load is reported and skipped without
//! aborting the rest of the batch.

use crate::clip::{AnimationClipData, Gender, RawClip};
use crate::model::ModelRegistry;
use crate::settings::PlaybackSettings;
use mosh_core::{MoshError, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Parse a JSON animation into a source-space `RawClip`.
///
/// The body model is chosen by the length of the betas array; the model then
/// decides the remaining key names and the expected joint count.
///
/// ```json
/// {
///   "gender": "female",
///   "fps": 120,
///   "betas": [0.1, ...],
///   "trans": [[x, y, z], ...],
///   "poses": [[[x, y, z, w], ...], ...]
/// }
/// ```
pub fn parse_clip_json(content: &str, name: &str, registry: &ModelRegistry) -> Result<RawClip> {
    let mut json: Value = serde_json::from_str(content)
        .map_err(|e| MoshError::JsonParseError(format!("{}: {}", name, e)))?;

    let model = registry.match_json(&json).cloned().ok_or_else(|| {
        MoshError::ModelMismatch(format!(
            "{}: betas length matches none of {:?}",
            name,
            registry.models.iter().map(|m| &m.name).collect::<Vec<_>>()
        ))
    })?;
    let keys = &model.json_keys;

    let fields = json
        .as_object_mut()
        .ok_or_else(|| MoshError::JsonParseError(format!("{}: top level is not an object", name)))?;

    let gender = match take_field(fields, &keys.gender, name)? {
        Value::String(g) if g == keys.male => Gender::Male,
        Value::String(g) if g == keys.female => Gender::Female,
        other => {
            return Err(MoshError::InvalidEnumValue {
                value: other.to_string(),
                allowed: vec![keys.male.clone(), keys.female.clone()],
            })
        }
    };

    let fps = parse_fps(take_field(fields, &keys.fps, name)?, name)?;
    let betas: Vec<f32> = typed_field(fields, &keys.betas, name)?;
    let translations: Vec<[f32; 3]> = typed_field(fields, &keys.translations, name)?;
    let poses: Vec<Vec<[f32; 4]>> = typed_field(fields, &keys.poses, name)?;

    Ok(RawClip {
        name: name.to_string(),
        model_name: model.name.clone(),
        joint_count: model.joint_count,
        beta_count: model.beta_count,
        gender,
        fps,
        betas,
        translations,
        poses,
    })
}

fn take_field(fields: &mut Map<String, Value>, key: &str, name: &str) -> Result<Value> {
    match fields.remove(key) {
        None | Some(Value::Null) => Err(MoshError::MissingField(format!(
            "{}: no '{}' field",
            name, key
        ))),
        Some(value) => Ok(value),
    }
}

fn typed_field<T: DeserializeOwned>(
    fields: &mut Map<String, Value>,
    key: &str,
    name: &str,
) -> Result<T> {
    let value = take_field(fields, key, name)?;
    serde_json::from_value(value)
        .map_err(|e| MoshError::JsonParseError(format!("{}: field '{}': {}", name, key, e)))
}

/// Frame rates are integral, but exporters sometimes write them as floats.
fn parse_fps(value: Value, name: &str) -> Result<u32> {
    let fps = value
        .as_f64()
        .filter(|fps| fps.is_finite() && *fps >= 0.0 && *fps <= u32::MAX as f64)
        .ok_or_else(|| {
            MoshError::JsonParseError(format!("{}: fps is not a non-negative number: {}", name, value))
        })?;
    Ok(fps.round() as u32)
}

/// Load one animation file into a validated, render-space clip.
pub fn load_clip_from_file(
    path: &Path,
    registry: &ModelRegistry,
    settings: &PlaybackSettings,
) -> Result<Arc<AnimationClipData>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if extension != "json" {
        return Err(MoshError::UnsupportedFileType(format!(
            "Extension '{}' is unsupported: {}",
            extension,
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(MoshError::FileNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let raw = parse_clip_json(&content, name, registry)?;
    Ok(Arc::new(AnimationClipData::from_raw(raw, settings.fallback_fps)?))
}

/// Which files to load and how they group into simultaneously-played sets
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFileReference {
    folder: PathBuf,
    lines: Vec<Vec<String>>,
}

impl AnimationFileReference {
    /// Read a list file: one set per non-empty line, file names separated by spaces,
    /// resolved relative to `folder`.
    pub fn from_list_file(folder: &Path, list_file: &Path) -> Result<Self> {
        if !list_file.is_file() {
            return Err(MoshError::FileNotFound(format!(
                "Animation list file {}",
                list_file.display()
            )));
        }
        let content = fs::read_to_string(list_file)?;
        Ok(Self::from_list_str(folder, &content))
    }

    pub fn from_list_str(folder: &Path, content: &str) -> Self {
        let lines = content
            .lines()
            .map(|line| {
                line.split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|files| !files.is_empty())
            .collect();
        Self {
            folder: folder.to_path_buf(),
            lines,
        }
    }

    /// Every `.json` and `.h5` file under `folder`, recursively, one file per set,
    /// in path order.
    pub fn from_folder(folder: &Path) -> Result<Self> {
        if !folder.is_dir() {
            return Err(MoshError::FileNotFound(format!(
                "Animation folder {}",
                folder.display()
            )));
        }
        let mut files = Vec::new();
        scan_directory(folder, folder, &mut files)?;
        files.sort();
        Ok(Self {
            folder: folder.to_path_buf(),
            lines: files.into_iter().map(|f| vec![f]).collect(),
        })
    }

    /// A single file played on its own.
    pub fn single(file: &Path) -> Result<Self> {
        if !file.is_file() {
            return Err(MoshError::FileNotFound(file.display().to_string()));
        }
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MoshError::LoadError(format!("Bad file name {}", file.display())))?;
        Ok(Self {
            folder: file.parent().map(Path::to_path_buf).unwrap_or_default(),
            lines: vec![vec![name.to_string()]],
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn lines(&self) -> &[Vec<String>] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn scan_directory(root: &Path, dir: &Path, files: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            scan_directory(root, &path, files)?;
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("json") | Some("h5")
        ) {
            if let Ok(relative) = path.strip_prefix(root) {
                files.push(relative.to_string_lossy().into_owned());
            }
        }
    }
    Ok(())
}

/// A file that could not be loaded, and why
#[derive(Debug)]
pub struct LoadFailure {
    pub file: String,
    pub error: MoshError,
}

/// Outcome of loading a batch
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully loaded sets, in list order. Lines where nothing loaded are absent.
    pub groups: Vec<Vec<Arc<AnimationClipData>>>,
    pub failures: Vec<LoadFailure>,
    /// Number of lines in the reference
    pub lines_total: usize,
}

impl LoadReport {
    pub fn clip_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Load every file named by `reference`, skipping (and reporting) failures.
pub fn load_batch(
    reference: &AnimationFileReference,
    registry: &ModelRegistry,
    settings: &PlaybackSettings,
) -> LoadReport {
    let mut report = LoadReport {
        lines_total: reference.len(),
        ..Default::default()
    };

    tracing::info!(
        "Loading {} animation sets from {}",
        reference.len(),
        reference.folder().display()
    );

    for (index, line) in reference.lines().iter().enumerate() {
        let mut group = Vec::with_capacity(line.len());
        for file in line {
            let path = reference.folder().join(file);
            match load_clip_from_file(&path, registry, settings) {
                Ok(clip) => group.push(clip),
                Err(error) => {
                    tracing::error!(
                        file = %file,
                        folder = %reference.folder().display(),
                        "Failed to load animation: {}",
                        error
                    );
                    report.failures.push(LoadFailure {
                        file: file.clone(),
                        error,
                    });
                }
            }
        }

        if group.is_empty() {
            tracing::warn!(
                "Loaded {} of {} [WITH ERRORS]. Skipping line.",
                index + 1,
                reference.len()
            );
            continue;
        }

        tracing::info!(
            "Loaded {} of {} (model: {}), containing animations for {} characters",
            index + 1,
            reference.len(),
            group[0].model_name(),
            group.len()
        );
        report.groups.push(group);
    }

    tracing::info!(
        "Done loading all animations. Successfully loaded {} of {}.",
        report.groups.len(),
        report.lines_total
    );
    report
}

/// A batch load running on a background thread.
///
/// The report is handed over exactly once, through `try_take` or `wait`.
pub struct PendingLoad {
    handle: Option<JoinHandle<LoadReport>>,
}

impl PendingLoad {
    /// Whether the background load has finished (or already been taken).
    pub fn is_ready(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Take the report if loading has finished. Returns `None` while it is
    /// still running and after the report has been taken.
    pub fn try_take(&mut self) -> Option<Result<LoadReport>> {
        if !self.handle.as_ref()?.is_finished() {
            return None;
        }
        self.handle.take().map(join_report)
    }

    /// Block until loading finishes.
    pub fn wait(mut self) -> Result<LoadReport> {
        match self.handle.take() {
            Some(handle) => join_report(handle),
            None => Err(MoshError::LoadError("Load report already taken".into())),
        }
    }
}

fn join_report(handle: JoinHandle<LoadReport>) -> Result<LoadReport> {
    handle
        .join()
        .map_err(|_| MoshError::LoadError("Loader thread panicked".into()))
}

/// Run `load_batch` on a background thread.
pub fn spawn_batch_load(
    reference: AnimationFileReference,
    registry: ModelRegistry,
    settings: PlaybackSettings,
) -> Result<PendingLoad> {
    let handle = thread::Builder::new()
        .name("mosh-loader".into())
        .spawn(move || load_batch(&reference, &registry, &settings))?;
    Ok(PendingLoad {
        handle: Some(handle),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosh_core::{Quat, Vec3};
    use serde_json::json;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mosh_loader_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn test_registry() -> ModelRegistry {
        ModelRegistry::from_toml_str(
            r#"
[[models]]
name = "TINY"
joint_count = 2
beta_count = 3
"#,
        )
        .unwrap()
    }

    fn clip_json(fps: f64, frames: usize) -> Value {
        let trans: Vec<[f32; 3]> = (0..frames).map(|f| [f as f32, 0.0, 1.0]).collect();
        let poses: Vec<Vec<[f32; 4]>> = (0..frames)
            .map(|_| vec![[0.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 0.0]])
            .collect();
        json!({
            "gender": "female",
            "fps": fps,
            "betas": [0.5, -0.5, 0.25],
            "trans": trans,
            "poses": poses,
        })
    }

    fn write_clip(dir: &Path, name: &str, doc: &Value) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string(doc).unwrap()).unwrap();
        path
    }

    #[test]
    fn parse_valid_clip() {
        let raw = parse_clip_json(&clip_json(120.0, 3).to_string(), "walk.json", &test_registry())
            .unwrap();
        assert_eq!(raw.model_name, "TINY");
        assert_eq!(raw.gender, Gender::Female);
        assert_eq!(raw.fps, 120);
        assert_eq!(raw.translations.len(), 3);
        assert_eq!(raw.poses[2].len(), 2);
        assert_eq!(raw.betas, vec![0.5, -0.5, 0.25]);
    }

    #[test]
    fn parse_float_fps() {
        let raw = parse_clip_json(&clip_json(59.94, 2).to_string(), "a.json", &test_registry())
            .unwrap();
        assert_eq!(raw.fps, 60);
    }

    #[test]
    fn reject_unknown_model() {
        let mut doc = clip_json(30.0, 2);
        doc["betas"] = json!([0.0, 0.0]);
        let err = parse_clip_json(&doc.to_string(), "a.json", &test_registry()).unwrap_err();
        assert!(matches!(err, MoshError::ModelMismatch(_)));
    }

    #[test]
    fn reject_unexpected_gender() {
        let mut doc = clip_json(30.0, 2);
        doc["gender"] = json!("neutral");
        let err = parse_clip_json(&doc.to_string(), "a.json", &test_registry()).unwrap_err();
        assert!(matches!(err, MoshError::InvalidEnumValue { .. }));
    }

    #[test]
    fn reject_missing_fps() {
        let mut doc = clip_json(30.0, 2);
        doc.as_object_mut().unwrap().remove("fps");
        let err = parse_clip_json(&doc.to_string(), "a.json", &test_registry()).unwrap_err();
        assert!(matches!(err, MoshError::MissingField(_)));
    }

    #[test]
    fn reject_malformed_translation() {
        let mut doc = clip_json(30.0, 2);
        doc["trans"] = json!([[1.0, 2.0], [3.0, 4.0]]);
        let err = parse_clip_json(&doc.to_string(), "a.json", &test_registry()).unwrap_err();
        assert!(matches!(err, MoshError::JsonParseError(_)));
    }

    #[test]
    fn reject_invalid_json() {
        let err = parse_clip_json("{ not json", "a.json", &test_registry()).unwrap_err();
        assert!(matches!(err, MoshError::JsonParseError(_)));
    }

    #[test]
    fn load_file_converts_to_render_space() {
        let dir = temp_dir();
        let path = write_clip(&dir, "walk.json", &clip_json(30.0, 4));
        let clip = load_clip_from_file(&path, &test_registry(), &PlaybackSettings::default())
            .unwrap();
        assert_eq!(clip.name(), "walk.json");
        assert_eq!(clip.frame_count(), 4);
        assert_eq!(clip.frame_rate(), 30);
        assert_eq!(clip.translation(2), Vec3::new(-2.0, 1.0, -0.0));
        assert_eq!(clip.rotation(0, 1), Quat::new(-0.0, 1.0, 0.0, -0.0));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_zero_fps_uses_fallback() {
        let dir = temp_dir();
        let path = write_clip(&dir, "nofps.json", &clip_json(0.0, 2));
        let settings = PlaybackSettings {
            fallback_fps: Some(90),
            ..Default::default()
        };
        let clip = load_clip_from_file(&path, &test_registry(), &settings).unwrap();
        assert_eq!(clip.frame_rate(), 90);

        let strict = PlaybackSettings {
            fallback_fps: None,
            ..Default::default()
        };
        assert!(load_clip_from_file(&path, &test_registry(), &strict).is_err());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn reject_h5_and_missing_files() {
        let dir = temp_dir();
        let registry = test_registry();
        let settings = PlaybackSettings::default();

        let h5 = dir.join("clip.h5");
        fs::write(&h5, b"\x89HDF").unwrap();
        assert!(matches!(
            load_clip_from_file(&h5, &registry, &settings),
            Err(MoshError::UnsupportedFileType(_))
        ));
        assert!(matches!(
            load_clip_from_file(&dir.join("absent.json"), &registry, &settings),
            Err(MoshError::FileNotFound(_))
        ));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn list_file_groups_by_line() {
        let reference = AnimationFileReference::from_list_str(
            Path::new("anims"),
            "a.json b.json\n\n  c.json  \n",
        );
        assert_eq!(reference.len(), 2);
        assert_eq!(reference.lines()[0], vec!["a.json", "b.json"]);
        assert_eq!(reference.lines()[1], vec!["c.json"]);
    }

    #[test]
    fn folder_scan_finds_json_and_h5() {
        let dir = temp_dir();
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("b.json"), "{}").unwrap();
        fs::write(dir.join("nested").join("a.h5"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        let reference = AnimationFileReference::from_folder(&dir).unwrap();
        let files: Vec<&str> = reference.lines().iter().map(|l| l[0].as_str()).collect();
        assert_eq!(files.len(), 2);
        assert!(files.contains(&"b.json"));
        assert!(files.iter().any(|f| f.ends_with("a.h5")));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn single_file_reference() {
        let dir = temp_dir();
        let path = write_clip(&dir, "solo.json", &clip_json(30.0, 2));
        let reference = AnimationFileReference::single(&path).unwrap();
        assert_eq!(reference.folder(), dir.as_path());
        assert_eq!(reference.lines(), &[vec!["solo.json".to_string()]]);
        assert!(AnimationFileReference::single(&dir.join("nope.json")).is_err());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn batch_skips_bad_files_and_empty_lines() {
        let dir = temp_dir();
        write_clip(&dir, "good1.json", &clip_json(30.0, 3));
        write_clip(&dir, "good2.json", &clip_json(60.0, 5));
        let mut bad = clip_json(30.0, 3);
        bad["betas"] = json!([1.0]);
        write_clip(&dir, "bad.json", &bad);

        let reference = AnimationFileReference::from_list_str(
            &dir,
            "good1.json bad.json\nmissing.json\ngood2.json\n",
        );
        let report = load_batch(&reference, &test_registry(), &PlaybackSettings::default());

        assert_eq!(report.lines_total, 3);
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups[0].len(), 1);
        assert_eq!(report.groups[0][0].name(), "good1.json");
        assert_eq!(report.groups[1][0].name(), "good2.json");
        assert_eq!(report.clip_count(), 2);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].file, "bad.json");
        assert_eq!(report.failures[1].file, "missing.json");
        assert!(!report.is_complete());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn background_load_hands_off_once() {
        let dir = temp_dir();
        write_clip(&dir, "one.json", &clip_json(30.0, 3));
        let reference = AnimationFileReference::from_list_str(&dir, "one.json");

        let mut pending = spawn_batch_load(
            reference,
            test_registry(),
            PlaybackSettings::default(),
        )
        .unwrap();

        let report = loop {
            if let Some(result) = pending.try_take() {
                break result.unwrap();
            }
            std::thread::sleep(std::time::Duration::from_millis(1));
        };
        assert_eq!(report.clip_count(), 1);
        assert!(pending.is_ready());
        assert!(pending.try_take().is_none());
        assert!(pending.wait().is_err());
        fs::remove_dir_all(&dir).ok();
    }
}

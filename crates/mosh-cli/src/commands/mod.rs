//! CLI command implementations

pub mod inspect;
pub mod play;
pub mod validate;

use anyhow::{Context, Result};
use mosh_animation::loader::AnimationFileReference;
use mosh_animation::model::ModelRegistry;
use std::path::Path;

/// Built-in models unless a registry file is given.
pub(crate) fn load_registry(models: Option<&str>) -> Result<ModelRegistry> {
    match models {
        Some(path) => ModelRegistry::load_from_file(Path::new(path))
            .with_context(|| format!("Failed to load model registry {}", path)),
        None => Ok(ModelRegistry::default()),
    }
}

/// A file plays on its own; a folder plays its list file if given, otherwise
/// every animation found under it.
pub(crate) fn resolve_reference(path: &str, list: Option<&str>) -> Result<AnimationFileReference> {
    let path = Path::new(path);
    let reference = match list {
        Some(list) => AnimationFileReference::from_list_file(path, Path::new(list)),
        None if path.is_dir() => AnimationFileReference::from_folder(path),
        None => AnimationFileReference::single(path),
    };
    reference.with_context(|| format!("Failed to resolve animations at {}", path.display()))
}

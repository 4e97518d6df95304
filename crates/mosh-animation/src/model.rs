//! Body-model schemas and the registry used to match files to them

use mosh_core::{MoshError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Key names used by a model's JSON animation files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonKeys {
    pub gender: String,
    pub male: String,
    pub female: String,
    pub fps: String,
    pub translations: String,
    pub poses: String,
    pub betas: String,
}

impl Default for JsonKeys {
    fn default() -> Self {
        Self {
            gender: "gender".into(),
            male: "male".into(),
            female: "female".into(),
            fps: "fps".into(),
            translations: "trans".into(),
            poses: "poses".into(),
            betas: "betas".into(),
        }
    }
}

/// A body model: how many joints it poses and how many shape betas it takes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    pub joint_count: usize,
    pub beta_count: usize,
    #[serde(default)]
    pub json_keys: JsonKeys,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>, joint_count: usize, beta_count: usize) -> Self {
        Self {
            name: name.into(),
            joint_count,
            beta_count,
            json_keys: JsonKeys::default(),
        }
    }
}

/// Ordered set of known body models.
///
/// ```toml
/// [[models]]
/// name = "SMPL-H"
/// joint_count = 52
/// beta_count = 16
///
/// [models.json_keys]
/// translations = "trans"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRegistry {
    pub models: Vec<ModelDefinition>,
}

impl Default for ModelRegistry {
    /// SMPL-H (AMASS) and the base SMPL model.
    fn default() -> Self {
        Self {
            models: vec![
                ModelDefinition::new("SMPL-H", 52, 16),
                ModelDefinition::new("SMPL", 24, 10),
            ],
        }
    }
}

impl ModelRegistry {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MoshError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let registry: ModelRegistry = toml::from_str(content)?;
        if registry.models.is_empty() {
            return Err(MoshError::ConfigError(
                "Model registry defines no models".into(),
            ));
        }
        for model in &registry.models {
            if model.joint_count == 0 {
                return Err(MoshError::ConfigError(format!(
                    "Model '{}' has no joints",
                    model.name
                )));
            }
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Pick the first model whose betas key holds exactly `count` entries in `json`.
    ///
    /// Models may use different key names, so each model is checked against
    /// its own `json_keys.betas`.
    pub fn match_json(&self, json: &serde_json::Value) -> Option<&ModelDefinition> {
        self.models.iter().find(|model| {
            json.get(&model.json_keys.betas)
                .and_then(|betas| betas.as_array())
                .is_some_and(|betas| betas.len() == model.beta_count)
        })
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_registry_knows_smpl_h() {
        let registry = ModelRegistry::default();
        let smplh = registry.get("SMPL-H").unwrap();
        assert_eq!(smplh.joint_count, 52);
        assert_eq!(smplh.beta_count, 16);
        assert_eq!(smplh.json_keys.translations, "trans");
    }

    #[test]
    fn match_by_beta_count() {
        let registry = ModelRegistry::default();
        let smplh = json!({ "betas": vec![0.0; 16] });
        let smpl = json!({ "betas": vec![0.0; 10] });
        let unknown = json!({ "betas": vec![0.0; 11] });
        let missing = json!({ "gender": "male" });

        assert_eq!(registry.match_json(&smplh).unwrap().name, "SMPL-H");
        assert_eq!(registry.match_json(&smpl).unwrap().name, "SMPL");
        assert!(registry.match_json(&unknown).is_none());
        assert!(registry.match_json(&missing).is_none());
    }

    #[test]
    fn parse_registry_with_custom_keys() {
        let registry = ModelRegistry::from_toml_str(
            r#"
[[models]]
name = "SUP"
joint_count = 22
beta_count = 8

[models.json_keys]
translations = "root_trans"
betas = "shape"
"#,
        )
        .unwrap();
        let sup = registry.get("SUP").unwrap();
        assert_eq!(sup.json_keys.translations, "root_trans");
        assert_eq!(sup.json_keys.poses, "poses");

        let doc = json!({ "shape": vec![0.5; 8] });
        assert_eq!(registry.match_json(&doc).unwrap().name, "SUP");
    }

    #[test]
    fn reject_empty_registry() {
        assert!(ModelRegistry::from_toml_str("models = []").is_err());
    }

    #[test]
    fn reject_model_without_joints() {
        let err = ModelRegistry::from_toml_str(
            r#"
[[models]]
name = "broken"
joint_count = 0
beta_count = 4
"#,
        );
        assert!(err.is_err());
    }
}

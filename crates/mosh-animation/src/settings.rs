//! Playback configuration loaded from TOML

use mosh_core::{MoshError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings applied to every animation started by a player.
///
/// ```toml
/// play_backwards = false
/// fallback_fps = 60
/// looping = true
/// speed = 0.5
/// playback_immediately = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Play clips from their current position towards frame 0
    pub play_backwards: bool,
    /// Frame rate used when a file records none. `None` makes such files a load error.
    pub fallback_fps: Option<u32>,
    /// Restart instead of finishing at the end of a clip
    pub looping: bool,
    /// Playback speed multiplier, must be positive
    pub speed: f64,
    /// Start the first animation set as soon as loading completes
    pub playback_immediately: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            play_backwards: false,
            fallback_fps: Some(60),
            looping: false,
            speed: 1.0,
            playback_immediately: true,
        }
    }
}

impl PlaybackSettings {
    /// Load settings from a TOML file. Missing keys take their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MoshError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content).map_err(|e| {
            MoshError::ConfigError(format!("Invalid settings in {}: {}", path.display(), e))
        })
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: PlaybackSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(MoshError::ConfigError(format!(
                "speed must be positive, got {}",
                self.speed
            )));
        }
        if self.fallback_fps == Some(0) {
            return Err(MoshError::ConfigError(
                "fallback_fps must be positive when set".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let settings = PlaybackSettings::from_toml_str("").unwrap();
        assert_eq!(settings, PlaybackSettings::default());
        assert_eq!(settings.fallback_fps, Some(60));
        assert_eq!(settings.speed, 1.0);
        assert!(settings.playback_immediately);
    }

    #[test]
    fn parse_overrides() {
        let settings = PlaybackSettings::from_toml_str(
            r#"
play_backwards = true
fallback_fps = 120
looping = true
speed = 0.25
"#,
        )
        .unwrap();
        assert!(settings.play_backwards);
        assert!(settings.looping);
        assert_eq!(settings.fallback_fps, Some(120));
        assert_eq!(settings.speed, 0.25);
    }

    #[test]
    fn reject_non_positive_speed() {
        assert!(PlaybackSettings::from_toml_str("speed = 0.0").is_err());
        assert!(PlaybackSettings::from_toml_str("speed = -1.0").is_err());
    }

    #[test]
    fn reject_zero_fallback() {
        assert!(PlaybackSettings::from_toml_str("fallback_fps = 0").is_err());
    }

    #[test]
    fn reject_malformed_toml() {
        let err = PlaybackSettings::from_toml_str("speed = [").unwrap_err();
        assert!(matches!(err, MoshError::TomlParseError(_)));
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = PlaybackSettings::load_from_file(Path::new("/definitely/not/here.toml"))
            .unwrap_err();
        assert!(matches!(err, MoshError::ConfigError(_)));
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::services::generator::GenerationDelay;
use crate::services::speech::SpeechOptions;

pub const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_output")]
    pub output_folder: String,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub form: FormConfig,

    #[serde(default)]
    pub speech: SpeechConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_folder: default_output(),
            generation: GenerationConfig::default(),
            form: FormConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GenerationConfig {
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl GenerationConfig {
    pub fn delay(&self) -> GenerationDelay {
        if self.max_delay_ms == 0 {
            GenerationDelay::None
        } else if self.max_delay_ms <= self.min_delay_ms {
            GenerationDelay::Fixed(Duration::from_millis(self.min_delay_ms))
        } else {
            GenerationDelay::Uniform {
                min: Duration::from_millis(self.min_delay_ms),
                max: Duration::from_millis(self.max_delay_ms),
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FormConfig {
    #[serde(default = "default_resubmit_timeout_ms")]
    pub resubmit_timeout_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            resubmit_timeout_ms: default_resubmit_timeout_ms(),
        }
    }
}

impl FormConfig {
    pub fn resubmit_timeout(&self) -> Duration {
        Duration::from_millis(self.resubmit_timeout_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpeechConfig {
    #[serde(default = "default_unit")]
    pub rate: f32,
    #[serde(default = "default_unit")]
    pub pitch: f32,
    #[serde(default = "default_unit")]
    pub volume: f32,
    /// Preferred voice name; falls back to the automatic preference when absent.
    pub voice: Option<String>,
    /// Pacing of the terminal narrator at rate 1.0.
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: default_unit(),
            pitch: default_unit(),
            volume: default_unit(),
            voice: None,
            words_per_minute: default_words_per_minute(),
        }
    }
}

impl SpeechConfig {
    pub fn options(&self) -> SpeechOptions {
        SpeechOptions {
            rate: self.rate,
            pitch: self.pitch,
            volume: self.volume,
            voice: None,
        }
    }
}

fn default_output() -> String {
    "output".to_string()
}
fn default_min_delay_ms() -> u64 {
    2000
}
fn default_max_delay_ms() -> u64 {
    4000
}
fn default_resubmit_timeout_ms() -> u64 {
    4000
}
fn default_unit() -> f32 {
    1.0
}
fn default_words_per_minute() -> u32 {
    160
}

impl Config {
    /// Loads `config.yml` from the working directory, or defaults when it does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml_ng::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(CONFIG_FILE)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_folder)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let config = Config::load_from(temp_dir.path().join("config.yml"))?;
        assert_eq!(config, Config::default());
        assert_eq!(
            config.generation.delay(),
            GenerationDelay::Uniform {
                min: Duration::from_millis(2000),
                max: Duration::from_millis(4000),
            }
        );
        assert_eq!(config.form.resubmit_timeout(), Duration::from_millis(4000));
        Ok(())
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("config.yml");
        std::fs::write(
            &path,
            "output_folder: scripts\nspeech:\n  rate: 1.5\n  voice: Google US English\n",
        )?;

        let config = Config::load_from(&path)?;
        assert_eq!(config.output_folder, "scripts");
        assert_eq!(config.speech.rate, 1.5);
        assert_eq!(config.speech.pitch, 1.0);
        assert_eq!(config.speech.voice.as_deref(), Some("Google US English"));
        assert_eq!(config.generation, GenerationConfig::default());
        Ok(())
    }

    #[test]
    fn test_save_and_reload() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("config.yml");

        let mut config = Config::default();
        config.generation.max_delay_ms = 0;
        config.speech.words_per_minute = 200;
        config.save_to(&path)?;

        let loaded = Config::load_from(&path)?;
        assert_eq!(loaded, config);
        assert_eq!(loaded.generation.delay(), GenerationDelay::None);
        Ok(())
    }

    #[test]
    fn test_degenerate_range_is_fixed_delay() {
        let cfg = GenerationConfig {
            min_delay_ms: 300,
            max_delay_ms: 300,
        };
        assert_eq!(
            cfg.delay(),
            GenerationDelay::Fixed(Duration::from_millis(300))
        );
    }

    #[test]
    fn test_invalid_yaml_is_an_error() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("config.yml");
        std::fs::write(&path, "generation: [1, 2")?;
        assert!(Config::load_from(&path).is_err());
        Ok(())
    }
}

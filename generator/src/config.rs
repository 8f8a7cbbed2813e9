use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    hue::{default_hues, IdAllocator},
    state::Settings,
};

/// Defaults and timings of a [`crate::PaletteGenerator`].
///
/// Every field is optional when deserializing, missing fields take their default value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    pub steps: u32,
    pub min_saturation: f64,
    pub max_saturation: f64,
    pub min_lightness: f64,
    pub max_lightness: f64,
    /// Delay before the location hash follows a settled change.
    pub url_debounce_ms: u64,
    /// Frame callbacks taking longer than this are reported.
    pub frame_budget_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            steps: 10,
            min_saturation: 0.8,
            max_saturation: 1.0,
            min_lightness: 0.08,
            max_lightness: 0.954,
            url_debounce_ms: 250,
            frame_budget_ms: 16,
        }
    }
}

impl GeneratorConfig {
    /// Read a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn url_debounce(&self) -> Duration {
        Duration::from_millis(self.url_debounce_ms)
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_millis(self.frame_budget_ms)
    }

    /// The settings a fresh or reset generator starts with: the twelve default hues.
    pub fn default_settings(&self, ids: &mut dyn IdAllocator) -> Settings {
        Settings {
            hues: default_hues(ids),
            steps: self.steps.max(1),
            min_saturation: self.min_saturation,
            max_saturation: self.max_saturation,
            min_lightness: self.min_lightness,
            max_lightness: self.max_lightness,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hue::SequentialIds;

    #[test]
    fn partial_config() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{ "steps": 6, "url-debounce-ms": 100 }"#).unwrap();
        assert_eq!(config.steps, 6);
        assert_eq!(config.url_debounce(), Duration::from_millis(100));
        assert_eq!(config.max_lightness, 0.954);
    }

    #[test]
    fn default_settings() {
        let settings = GeneratorConfig::default().default_settings(&mut SequentialIds::new());
        assert_eq!(settings.hues.len(), 12);
        assert_eq!(settings.steps, 10);
        assert_eq!(settings.hues[0].name.as_deref(), Some("rose"));
        assert_eq!(settings.hues[11].value, 330.0);
    }
}

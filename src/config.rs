use std::path::Path;

/// Colors of the shared highlight material.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HighlightColors {
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub emissive: [f32; 3],
    pub ambient: [f32; 3],
}

impl Default for HighlightColors {
    fn default() -> Self {
        Self {
            diffuse: [1.0, 0.0, 1.0],
            specular: [0.5, 0.6, 0.87],
            emissive: [1.0, 1.0, 1.0],
            ambient: [0.23, 0.98, 0.53],
        }
    }
}

/// Initial orbit camera placement (angles in radians).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            alpha: -std::f32::consts::FRAC_PI_2,
            beta: 1.0,
            radius: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window_title: String,
    pub window_size: [u32; 2],
    /// Uniform scale applied to every mesh of an appended asset.
    pub asset_scale: f32,
    pub camera: CameraConfig,
    pub light_intensity: f32,
    pub clear_color: [f32; 3],
    pub highlight: HighlightColors,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_title: "meshview".to_string(),
            window_size: [1280, 720],
            asset_scale: 4.0,
            camera: CameraConfig::default(),
            light_intensity: 0.8,
            clear_color: [0.2, 0.2, 0.3],
            highlight: HighlightColors::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl ViewerConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: ViewerConfig = serde_json::from_str(&json)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Falls back to defaults when the file is missing or malformed.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load_from_file(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("Failed to load config {}: {}", path.display(), err);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_viewer() {
        let config = ViewerConfig::default();
        assert_eq!(config.asset_scale, 4.0);
        assert_eq!(config.light_intensity, 0.8);
        assert_eq!(config.camera.beta, 1.0);
        assert_eq!(config.camera.radius, 10.0);
        assert_eq!(config.highlight.diffuse, [1.0, 0.0, 1.0]);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{ "asset_scale": 2.5, "camera": { "radius": 3.0 } }"#)
                .unwrap();
        assert_eq!(config.asset_scale, 2.5);
        assert_eq!(config.camera.radius, 3.0);
        assert_eq!(config.camera.beta, 1.0);
        assert_eq!(config.window_size, [1280, 720]);
    }

    #[test]
    fn save_load_via_file() {
        let mut path = std::env::temp_dir();
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!(
            "meshview_config_{}_{}.json",
            std::process::id(),
            nonce
        ));

        let mut config = ViewerConfig::default();
        config.window_title = "Outline test".to_string();
        config.highlight.emissive = [0.0, 0.0, 0.0];
        config.save_to_file(&path).unwrap();

        let loaded = ViewerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("meshview_config_does_not_exist.json");
        let config = ViewerConfig::load_or_default(Some(&path));
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(ViewerConfig::load_or_default(None), ViewerConfig::default());
    }
}

use crate::error::{AncoraError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_path")]
    pub path: PathBuf,
    /// How long a loaded credential file is trusted before re-reading it.
    #[serde(default = "default_refresh_seconds")]
    pub refresh_seconds: u64,
}

fn default_registry_path() -> PathBuf {
    PathBuf::from(paths::REGISTRY_FILE)
}

fn default_refresh_seconds() -> u64 {
    300
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: default_registry_path(),
            refresh_seconds: default_refresh_seconds(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConcessionPolicy
// ---------------------------------------------------------------------------

/// Recommended number of selected concessions. Falling outside the band
/// only produces an advisory, never a validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcessionPolicy {
    #[serde(default = "default_recommended_min")]
    pub recommended_min: usize,
    #[serde(default = "default_recommended_max")]
    pub recommended_max: usize,
}

fn default_recommended_min() -> usize {
    1
}

fn default_recommended_max() -> usize {
    3
}

impl Default for ConcessionPolicy {
    fn default() -> Self {
        Self {
            recommended_min: default_recommended_min(),
            recommended_max: default_recommended_max(),
        }
    }
}

// ---------------------------------------------------------------------------
// RenderConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    /// Height of the working canvas before it is cropped to the content.
    #[serde(default = "default_max_canvas_height")]
    pub max_canvas_height: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Font files tried in order; the built-in bitmap face is used when none load.
    #[serde(default = "default_font_paths")]
    pub font_paths: Vec<PathBuf>,
}

fn default_canvas_width() -> u32 {
    1080
}

fn default_max_canvas_height() -> u32 {
    4000
}

fn default_jpeg_quality() -> u8 {
    92
}

fn default_font_paths() -> Vec<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
        "C:\\Windows\\Fonts\\arialbd.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            max_canvas_height: default_max_canvas_height(),
            jpeg_quality: default_jpeg_quality(),
            font_paths: default_font_paths(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub concessions: ConcessionPolicy,
    #[serde(default)]
    pub render: RenderConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            registry: RegistryConfig::default(),
            concessions: ConcessionPolicy::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Narrowest canvas the summary layout still fits on.
const MIN_CANVAS_WIDTH: u32 = 480;

/// Largest working canvas the compositor will pre-allocate.
pub const MAX_WORKING_CANVAS_HEIGHT: u32 = 20_000;

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(AncoraError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(AncoraError::ConfigNotFound(path)) => {
                tracing::debug!(path = %path, "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Credential file location, relative paths taken from `root`.
    pub fn registry_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.registry.path)
    }

    pub fn refresh_interval(&self) -> chrono::Duration {
        let secs = self.registry.refresh_seconds.min(u64::from(u32::MAX));
        chrono::Duration::seconds(secs as i64)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let policy = &self.concessions;
        if policy.recommended_min > policy.recommended_max {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "concessions.recommended_min ({}) is greater than recommended_max ({})",
                    policy.recommended_min, policy.recommended_max
                ),
            });
        }

        if !(1..=100).contains(&self.render.jpeg_quality) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "render.jpeg_quality={} is outside 1..=100 and will be clamped",
                    self.render.jpeg_quality
                ),
            });
        }

        if self.render.canvas_width < MIN_CANVAS_WIDTH {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "render.canvas_width={} is narrower than {MIN_CANVAS_WIDTH}",
                    self.render.canvas_width
                ),
            });
        }

        if self.render.max_canvas_height > MAX_WORKING_CANVAS_HEIGHT {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "render.max_canvas_height={} is above {MAX_WORKING_CANVAS_HEIGHT} and will be capped",
                    self.render.max_canvas_height
                ),
            });
        }

        if self.registry.refresh_seconds == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "registry.refresh_seconds=0 re-reads the credential file on every sign-in"
                    .to_string(),
            });
        }

        if self.render.font_paths.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "render.font_paths is empty, the bitmap fallback font will be used"
                    .to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.registry.refresh_seconds, 300);
        assert_eq!(parsed.concessions, ConcessionPolicy::default());
        assert_eq!(parsed.render.canvas_width, 1080);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "concessions:\n  recommended_min: 3\n  recommended_max: 5\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.concessions.recommended_min, 3);
        assert_eq!(cfg.concessions.recommended_max, 5);
        assert_eq!(cfg.registry.path, PathBuf::from("usuarios.txt"));
        assert_eq!(cfg.render.jpeg_quality, 92);
        assert!(!cfg.render.font_paths.is_empty());
    }

    #[test]
    fn load_missing_config() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(AncoraError::ConfigNotFound(_))
        ));
        let cfg = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(cfg.version, 1);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.registry.refresh_seconds = 60;
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.registry.refresh_seconds, 60);
        assert_eq!(loaded.refresh_interval(), chrono::Duration::seconds(60));
    }

    #[test]
    fn registry_path_resolves_against_root() {
        let cfg = Config::default();
        let root = Path::new("/srv/ancora");
        assert_eq!(
            cfg.registry_path(root),
            PathBuf::from("/srv/ancora/usuarios.txt")
        );
    }

    #[test]
    fn default_config_has_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_inverted_band_and_bad_render_settings() {
        let mut cfg = Config::default();
        cfg.concessions.recommended_min = 5;
        cfg.concessions.recommended_max = 3;
        cfg.render.jpeg_quality = 0;
        cfg.render.canvas_width = 320;
        cfg.registry.refresh_seconds = 0;

        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 4);
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("recommended_min")));
        assert!(warnings.iter().any(|w| w.message.contains("jpeg_quality")));
        assert!(warnings.iter().any(|w| w.message.contains("canvas_width")));
        assert!(warnings.iter().any(|w| w.message.contains("refresh_seconds")));
    }

    #[test]
    fn validate_flags_oversized_working_canvas() {
        let mut cfg = Config::default();
        cfg.render.max_canvas_height = 4_000_000;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
        assert!(warnings[0].message.contains("max_canvas_height"));
    }
}

//! Configuration vault – reads/writes `~/.veilmotion/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use veil_pipeline::{MechanismKind, MechanismSettings};
use veil_types::ApplicationContext;

/// Persisted user configuration stored in `~/.veilmotion/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Application context the session runs under; scales the effective
    /// privacy strength.
    #[serde(default = "default_context")]
    pub context: ApplicationContext,

    /// Privacy strength slider, 0–100.
    #[serde(default = "default_strength")]
    pub strength_percent: f32,

    /// Mechanism for the eye/head category; `None` degrades to passthrough.
    #[serde(default = "default_mechanism")]
    pub eye_mechanism: Option<MechanismKind>,

    /// Mechanism for the hand category; `None` degrades to passthrough.
    #[serde(default = "default_mechanism")]
    pub hand_mechanism: Option<MechanismKind>,

    /// Maximum privatized displacement from the true position (meters).
    #[serde(default = "default_max_displacement")]
    pub max_displacement: f32,

    /// Forward projection distance for gaze privatization (meters).
    #[serde(default = "default_gaze_distance")]
    pub gaze_project_distance: f32,

    /// Session frame rate (ticks per second).
    #[serde(default = "default_frame_hz")]
    pub frame_hz: f32,

    /// Stop after this many frames; absent runs until Ctrl-C.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_budget: Option<u64>,

    /// Flat ground plane height (meters); absent disables ground correction.
    #[serde(default = "default_ground_height")]
    pub ground_height: Option<f32>,

    /// Optional NDJSON capture path for offline analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_path: Option<PathBuf>,

    /// Mechanism tuning: Gaussian scales, quantization step, jitter scale.
    /// Kept last so the TOML table serializes after the scalar fields.
    #[serde(default)]
    pub mechanism_settings: MechanismSettings,
}

fn default_context() -> ApplicationContext {
    ApplicationContext::Casual
}
fn default_strength() -> f32 {
    50.0
}
fn default_mechanism() -> Option<MechanismKind> {
    Some(MechanismKind::Gaussian)
}
fn default_max_displacement() -> f32 {
    0.1
}
fn default_gaze_distance() -> f32 {
    1.0
}
fn default_frame_hz() -> f32 {
    72.0
}
fn default_ground_height() -> Option<f32> {
    Some(0.0)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            context: default_context(),
            strength_percent: default_strength(),
            eye_mechanism: default_mechanism(),
            hand_mechanism: default_mechanism(),
            max_displacement: default_max_displacement(),
            gaze_project_distance: default_gaze_distance(),
            frame_hz: default_frame_hz(),
            frame_budget: None,
            mechanism_settings: MechanismSettings::default(),
            ground_height: default_ground_height(),
            record_path: None,
        }
    }
}

/// Return the path to `~/.veilmotion/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".veilmotion").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `VEIL_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `VEIL_CONTEXT` | `context` (`casual` / `competitive`) |
/// | `VEIL_STRENGTH` | `strength_percent` |
/// | `VEIL_FRAME_HZ` | `frame_hz` |
/// | `VEIL_RECORD_PATH` | `record_path` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("VEIL_CONTEXT") {
        match v.to_lowercase().as_str() {
            "casual" => cfg.context = ApplicationContext::Casual,
            "competitive" => cfg.context = ApplicationContext::Competitive,
            _ => {}
        }
    }
    if let Ok(v) = std::env::var("VEIL_STRENGTH")
        && let Ok(strength) = v.parse::<f32>()
    {
        cfg.strength_percent = strength;
    }
    if let Ok(v) = std::env::var("VEIL_FRAME_HZ")
        && let Ok(hz) = v.parse::<f32>()
    {
        cfg.frame_hz = hz;
    }
    if let Ok(v) = std::env::var("VEIL_RECORD_PATH") {
        cfg.record_path = Some(PathBuf::from(v));
    }
}

/// Save the config to disk, creating `~/.veilmotion/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        // Restrict the config directory to the owner only (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    // Write the file with owner-only read/write (rw-------) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.context, ApplicationContext::Casual);
        assert_eq!(loaded.strength_percent, 50.0);
        assert_eq!(loaded.eye_mechanism, Some(MechanismKind::Gaussian));
        assert_eq!(loaded.max_displacement, 0.1);
    }

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let file_meta = std::fs::metadata(&path).expect("file metadata");
        let file_mode = file_meta.permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600, "config file must have 0o600 permissions");

        let dir_meta = std::fs::metadata(path.parent().unwrap()).expect("dir metadata");
        let dir_mode = dir_meta.permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700, "config directory must have 0o700 permissions");
    }

    #[test]
    fn config_path_points_to_veilmotion_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".veilmotion"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "strength_percent = 80.0\ncontext = \"competitive\"\n").unwrap();

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.strength_percent, 80.0);
        assert_eq!(loaded.context, ApplicationContext::Competitive);
        assert_eq!(loaded.frame_hz, 72.0, "missing fields take defaults");
    }

    // Env vars are process-global, so every override case lives in one test
    // to keep the parallel test runner away from them.
    #[test]
    fn apply_env_overrides_covers_all_variables() {
        // SAFETY: the only test touching VEIL_* env vars; no data races.
        unsafe {
            std::env::set_var("VEIL_STRENGTH", "95.5");
            std::env::set_var("VEIL_CONTEXT", "competitive");
            std::env::set_var("VEIL_RECORD_PATH", "/tmp/capture.jsonl");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.strength_percent, 95.5);
        assert_eq!(cfg.context, ApplicationContext::Competitive);
        assert_eq!(cfg.record_path, Some(PathBuf::from("/tmp/capture.jsonl")));

        // Unparseable values leave the current settings alone.
        unsafe {
            std::env::set_var("VEIL_FRAME_HZ", "not-a-rate");
            std::env::set_var("VEIL_CONTEXT", "ranked");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.frame_hz, 72.0);
        assert_eq!(cfg.context, ApplicationContext::Casual);

        unsafe {
            std::env::remove_var("VEIL_STRENGTH");
            std::env::remove_var("VEIL_CONTEXT");
            std::env::remove_var("VEIL_RECORD_PATH");
            std::env::remove_var("VEIL_FRAME_HZ");
        }
    }
}

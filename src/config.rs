use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/usm/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsmConfig {
    /// Process-wide switch for accepting uploads. When false, artifact
    /// construction and intake refuse every transfer.
    pub uploads_enabled: bool,
    /// Staging directory override. Defaults to `staging/` under the XDG
    /// state dir when unset.
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,
    /// Optional cap on staged bytes per transfer (None = no cap).
    #[serde(default)]
    pub max_upload_bytes: Option<u64>,
}

impl Default for UsmConfig {
    fn default() -> Self {
        Self {
            uploads_enabled: true,
            staging_dir: None,
            max_upload_bytes: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("usm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<UsmConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = UsmConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: UsmConfig = toml::from_str(&data)?;
    Ok(cfg)
}

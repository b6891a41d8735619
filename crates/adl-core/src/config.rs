use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// HTTP transport limits (optional `[transport]` section in config.toml).
///
/// Every limit defaults to 0, meaning curl's own default: no overall deadline
/// and no low-speed abort. Set them to opt in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Connect timeout in seconds (0 = curl default).
    #[serde(default)]
    pub connect_timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/s for
    /// `low_speed_time_secs` (0 = never).
    #[serde(default)]
    pub low_speed_limit_bytes: u32,
    #[serde(default)]
    pub low_speed_time_secs: u64,
    /// Hard ceiling for the whole transfer in seconds (0 = none).
    #[serde(default)]
    pub timeout_secs: u64,
    /// Optional User-Agent header; curl's default is used when unset.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn low_speed_time(&self) -> Duration {
        Duration::from_secs(self.low_speed_time_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Clipboard trigger settings (optional `[clipboard]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Program and arguments that print the clipboard contents to stdout.
    pub command: Vec<String>,
    /// Polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            command: vec!["wl-paste".to_string(), "--no-newline".to_string()],
            poll_interval_ms: 500,
        }
    }
}

/// Format of the attribution artifact written next to the extracted files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributionFormat {
    /// `Url:` / `Creator:` / `License:` / `Assets:` lines.
    #[default]
    Text,
    Json,
}

/// Global configuration loaded from `~/.config/adl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdlConfig {
    /// Directory under which each payload gets its own folder.
    pub destination_root: PathBuf,
    /// Where scratch downloads and staging directories go (None = system temp dir).
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
    /// Maximum depth of archives nested inside archives.
    pub max_nesting_depth: usize,
    /// Attribution artifact format: "text" (default) or "json".
    #[serde(default)]
    pub attribution_format: Option<AttributionFormat>,
    /// Optional transport limits; if missing, built-in defaults are used.
    #[serde(default)]
    pub transport: Option<TransportConfig>,
    /// Optional clipboard trigger settings.
    #[serde(default)]
    pub clipboard: Option<ClipboardConfig>,
}

impl Default for AdlConfig {
    fn default() -> Self {
        Self {
            destination_root: PathBuf::from("Assets/Models/Placeholders"),
            scratch_dir: None,
            max_nesting_depth: crate::expand::DEFAULT_MAX_DEPTH,
            attribution_format: None,
            transport: None,
            clipboard: None,
        }
    }
}

impl AdlConfig {
    pub fn transport(&self) -> TransportConfig {
        self.transport.clone().unwrap_or_default()
    }

    pub fn clipboard(&self) -> ClipboardConfig {
        self.clipboard.clone().unwrap_or_default()
    }

    pub fn attribution_format(&self) -> AttributionFormat {
        self.attribution_format.unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("adl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: AdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}

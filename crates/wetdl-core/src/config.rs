use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Common Crawl's public data endpoint.
pub const DEFAULT_BASE_URL: &str = "https://data.commoncrawl.org/";

/// 750 GiB.
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 750 * 1024 * 1024 * 1024;

/// What happens to a reservation when its transfer fails after the budget gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleasePolicy {
    /// Failed transfers hand their reserved bytes back to the budget.
    #[default]
    Release,
    /// Reserved bytes stay counted even if nothing was written.
    Retain,
}

/// Settings for the `unzip` stage (optional `[unzip]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnzipConfig {
    /// Root scanned recursively for `.gz` files. `None` = the fetch output directory.
    pub input_dir: Option<PathBuf>,
    /// Where decompressed files are written.
    pub output_dir: PathBuf,
    /// Maximum number of files decompressed at once.
    pub max_concurrent: usize,
}

impl Default for UnzipConfig {
    fn default() -> Self {
        Self {
            input_dir: None,
            output_dir: PathBuf::from("unzipped_wet"),
            max_concurrent: 4,
        }
    }
}

/// Global configuration loaded from `~/.config/wetdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WetdlConfig {
    /// Base URL every manifest key is resolved against.
    pub base_url: String,
    /// Line-delimited list of object keys.
    pub manifest_path: PathBuf,
    /// Directory the downloaded objects are written to (flat, by final key segment).
    pub output_dir: PathBuf,
    /// Hard cap on cumulative bytes downloaded by one run.
    pub max_total_bytes: u64,
    /// Seconds between progress reports.
    pub progress_interval_secs: u64,
    /// Pause between launching two consecutive transfers, in milliseconds.
    pub launch_delay_ms: u64,
    /// Maximum transfers in flight at once (0 = no ceiling, launch delay only).
    pub max_concurrent_transfers: usize,
    /// Budget accounting for transfers that fail after reserving.
    pub release_policy: ReleasePolicy,
    /// TCP connect timeout per transfer, in seconds.
    pub connect_timeout_secs: u64,
    pub unzip: UnzipConfig,
}

impl Default for WetdlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            manifest_path: PathBuf::from("wet.paths"),
            output_dir: PathBuf::from("Wet-Files"),
            max_total_bytes: DEFAULT_MAX_TOTAL_BYTES,
            progress_interval_secs: 10,
            launch_delay_ms: 200,
            max_concurrent_transfers: 32,
            release_policy: ReleasePolicy::Release,
            connect_timeout_secs: 30,
            unzip: UnzipConfig::default(),
        }
    }
}

impl WetdlConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs)
    }

    pub fn launch_delay(&self) -> Duration {
        Duration::from_millis(self.launch_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Input root of the unzip stage: explicit `[unzip] input_dir`, else the fetch output.
    pub fn unzip_input_dir(&self) -> &Path {
        self.unzip.input_dir.as_deref().unwrap_or(&self.output_dir)
    }

    /// Parsed base URL with a trailing slash so keys join under it instead of replacing
    /// its last segment.
    pub fn base_url(&self) -> Result<url::Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        url::Url::parse(&raw).with_context(|| format!("invalid base_url: {}", self.base_url))
    }

    /// Reject fetch settings that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        if self.max_total_bytes == 0 {
            anyhow::bail!("max_total_bytes must be greater than 0");
        }
        if self.progress_interval_secs == 0 {
            anyhow::bail!("progress_interval_secs must be greater than 0");
        }
        Ok(())
    }

    /// Checks only the `[unzip]` settings; fetch-only fields are ignored.
    pub fn validate_unzip(&self) -> Result<()> {
        if self.unzip.max_concurrent == 0 {
            anyhow::bail!("unzip.max_concurrent must be greater than 0");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("wetdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<WetdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = WetdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file; missing keys take their defaults.
pub fn load_from_path(path: &Path) -> Result<WetdlConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let cfg: WetdlConfig = toml::from_str(&data)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;
    Ok(cfg)
}

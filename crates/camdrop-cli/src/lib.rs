use anyhow::Context;
use camdrop_core::{UploadCredentials, WidgetConfig};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "CAMDROP_";

/// Host configuration read from `CAMDROP_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub preset_name: String,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub max_file_size_mb: Option<usize>,
}

impl CliConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> anyhow::Result<Self> {
        envy::prefixed(ENV_PREFIX).from_iter(vars).context(
            "Missing upload configuration. Set CAMDROP_CLOUD_NAME, CAMDROP_API_KEY and CAMDROP_PRESET_NAME",
        )
    }

    pub fn widget_config(&self) -> anyhow::Result<WidgetConfig> {
        let mut config = WidgetConfig::new(UploadCredentials::new(
            &self.cloud_name,
            &self.api_key,
            &self.preset_name,
        ));
        if let Some(url) = &self.api_base_url {
            config = config.with_api_base_url(url.as_str());
        }
        if let Some(mb) = self.max_file_size_mb {
            config.max_file_size_bytes = mb.checked_mul(1024 * 1024).with_context(|| {
                format!("CAMDROP_MAX_FILE_SIZE_MB is too large: {}", mb)
            })?;
        }
        config.validate().context("Invalid upload configuration")?;
        Ok(config)
    }
}

/// Configuration summary safe to print.
#[derive(Debug, Serialize)]
pub struct ConfigSummary {
    pub cloud_name: String,
    pub api_key: String,
    pub preset_name: String,
    pub api_base_url: String,
    pub max_file_size_bytes: usize,
}

impl From<&WidgetConfig> for ConfigSummary {
    fn from(config: &WidgetConfig) -> Self {
        Self {
            cloud_name: config.credentials.cloud_name.clone(),
            api_key: mask_secret(&config.credentials.api_key),
            preset_name: config.credentials.preset_name.clone(),
            api_base_url: config.api_base_url.clone(),
            max_file_size_bytes: config.max_file_size_bytes,
        }
    }
}

/// Keep the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

//! Configuration for the sync core.
//!
//! The core consumes configuration, it does not own persistence for it; the
//! environment is the single source here, with typed defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use habitica::ClientConfig;

use crate::render::RenderSettings;

/// Sync configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Account identifier (`HABITICA_USER_ID`)
    pub user_id: Option<String>,
    /// Secret key (`HABITICA_API_KEY`)
    pub api_key: Option<String>,
    /// API host (`HABITICA_BASE_URL`)
    pub base_url: String,
    /// Per-request timeout in seconds (`HABITICA_TIMEOUT_SECS`)
    pub timeout_secs: u64,
    /// Margin added past the reported quota reset, in milliseconds
    /// (`HABITICA_RATE_BUFFER_MS`)
    pub rate_limit_buffer_ms: u64,
    /// Folder the notes are written under (`SYNC_FOLDER`)
    pub folder: PathBuf,
    /// Tag token added to every rendered line (`SYNC_GLOBAL_TAG`)
    pub global_tag: Option<String>,
    /// Checklist indent (`SYNC_INDENT`)
    pub indent: String,
    /// Whether note reconciliation runs at all (`SYNC_NOTES_ENABLED`)
    pub sync_notes: bool,
    /// Whether a live panel consumer is attached (`LIVE_PANEL_ENABLED`)
    pub live_panel: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            user_id: env::var("HABITICA_USER_ID").ok().filter(|s| !s.is_empty()),
            api_key: env::var("HABITICA_API_KEY").ok().filter(|s| !s.is_empty()),
            base_url: env::var("HABITICA_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| habitica::client::DEFAULT_BASE_URL.to_string()),
            timeout_secs: env::var("HABITICA_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            rate_limit_buffer_ms: env::var("HABITICA_RATE_BUFFER_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(500),
            folder: env::var("SYNC_FOLDER")
                .ok()
                .filter(|s| !s.is_empty())
                .map_or_else(|| PathBuf::from("habitica"), PathBuf::from),
            global_tag: env::var("SYNC_GLOBAL_TAG").ok().filter(|s| !s.is_empty()),
            indent: env::var("SYNC_INDENT").ok().unwrap_or_else(|| "    ".to_string()),
            sync_notes: env::var("SYNC_NOTES_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            live_panel: env::var("LIVE_PANEL_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl SyncConfig {
    /// Client settings, once both credentials are present.
    #[must_use]
    pub fn client_config(&self) -> Option<ClientConfig> {
        let user_id = self.user_id.clone()?;
        let api_key = self.api_key.clone()?;
        Some(ClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            rate_limit_buffer: Duration::from_millis(self.rate_limit_buffer_ms),
            ..ClientConfig::new(user_id, api_key)
        })
    }

    /// Renderer settings derived from this configuration.
    #[must_use]
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            indent: self.indent.clone(),
            global_tag: self.global_tag.clone(),
        }
    }
}

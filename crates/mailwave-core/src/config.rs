//! Shell configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{MailwaveError, MailwaveResult};

/// Configuration for one mailboxes window and its policy core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Hostname of the internal capture channel
    pub capture_url_hostname: String,

    /// Path prefix of the internal capture channel
    pub capture_url_prefix: String,

    /// URL scheme (without `:`) that serves hosted extension pages
    pub hosted_extension_protocol: String,

    /// Delay before a reload is forced when the frame does not acknowledge
    pub graceful_reload_delay_ms: u64,

    /// URL prefixes the shell's own frame may navigate to
    pub allowed_frame_urls: Vec<String>,

    /// Prefix for per-mailbox persistent session partitions
    pub content_partition_prefix: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            capture_url_hostname: "wavebox.io".to_string(),
            capture_url_prefix: "/capture/".to_string(),
            hosted_extension_protocol: "chrome-extension".to_string(),
            graceful_reload_delay_ms: 750,
            allowed_frame_urls: vec![
                "mailwave://shell/mailboxes.html".to_string(),
                "mailwave://shell/offline.html".to_string(),
            ],
            content_partition_prefix: "persist:".to_string(),
        }
    }
}

impl ShellConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> MailwaveResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        log::info!("Loaded shell configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load_or_default(path: &Path) -> MailwaveResult<Self> {
        if !path.exists() {
            log::info!("No shell configuration at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> MailwaveResult<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn validate(&self) -> MailwaveResult<()> {
        if self.capture_url_hostname.is_empty() {
            return Err(MailwaveError::config("capture_url_hostname must not be empty"));
        }
        if !self.capture_url_prefix.starts_with('/') {
            return Err(MailwaveError::config(format!(
                "capture_url_prefix must start with '/': {}",
                self.capture_url_prefix
            )));
        }
        if self.hosted_extension_protocol.is_empty() || self.hosted_extension_protocol.ends_with(':')
        {
            return Err(MailwaveError::config(
                "hosted_extension_protocol must be a bare scheme",
            ));
        }
        Ok(())
    }

    pub fn graceful_reload_delay(&self) -> Duration {
        Duration::from_millis(self.graceful_reload_delay_ms)
    }

    /// Partition used for content windows opened on behalf of a mailbox
    pub fn partition_for_mailbox(&self, mailbox_id: &str) -> String {
        format!("{}{}", self.content_partition_prefix, mailbox_id)
    }
}

//! Notification dispatch configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the approval notification dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Whether notification dispatch is enabled at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Sender address recorded on outgoing mail.
    #[serde(default = "default_from_address")]
    pub from_address: String,
    /// Prefix prepended to every mail subject line.
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            from_address: default_from_address(),
            subject_prefix: default_subject_prefix(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_from_address() -> String {
    "no-reply@atrium.local".to_string()
}

fn default_subject_prefix() -> String {
    "[Atrium]".to_string()
}

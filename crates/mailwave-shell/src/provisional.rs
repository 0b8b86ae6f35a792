//! Last announced target URL per owner

use mailwave_core::types::OwnerId;
use std::collections::HashMap;

/// Remembers the most recent target-url-update for each owner.
///
/// Entries are overwritten, never cleared, so a later event may read a URL
/// announced for an earlier unrelated interaction.
#[derive(Debug, Default)]
pub struct ProvisionalUrlTracker {
    urls: HashMap<OwnerId, String>,
}

impl ProvisionalUrlTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, owner_id: OwnerId, url: impl Into<String>) {
        self.urls.insert(owner_id, url.into());
    }

    pub fn get(&self, owner_id: &OwnerId) -> Option<&str> {
        self.urls.get(owner_id).map(String::as_str)
    }
}

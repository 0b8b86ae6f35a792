//! Immutable snapshot of mailboxes and their services

use crate::rules::ServicePolicyKind;
use crate::{PolicyLookup, ServicePolicy, UrlRef};
use mailwave_core::types::{
    DefaultWindowOpenMode, Disposition, MailboxId, NavigateMode, OwnerId, ServiceType,
    WindowOpenMode,
};
use mailwave_core::MailwaveResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// One service inside a mailbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSnapshot {
    pub policy: ServicePolicyKind,

    /// Home URL of the service, used to tell in-service links from others
    pub url: Url,
}

impl ServiceSnapshot {
    pub fn new(policy: ServicePolicyKind, url: Url) -> Self {
        Self { policy, url }
    }
}

impl ServicePolicy for ServiceSnapshot {
    fn window_open_mode_for_url(
        &self,
        target: UrlRef<'_>,
        disposition: Disposition,
        provisional: Option<UrlRef<'_>>,
    ) -> WindowOpenMode {
        self.policy
            .window_open_mode(&self.url, target, disposition, provisional)
    }

    fn navigate_mode_for_url(&self, target: UrlRef<'_>) -> NavigateMode {
        self.policy.navigate_mode(&self.url, target)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxSnapshot {
    #[serde(default)]
    pub default_window_open_mode: DefaultWindowOpenMode,

    #[serde(default)]
    pub services: HashMap<ServiceType, ServiceSnapshot>,
}

/// Accounts as the service model sees them at the time of an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountsSnapshot {
    #[serde(default)]
    pub mailboxes: HashMap<MailboxId, MailboxSnapshot>,
}

impl AccountsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> MailwaveResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_mailbox(mut self, id: MailboxId, mailbox: MailboxSnapshot) -> Self {
        self.mailboxes.insert(id, mailbox);
        self
    }

    pub fn mailbox(&self, id: &MailboxId) -> Option<&MailboxSnapshot> {
        self.mailboxes.get(id)
    }

    pub fn service(&self, owner: &OwnerId) -> Option<&ServiceSnapshot> {
        self.mailboxes
            .get(&owner.mailbox_id)
            .and_then(|mailbox| mailbox.services.get(&owner.service_type))
    }
}

impl MailboxSnapshot {
    pub fn new(default_window_open_mode: DefaultWindowOpenMode) -> Self {
        Self {
            default_window_open_mode,
            services: HashMap::new(),
        }
    }

    pub fn with_service(mut self, service_type: ServiceType, service: ServiceSnapshot) -> Self {
        self.services.insert(service_type, service);
        self
    }
}

impl PolicyLookup for AccountsSnapshot {
    fn policy_for(&self, owner: &OwnerId) -> Option<&dyn ServicePolicy> {
        self.service(owner).map(|service| service as &dyn ServicePolicy)
    }

    fn default_window_open_mode(&self, mailbox: &MailboxId) -> Option<DefaultWindowOpenMode> {
        self.mailbox(mailbox)
            .map(|mailbox| mailbox.default_window_open_mode)
    }
}

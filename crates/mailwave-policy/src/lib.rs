//! Window and navigation policy for embedded services
//!
//! Each service kind carries its own rules for what to do with new windows
//! and navigations. [`PolicyResolver`] wraps those rules with the reserved
//! capture-URL short circuit and the fail-safe fallbacks.

pub mod accounts;
pub mod resolver;
pub mod rules;

use mailwave_core::types::{
    DefaultWindowOpenMode, Disposition, MailboxId, NavigateMode, OwnerId, WindowOpenMode,
};
use url::Url;

pub use accounts::{AccountsSnapshot, MailboxSnapshot, ServiceSnapshot};
pub use resolver::{PolicyResolver, Resolution};
pub use rules::ServicePolicyKind;

/// A URL as the engine reported it, alongside its parsed form
#[derive(Debug, Clone, Copy)]
pub struct UrlRef<'a> {
    pub raw: &'a str,
    pub parsed: &'a Url,
}

impl<'a> UrlRef<'a> {
    pub fn new(raw: &'a str, parsed: &'a Url) -> Self {
        Self { raw, parsed }
    }
}

/// Capability every service exposes to the resolver
pub trait ServicePolicy {
    /// Decide how a new-window request should open.
    ///
    /// `provisional` is the last URL the page announced before the request,
    /// when one is known.
    fn window_open_mode_for_url(
        &self,
        target: UrlRef<'_>,
        disposition: Disposition,
        provisional: Option<UrlRef<'_>>,
    ) -> WindowOpenMode;

    /// Decide what to do with an in-place navigation
    fn navigate_mode_for_url(&self, target: UrlRef<'_>) -> NavigateMode;
}

/// Read-only view of account state the resolver and dispatcher consult
pub trait PolicyLookup {
    /// The policy of the service an owner id points at
    fn policy_for(&self, owner: &OwnerId) -> Option<&dyn ServicePolicy>;

    /// The mailbox's preference for links left up to the user
    fn default_window_open_mode(&self, mailbox: &MailboxId) -> Option<DefaultWindowOpenMode>;
}

//! Orchestrates policy lookups for intercepted navigation events
//!
//! The resolver owns the ordering of checks and the fail-safe fallbacks:
//!
//! 1. Reserved capture URLs are dropped without any action.
//! 2. Targets that do not parse open externally with the raw string.
//! 3. Unknown owners and services without a policy open externally
//!    (navigations pass through unchanged).
//! 4. Everything else is up to the service's [`ServicePolicy`].
//!
//! Provisional modes degrade to their literal sibling when no provisional URL
//! is known, so later stages never look one up that does not exist.

use crate::{PolicyLookup, ServicePolicy, UrlRef};
use mailwave_core::types::{Disposition, NavigateMode, OwnerId, WindowOpenMode};
use mailwave_core::{MailwaveError, ShellConfig};
use url::Url;

/// Outcome of resolving a new-window request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The target was an internal capture URL; nothing must happen
    Dropped,
    /// Perform the action for this mode
    Mode(WindowOpenMode),
}

impl Resolution {
    pub fn mode(self) -> Option<WindowOpenMode> {
        match self {
            Resolution::Dropped => None,
            Resolution::Mode(mode) => Some(mode),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PolicyResolver {
    capture_hostname: String,
    capture_prefix: String,
}

impl PolicyResolver {
    pub fn new(capture_hostname: impl Into<String>, capture_prefix: impl Into<String>) -> Self {
        Self {
            capture_hostname: capture_hostname.into(),
            capture_prefix: capture_prefix.into(),
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(
            config.capture_url_hostname.clone(),
            config.capture_url_prefix.clone(),
        )
    }

    /// True if the URL belongs to the host's internal capture channel
    pub fn is_capture_url(&self, parsed: &Url) -> bool {
        parsed.host_str() == Some(self.capture_hostname.as_str())
            && parsed.path().starts_with(&self.capture_prefix)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn resolve_window_open_mode(
        &self,
        policies: &dyn PolicyLookup,
        owner: Option<&OwnerId>,
        target_url: &str,
        parsed_target: Option<&Url>,
        disposition: Disposition,
        provisional_url: Option<&str>,
        parsed_provisional: Option<&Url>,
    ) -> Resolution {
        let Some(parsed_target) = parsed_target else {
            log::warn!(
                "{}; opening externally",
                MailwaveError::malformed_url(target_url)
            );
            return Resolution::Mode(WindowOpenMode::External);
        };

        if self.is_capture_url(parsed_target) {
            log::trace!("{}", MailwaveError::ReservedUrlIntercepted(target_url.to_string()));
            return Resolution::Dropped;
        }

        let Some(policy) = self.policy(policies, owner) else {
            return Resolution::Mode(WindowOpenMode::External);
        };

        let provisional = match (provisional_url, parsed_provisional) {
            (Some(raw), Some(parsed)) => Some(UrlRef::new(raw, parsed)),
            _ => None,
        };

        let mode = policy.window_open_mode_for_url(
            UrlRef::new(target_url, parsed_target),
            disposition,
            provisional,
        );

        if mode.is_provisional() && provisional.is_none() {
            let sibling = mode.non_provisional();
            log::debug!(
                "{:?} requested without a provisional URL, using {:?}",
                mode,
                sibling
            );
            return Resolution::Mode(sibling);
        }

        Resolution::Mode(mode)
    }

    pub fn resolve_navigate_mode(
        &self,
        policies: &dyn PolicyLookup,
        owner: Option<&OwnerId>,
        target_url: &str,
        parsed_target: Option<&Url>,
    ) -> NavigateMode {
        let Some(parsed_target) = parsed_target else {
            log::debug!("{}", MailwaveError::malformed_url(target_url));
            return NavigateMode::Default;
        };

        match self.policy(policies, owner) {
            Some(policy) => policy.navigate_mode_for_url(UrlRef::new(target_url, parsed_target)),
            None => NavigateMode::Default,
        }
    }

    fn policy<'p>(
        &self,
        policies: &'p dyn PolicyLookup,
        owner: Option<&OwnerId>,
    ) -> Option<&'p dyn ServicePolicy> {
        let Some(owner) = owner else {
            log::debug!("{}", MailwaveError::UnknownSurface("no owner".to_string()));
            return None;
        };

        let policy = policies.policy_for(owner);
        if policy.is_none() {
            log::debug!("{}", MailwaveError::UnresolvedPolicy(owner.to_string()));
        }
        policy
    }
}

impl Default for PolicyResolver {
    fn default() -> Self {
        Self::from_config(&ShellConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountsSnapshot, MailboxSnapshot, ServicePolicyKind, ServiceSnapshot};
    use mailwave_core::types::{DefaultWindowOpenMode, MailboxId, ServiceType};

    struct Fixed(WindowOpenMode, NavigateMode);

    impl ServicePolicy for Fixed {
        fn window_open_mode_for_url(
            &self,
            _target: UrlRef<'_>,
            _disposition: Disposition,
            _provisional: Option<UrlRef<'_>>,
        ) -> WindowOpenMode {
            self.0
        }

        fn navigate_mode_for_url(&self, _target: UrlRef<'_>) -> NavigateMode {
            self.1
        }
    }

    impl PolicyLookup for Fixed {
        fn policy_for(&self, _owner: &OwnerId) -> Option<&dyn ServicePolicy> {
            Some(self)
        }

        fn default_window_open_mode(&self, _mailbox: &MailboxId) -> Option<DefaultWindowOpenMode> {
            None
        }
    }

    fn owner() -> OwnerId {
        OwnerId::new(MailboxId::new("acct1"), ServiceType::new("mail"))
    }

    fn resolve(
        policies: &dyn PolicyLookup,
        owner: Option<&OwnerId>,
        target: &str,
        provisional: Option<&str>,
    ) -> Resolution {
        let parsed = Url::parse(target).ok();
        let parsed_provisional = provisional.and_then(|p| Url::parse(p).ok());
        PolicyResolver::default().resolve_window_open_mode(
            policies,
            owner,
            target,
            parsed.as_ref(),
            Disposition::ForegroundTab,
            provisional,
            parsed_provisional.as_ref(),
        )
    }

    #[test]
    fn test_no_policy_opens_external() {
        let accounts = AccountsSnapshot::new();
        let owner = owner();
        assert_eq!(
            resolve(&accounts, Some(&owner), "https://example.org/", None),
            Resolution::Mode(WindowOpenMode::External)
        );
        assert_eq!(
            resolve(&accounts, None, "https://example.org/", None),
            Resolution::Mode(WindowOpenMode::External)
        );
        let parsed = Url::parse("https://example.org/").unwrap();
        assert_eq!(
            PolicyResolver::default().resolve_navigate_mode(
                &accounts,
                Some(&owner),
                "https://example.org/",
                Some(&parsed),
            ),
            NavigateMode::Default
        );
    }

    #[test]
    fn test_capture_url_is_dropped_regardless_of_policy() {
        let fixed = Fixed(WindowOpenMode::Content, NavigateMode::Default);
        let owner = owner();
        assert_eq!(
            resolve(&fixed, Some(&owner), "https://wavebox.io/capture/auth?code=1", None),
            Resolution::Dropped
        );
        assert_eq!(
            resolve(&fixed, None, "https://wavebox.io/capture/", None),
            Resolution::Dropped
        );
        assert_eq!(
            resolve(&fixed, Some(&owner), "https://wavebox.io/pricing", None),
            Resolution::Mode(WindowOpenMode::Content)
        );
    }

    #[test]
    fn test_malformed_target_opens_external() {
        let fixed = Fixed(WindowOpenMode::Content, NavigateMode::Suppress);
        let owner = owner();
        assert_eq!(
            resolve(&fixed, Some(&owner), "not a url", None),
            Resolution::Mode(WindowOpenMode::External)
        );
        assert_eq!(
            PolicyResolver::default().resolve_navigate_mode(&fixed, Some(&owner), "::", None),
            NavigateMode::Default
        );
    }

    #[test]
    fn test_provisional_degrades_without_url() {
        let fixed = Fixed(WindowOpenMode::ContentProvisional, NavigateMode::Default);
        let owner = owner();
        assert_eq!(
            resolve(&fixed, Some(&owner), "about:blank", None),
            Resolution::Mode(WindowOpenMode::Content)
        );
        assert_eq!(
            resolve(&fixed, Some(&owner), "about:blank", Some("not a url")),
            Resolution::Mode(WindowOpenMode::Content)
        );
        assert_eq!(
            resolve(&fixed, Some(&owner), "about:blank", Some("https://example.org/")),
            Resolution::Mode(WindowOpenMode::ContentProvisional)
        );
    }

    #[test]
    fn test_delegates_to_service_policy() {
        let accounts = AccountsSnapshot::new().with_mailbox(
            MailboxId::new("acct1"),
            MailboxSnapshot::new(DefaultWindowOpenMode::InApp).with_service(
                ServiceType::new("mail"),
                ServiceSnapshot::new(
                    ServicePolicyKind::Mail,
                    Url::parse("https://mail.google.com/").unwrap(),
                ),
            ),
        );
        let owner = owner();
        assert_eq!(
            resolve(
                &accounts,
                Some(&owner),
                "about:blank",
                Some("https://accounts.example.com/oauth/redirect?state=1"),
            ),
            Resolution::Mode(WindowOpenMode::DefaultProvisional)
        );
        assert_eq!(
            resolve(&accounts, Some(&owner), "https://accounts.google.com/", None).mode(),
            Some(WindowOpenMode::PopupContent)
        );
    }
}

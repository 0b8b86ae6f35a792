//! Turns resolved policy modes into host actions
//!
//! Exactly one action is taken per event. Host failures never escape: a
//! window that cannot be created is opened in the system browser instead,
//! and a browser that cannot be launched is logged and reported in the
//! outcome.

use crate::host::WindowHost;
use crate::windows::ManagedWindowRegistry;
use mailwave_core::types::{
    ContentWindowRequest, DefaultWindowOpenMode, MailboxId, NavigateMode, OwnerId,
    PopupWindowRequest, WebPreferences, WindowId, WindowKind, WindowOpenMode, WindowOptions,
};
use mailwave_core::ShellConfig;
use mailwave_policy::PolicyLookup;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// The action performed for one event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DispatchOutcome {
    OpenedExternal { url: String },
    ContentWindow { window_id: WindowId, url: String },
    PopupWindow { window_id: WindowId, url: String },
    DownloadStarted { url: String },
    /// Nothing to do, e.g. a download without contents to run it through
    Nothing,
    /// The system browser could not be launched
    Failed { url: String, reason: String },
}

impl DispatchOutcome {
    /// Window that should replace the engine's default guest, if any
    pub fn new_guest(&self) -> Option<WindowId> {
        match self {
            DispatchOutcome::PopupWindow { window_id, .. } => Some(*window_id),
            _ => None,
        }
    }
}

/// Result of a will-navigate interception
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateDecision {
    /// Cancel the engine's own navigation
    pub prevent_default: bool,
    pub outcome: DispatchOutcome,
}

impl NavigateDecision {
    pub fn allow() -> Self {
        Self {
            prevent_default: false,
            outcome: DispatchOutcome::Nothing,
        }
    }

    pub fn suppress() -> Self {
        Self {
            prevent_default: true,
            outcome: DispatchOutcome::Nothing,
        }
    }
}

pub struct WindowActionDispatcher<'a, H: WindowHost + ?Sized> {
    host: &'a mut H,
    windows: &'a mut ManagedWindowRegistry,
    accounts: &'a dyn PolicyLookup,
    config: &'a ShellConfig,
}

impl<'a, H: WindowHost + ?Sized> WindowActionDispatcher<'a, H> {
    pub fn new(
        host: &'a mut H,
        windows: &'a mut ManagedWindowRegistry,
        accounts: &'a dyn PolicyLookup,
        config: &'a ShellConfig,
    ) -> Self {
        Self {
            host,
            windows,
            accounts,
            config,
        }
    }

    /// Perform the action for a resolved new-window mode.
    ///
    /// Provisional modes use `provisional_url` and fall back to the target
    /// when it is missing.
    pub fn dispatch_window_open(
        &mut self,
        mode: WindowOpenMode,
        owner: Option<&OwnerId>,
        target_url: &str,
        provisional_url: Option<&str>,
        options: &WindowOptions,
    ) -> DispatchOutcome {
        let url = if mode.is_provisional() {
            provisional_url.unwrap_or(target_url)
        } else {
            target_url
        };
        debug!(?mode, %url, "dispatching new window");

        match mode {
            WindowOpenMode::PopupContent => self.open_popup(owner, url, options),
            WindowOpenMode::External | WindowOpenMode::ExternalProvisional => {
                self.open_external(url, owner.map(|o| &o.mailbox_id))
            }
            WindowOpenMode::Default | WindowOpenMode::DefaultProvisional => {
                self.open_default(owner, url, options)
            }
            WindowOpenMode::Content | WindowOpenMode::ContentProvisional => {
                self.open_content(owner, url, options)
            }
            WindowOpenMode::Download => match options.contents {
                Some(contents) => match self.host.download(contents, target_url) {
                    Ok(()) => DispatchOutcome::DownloadStarted {
                        url: target_url.to_string(),
                    },
                    Err(e) => {
                        warn!("Download of {} failed ({}), opening externally", target_url, e);
                        self.open_external(target_url, owner.map(|o| &o.mailbox_id))
                    }
                },
                None => {
                    debug!(%target_url, "download requested without contents, ignoring");
                    DispatchOutcome::Nothing
                }
            },
        }
    }

    /// Perform the action for a resolved navigate mode
    pub fn dispatch_navigate(
        &mut self,
        mode: NavigateMode,
        owner: &OwnerId,
        target_url: &str,
    ) -> NavigateDecision {
        match mode {
            NavigateMode::Default => NavigateDecision::allow(),
            NavigateMode::Suppress => {
                debug!(%owner, %target_url, "navigation suppressed");
                NavigateDecision::suppress()
            }
            NavigateMode::OpenExternal => NavigateDecision {
                prevent_default: true,
                outcome: self.open_external(target_url, Some(&owner.mailbox_id)),
            },
            NavigateMode::OpenContent => {
                let partition = self
                    .config
                    .partition_for_mailbox(owner.mailbox_id.as_str());
                let options = WindowOptions {
                    web_preferences: WebPreferences::with_partition(partition),
                    ..WindowOptions::default()
                };
                NavigateDecision {
                    prevent_default: true,
                    outcome: self.open_content(Some(owner), target_url, &options),
                }
            }
        }
    }

    /// Open in the system browser or in-app depending on the mailbox setting
    pub fn open_default(
        &mut self,
        owner: Option<&OwnerId>,
        url: &str,
        options: &WindowOptions,
    ) -> DispatchOutcome {
        let preference =
            owner.and_then(|owner| self.accounts.default_window_open_mode(&owner.mailbox_id));

        match preference {
            Some(DefaultWindowOpenMode::InApp) => self.open_content(owner, url, options),
            Some(DefaultWindowOpenMode::SystemBrowser) | None => {
                self.open_external(url, owner.map(|o| &o.mailbox_id))
            }
        }
    }

    pub fn open_external(&mut self, url: &str, mailbox: Option<&MailboxId>) -> DispatchOutcome {
        match self.host.open_external(url, mailbox) {
            Ok(()) => {
                info!("Opened {} in system browser", url);
                DispatchOutcome::OpenedExternal {
                    url: url.to_string(),
                }
            }
            Err(e) => {
                error!("Failed to open {} externally: {}", url, e);
                DispatchOutcome::Failed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn open_content(
        &mut self,
        owner: Option<&OwnerId>,
        url: &str,
        options: &WindowOptions,
    ) -> DispatchOutcome {
        let Some(owner) = owner else {
            debug!(%url, "content window without owner, opening externally");
            return self.open_external(url, None);
        };

        let request = ContentWindowRequest {
            owner_id: owner.clone(),
            url: url.to_string(),
            partition: options.partition().map(str::to_string),
            window_preferences: options.window_preferences.clone(),
            web_preferences: options.web_preferences.clone(),
        };

        match self.host.create_content_window(request) {
            Ok(window_id) => {
                self.windows.add(window_id, owner.clone(), WindowKind::Content);
                DispatchOutcome::ContentWindow {
                    window_id,
                    url: url.to_string(),
                }
            }
            Err(e) => {
                warn!("Content window for {} failed ({}), opening externally", owner, e);
                self.open_external(url, Some(&owner.mailbox_id))
            }
        }
    }

    pub fn open_popup(
        &mut self,
        owner: Option<&OwnerId>,
        url: &str,
        options: &WindowOptions,
    ) -> DispatchOutcome {
        let Some(owner) = owner else {
            debug!(%url, "popup without owner, opening externally");
            return self.open_external(url, None);
        };

        let request = PopupWindowRequest {
            owner_id: owner.clone(),
            url: url.to_string(),
            window_preferences: options.window_preferences.clone(),
            web_preferences: options.web_preferences.clone(),
        };

        match self.host.create_popup_window(request) {
            Ok(window_id) => {
                self.windows.add(window_id, owner.clone(), WindowKind::Popup);
                DispatchOutcome::PopupWindow {
                    window_id,
                    url: url.to_string(),
                }
            }
            Err(e) => {
                warn!("Popup for {} failed ({}), opening externally", owner, e);
                self.open_external(url, Some(&owner.mailbox_id))
            }
        }
    }
}

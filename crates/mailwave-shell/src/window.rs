//! The mailboxes window: owns the registries for one shell window and
//! handles every event its embedded surfaces raise.
//!
//! All handlers run synchronously on the event-delivery thread and return
//! the decision the engine callback needs before it returns.

use crate::dispatcher::{DispatchOutcome, NavigateDecision, WindowActionDispatcher};
use crate::host::WindowHost;
use crate::provisional::ProvisionalUrlTracker;
use crate::reload::GracefulReload;
use crate::surfaces::AttachedSurfaceRegistry;
use crate::windows::ManagedWindowRegistry;
use mailwave_core::types::{
    ExtensionAttached, MailboxId, NewWindowEvent, OpenWindowRequest, OwnerId, ServiceType,
    SurfaceAttached, SurfaceId, WebPreferences, WillNavigateEvent, WindowId, WindowOpenMode,
    WindowOptions,
};
use mailwave_core::{MailwaveError, ShellConfig};
use mailwave_policy::{PolicyLookup, PolicyResolver, Resolution};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use url::Url;

/// Every event the mailboxes window reacts to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ShellEvent {
    MailboxSurfaceAttached(SurfaceAttached),
    ExtensionSurfaceAttached(ExtensionAttached),
    TargetUrlUpdated { surface_id: SurfaceId, url: String },
    NewWindow(NewWindowEvent),
    WillNavigate(WillNavigateEvent),
    OpenWindow(OpenWindowRequest),
    FetchOpenWindowCount {
        mailbox_id: MailboxId,
        service_type: ServiceType,
    },
    WindowClosed { window_id: WindowId },
    HostWillNavigate { url: String },
    RequestReload,
    AcceptGracefulReload,
}

/// Result of a new-window interception
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWindowDecision {
    /// The engine's own handling is always cancelled
    pub prevent_default: bool,
    /// None when the target was a reserved capture URL
    pub mode: Option<WindowOpenMode>,
    /// Window to hand back to the engine as the new guest
    pub new_guest: Option<WindowId>,
    pub outcome: DispatchOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventOutcome {
    Recorded,
    Ignored,
    NewWindow(NewWindowDecision),
    Navigate(NavigateDecision),
    Dispatched(DispatchOutcome),
    OpenWindowCount { count: usize },
    HostNavigation { allowed: bool },
    Reload { forced: bool },
}

pub struct MailboxesWindow {
    config: ShellConfig,
    resolver: PolicyResolver,
    surfaces: AttachedSurfaceRegistry,
    provisional: ProvisionalUrlTracker,
    windows: ManagedWindowRegistry,
    reload: GracefulReload,
}

impl MailboxesWindow {
    pub fn new(config: ShellConfig) -> Self {
        info!("Creating mailboxes window");
        Self {
            resolver: PolicyResolver::from_config(&config),
            reload: GracefulReload::new(config.graceful_reload_delay()),
            surfaces: AttachedSurfaceRegistry::new(),
            provisional: ProvisionalUrlTracker::new(),
            windows: ManagedWindowRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn surfaces(&self) -> &AttachedSurfaceRegistry {
        &self.surfaces
    }

    pub fn provisional(&self) -> &ProvisionalUrlTracker {
        &self.provisional
    }

    pub fn windows(&self) -> &ManagedWindowRegistry {
        &self.windows
    }

    pub fn reload(&self) -> &GracefulReload {
        &self.reload
    }

    /// Route an event to its handler
    pub fn handle_event<H: WindowHost + ?Sized>(
        &mut self,
        event: ShellEvent,
        accounts: &dyn PolicyLookup,
        host: &mut H,
        now: Instant,
    ) -> EventOutcome {
        match event {
            ShellEvent::MailboxSurfaceAttached(attached) => {
                self.handle_mailbox_surface_attached(&attached);
                EventOutcome::Recorded
            }
            ShellEvent::ExtensionSurfaceAttached(attached) => {
                self.handle_extension_surface_attached(attached);
                EventOutcome::Recorded
            }
            ShellEvent::TargetUrlUpdated { surface_id, url } => {
                if self.handle_target_url_updated(surface_id, url) {
                    EventOutcome::Recorded
                } else {
                    EventOutcome::Ignored
                }
            }
            ShellEvent::NewWindow(event) => {
                EventOutcome::NewWindow(self.handle_new_window(&event, accounts, host))
            }
            ShellEvent::WillNavigate(event) => {
                EventOutcome::Navigate(self.handle_will_navigate(&event, accounts, host))
            }
            ShellEvent::OpenWindow(request) => {
                EventOutcome::Dispatched(self.handle_open_window_request(&request, accounts, host))
            }
            ShellEvent::FetchOpenWindowCount {
                mailbox_id,
                service_type,
            } => EventOutcome::OpenWindowCount {
                count: self.open_window_count(&mailbox_id, &service_type),
            },
            ShellEvent::WindowClosed { window_id } => {
                if self.handle_window_closed(window_id) {
                    EventOutcome::Recorded
                } else {
                    EventOutcome::Ignored
                }
            }
            ShellEvent::HostWillNavigate { url } => EventOutcome::HostNavigation {
                allowed: self.allows_host_navigation(&url),
            },
            ShellEvent::RequestReload => {
                self.request_reload(host, now);
                EventOutcome::Reload { forced: false }
            }
            ShellEvent::AcceptGracefulReload => {
                self.accept_graceful_reload(host);
                EventOutcome::Reload { forced: false }
            }
        }
    }

    pub fn handle_mailbox_surface_attached(&mut self, attached: &SurfaceAttached) {
        self.surfaces.attach(attached.surface_id, attached.owner_id());
    }

    pub fn handle_extension_surface_attached(&mut self, attached: ExtensionAttached) {
        self.surfaces
            .attach_extension(attached.surface_id, attached.extension_id);
    }

    /// Remember the URL a surface announced; returns false for unknown surfaces
    pub fn handle_target_url_updated(&mut self, surface_id: SurfaceId, url: String) -> bool {
        match self.surfaces.lookup(surface_id) {
            Some(owner) => {
                self.provisional.record(owner.clone(), url);
                true
            }
            None => false,
        }
    }

    pub fn handle_new_window<H: WindowHost + ?Sized>(
        &mut self,
        event: &NewWindowEvent,
        accounts: &dyn PolicyLookup,
        host: &mut H,
    ) -> NewWindowDecision {
        let owner = self.surfaces.lookup(event.surface_id).cloned();
        if owner.is_none() {
            debug!("{}", MailwaveError::UnknownSurface(event.surface_id.to_string()));
        }

        let provisional_url = owner
            .as_ref()
            .and_then(|owner| self.provisional.get(owner))
            .map(str::to_string);
        let parsed_target = Url::parse(&event.target_url).ok();
        let parsed_provisional = provisional_url
            .as_deref()
            .and_then(|url| Url::parse(url).ok());

        let resolution = self.resolver.resolve_window_open_mode(
            accounts,
            owner.as_ref(),
            &event.target_url,
            parsed_target.as_ref(),
            event.disposition,
            provisional_url.as_deref(),
            parsed_provisional.as_ref(),
        );

        let outcome = match resolution {
            Resolution::Dropped => DispatchOutcome::Nothing,
            Resolution::Mode(mode) => {
                info!(
                    surface = %event.surface_id,
                    ?mode,
                    target = %event.target_url,
                    "new window"
                );
                WindowActionDispatcher::new(host, &mut self.windows, accounts, &self.config)
                    .dispatch_window_open(
                        mode,
                        owner.as_ref(),
                        &event.target_url,
                        provisional_url.as_deref(),
                        &event.options,
                    )
            }
        };

        NewWindowDecision {
            prevent_default: true,
            mode: resolution.mode(),
            new_guest: outcome.new_guest(),
            outcome,
        }
    }

    pub fn handle_will_navigate<H: WindowHost + ?Sized>(
        &mut self,
        event: &WillNavigateEvent,
        accounts: &dyn PolicyLookup,
        host: &mut H,
    ) -> NavigateDecision {
        let parsed_target = Url::parse(&event.target_url).ok();

        if self.surfaces.is_extension(event.surface_id) {
            let hosted = parsed_target
                .as_ref()
                .map(|url| url.scheme() == self.config.hosted_extension_protocol)
                .unwrap_or(false);
            if !hosted {
                debug!(
                    surface = %event.surface_id,
                    target = %event.target_url,
                    "extension navigation outside hosted scheme suppressed"
                );
                return NavigateDecision::suppress();
            }
        }

        let Some(owner) = self.surfaces.lookup(event.surface_id).cloned() else {
            return NavigateDecision::allow();
        };

        let mode = self.resolver.resolve_navigate_mode(
            accounts,
            Some(&owner),
            &event.target_url,
            parsed_target.as_ref(),
        );
        debug!(%owner, ?mode, target = %event.target_url, "will navigate");

        WindowActionDispatcher::new(host, &mut self.windows, accounts, &self.config)
            .dispatch_navigate(mode, &owner, &event.target_url)
    }

    /// Open a content window the shell frame asked for directly
    pub fn handle_open_window_request<H: WindowHost + ?Sized>(
        &mut self,
        request: &OpenWindowRequest,
        accounts: &dyn PolicyLookup,
        host: &mut H,
    ) -> DispatchOutcome {
        let owner = OwnerId::new(request.mailbox_id.clone(), request.service_type.clone());
        let web_preferences = WebPreferences {
            partition: request
                .partition
                .clone()
                .or_else(|| request.web_preferences.partition.clone()),
            extra: request.web_preferences.extra.clone(),
        };
        let options = WindowOptions {
            web_preferences,
            window_preferences: request.window_preferences.clone(),
            contents: None,
        };

        WindowActionDispatcher::new(host, &mut self.windows, accounts, &self.config)
            .open_content(Some(&owner), &request.url, &options)
    }

    pub fn open_window_count(&self, mailbox_id: &MailboxId, service_type: &ServiceType) -> usize {
        let owner = OwnerId::new(mailbox_id.clone(), service_type.clone());
        self.windows.count_by_owner(&owner)
    }

    /// The host closed a managed window; returns whether it was tracked
    pub fn handle_window_closed(&mut self, window_id: WindowId) -> bool {
        self.windows.remove(window_id).is_some()
    }

    /// The shell's own frame may only load its allowed pages
    pub fn allows_host_navigation(&self, url: &str) -> bool {
        let allowed = self
            .config
            .allowed_frame_urls
            .iter()
            .any(|prefix| url.starts_with(prefix.as_str()));
        if !allowed {
            warn!("Blocked shell frame navigation to {}", url);
        }
        allowed
    }

    /// Ask the frame to reload and schedule the forced fallback
    pub fn request_reload<H: WindowHost + ?Sized>(&mut self, host: &mut H, now: Instant) {
        self.reload.request(now);
        if let Err(e) = host.request_graceful_reload() {
            warn!("Frame did not take the reload request ({}), reloading now", e);
            self.reload.cancel();
            self.load_frame(host);
        }
    }

    pub fn accept_graceful_reload<H: WindowHost + ?Sized>(&mut self, host: &mut H) {
        if !self.reload.acknowledge() {
            debug!("Graceful reload acknowledged without a pending request");
        }
        self.load_frame(host);
    }

    /// Drive the reload fallback; returns true if a forced reload happened
    pub fn poll<H: WindowHost + ?Sized>(&mut self, host: &mut H, now: Instant) -> bool {
        if self.reload.poll(now) {
            warn!("Frame did not acknowledge reload in time, forcing it");
            self.load_frame(host);
            true
        } else {
            false
        }
    }

    /// Tear down timers before the window goes away
    pub fn destroy(&mut self) {
        self.reload.cancel();
        info!(
            "Destroying mailboxes window ({} surfaces, {} managed windows)",
            self.surfaces.len(),
            self.windows.len()
        );
    }

    fn load_frame<H: WindowHost + ?Sized>(&mut self, host: &mut H) {
        if let Err(e) = host.load_frame() {
            error!("Failed to load shell frame: {}", e);
        }
    }
}

impl Default for MailboxesWindow {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostRequest, RecordingHost};
    use mailwave_policy::AccountsSnapshot;
    use std::time::Duration;

    #[test]
    fn test_event_json_shape() {
        let event: ShellEvent = serde_json::from_str(
            r#"{"event":"target_url_updated","surfaceId":3,"url":"https://example.org/"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            ShellEvent::TargetUrlUpdated {
                surface_id: SurfaceId(3),
                url: "https://example.org/".to_string()
            }
        );

        let event: ShellEvent = serde_json::from_str(
            r#"{"event":"mailbox_surface_attached","surfaceId":1,"mailboxId":"acct1","serviceType":"mail"}"#,
        )
        .unwrap();
        assert!(matches!(event, ShellEvent::MailboxSurfaceAttached(_)));
    }

    #[test]
    fn test_new_window_outcome_json_keeps_kind() {
        let mut window = MailboxesWindow::default();
        let mut host = RecordingHost::new();
        let event: ShellEvent = serde_json::from_str(
            r#"{"event":"new_window","surfaceId":4,"targetUrl":"https://example.org/"}"#,
        )
        .unwrap();

        let outcome = window.handle_event(event, &AccountsSnapshot::new(), &mut host, Instant::now());
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json.matches("\"kind\"").count(), 1);
        assert_eq!(json.matches("\"outcome\"").count(), 1);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "new_window");
        assert_eq!(value["mode"], "EXTERNAL");
        assert_eq!(value["outcome"]["action"], "opened_external");
    }

    #[test]
    fn test_target_url_for_unknown_surface_is_ignored() {
        let mut window = MailboxesWindow::default();
        assert!(!window.handle_target_url_updated(SurfaceId(1), "https://a.org/".to_string()));
    }

    #[test]
    fn test_host_navigation_lock() {
        let window = MailboxesWindow::default();
        assert!(window.allows_host_navigation("mailwave://shell/mailboxes.html?clientId=1"));
        assert!(window.allows_host_navigation("mailwave://shell/offline.html"));
        assert!(!window.allows_host_navigation("file:///tmp/dropped.pdf"));
    }

    #[test]
    fn test_reload_fallback() {
        let mut window = MailboxesWindow::default();
        let mut host = RecordingHost::new();
        let start = Instant::now();

        window.request_reload(&mut host, start);
        assert!(!window.poll(&mut host, start + Duration::from_millis(100)));
        assert!(window.poll(&mut host, start + Duration::from_millis(750)));
        assert_eq!(
            host.requests(),
            &[HostRequest::GracefulReload, HostRequest::LoadFrame]
        );
    }

    #[test]
    fn test_acknowledged_reload_does_not_force() {
        let mut window = MailboxesWindow::default();
        let mut host = RecordingHost::new();
        let accounts = AccountsSnapshot::new();
        let start = Instant::now();

        window.handle_event(ShellEvent::RequestReload, &accounts, &mut host, start);
        window.handle_event(ShellEvent::AcceptGracefulReload, &accounts, &mut host, start);
        assert!(!window.poll(&mut host, start + Duration::from_secs(1)));
        assert_eq!(
            host.requests(),
            &[HostRequest::GracefulReload, HostRequest::LoadFrame]
        );
    }
}

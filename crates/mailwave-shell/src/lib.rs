//! Mailboxes window core - surface registry, provisional URLs, managed
//! windows, and the dispatcher that turns policy decisions into actions

pub mod dispatcher;
pub mod host;
pub mod provisional;
pub mod reload;
pub mod surfaces;
pub mod window;
pub mod windows;

pub use dispatcher::{DispatchOutcome, NavigateDecision, WindowActionDispatcher};
pub use host::{HostRequest, RecordingHost, WindowHost};
pub use provisional::ProvisionalUrlTracker;
pub use reload::GracefulReload;
pub use surfaces::AttachedSurfaceRegistry;
pub use window::{EventOutcome, MailboxesWindow, NewWindowDecision, ShellEvent};
pub use windows::{ManagedWindow, ManagedWindowRegistry};

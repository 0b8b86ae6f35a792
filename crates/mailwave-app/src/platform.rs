//! System integration for the replay host
//!
//! Only the system browser is real here. Window, download and frame
//! requests are recorded so a replay can report them.

use mailwave_core::types::{
    ContentWindowRequest, ContentsHandle, MailboxId, PopupWindowRequest, WindowId,
};
use mailwave_core::{MailwaveError, MailwaveResult};
use mailwave_shell::{HostRequest, RecordingHost, WindowHost};
use std::process::Command;
use tracing::debug;

/// Command that hands a URL to the platform's default browser
fn browser_command(url: &str) -> Command {
    #[cfg(target_os = "macos")]
    {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    }

    #[cfg(target_os = "windows")]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", url]);
        cmd
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}

/// Host that launches the system browser for external opens.
///
/// With `dry_run` set nothing is launched and every request is only recorded.
pub struct SystemHost {
    recorder: RecordingHost,
    dry_run: bool,
}

impl SystemHost {
    pub fn new(dry_run: bool) -> Self {
        Self {
            recorder: RecordingHost::new(),
            dry_run,
        }
    }

    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        self.recorder.take_requests()
    }
}

impl WindowHost for SystemHost {
    fn open_external(&mut self, url: &str, mailbox: Option<&MailboxId>) -> MailwaveResult<()> {
        if !self.dry_run {
            debug!("Opening external URL: {}", url);
            browser_command(url)
                .spawn()
                .map_err(|e| MailwaveError::host(format!("{}: {}", url, e)))?;
        }
        self.recorder.open_external(url, mailbox)
    }

    fn create_content_window(&mut self, request: ContentWindowRequest) -> MailwaveResult<WindowId> {
        self.recorder.create_content_window(request)
    }

    fn create_popup_window(&mut self, request: PopupWindowRequest) -> MailwaveResult<WindowId> {
        self.recorder.create_popup_window(request)
    }

    fn download(&mut self, contents: ContentsHandle, url: &str) -> MailwaveResult<()> {
        self.recorder.download(contents, url)
    }

    fn request_graceful_reload(&mut self) -> MailwaveResult<()> {
        self.recorder.request_graceful_reload()
    }

    fn load_frame(&mut self) -> MailwaveResult<()> {
        self.recorder.load_frame()
    }
}

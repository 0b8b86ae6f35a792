//! The embedding host as seen from the policy core
//!
//! Everything that touches real windows, the system browser, or the engine
//! goes through [`WindowHost`]. The core never performs I/O itself.

use mailwave_core::types::{
    ContentWindowRequest, ContentsHandle, MailboxId, PopupWindowRequest, WindowId,
};
use mailwave_core::{MailwaveError, MailwaveResult};
use serde::Serialize;

/// Operations the core asks the hosting shell to perform
pub trait WindowHost {
    /// Open a URL in the user's system browser
    ///
    /// `mailbox` is passed so the host can apply per-account opening
    /// preferences (e.g. open in background).
    fn open_external(&mut self, url: &str, mailbox: Option<&MailboxId>) -> MailwaveResult<()>;

    /// Create a managed content window and return its id
    fn create_content_window(&mut self, request: ContentWindowRequest) -> MailwaveResult<WindowId>;

    /// Create a popup window the engine can adopt as the new guest surface
    fn create_popup_window(&mut self, request: PopupWindowRequest) -> MailwaveResult<WindowId>;

    /// Start a download through the contents that raised the request
    fn download(&mut self, contents: ContentsHandle, url: &str) -> MailwaveResult<()>;

    /// Ask the shell frame to reload itself gracefully
    fn request_graceful_reload(&mut self) -> MailwaveResult<()>;

    /// Load the shell frame from scratch
    fn load_frame(&mut self) -> MailwaveResult<()>;
}

/// A request the core made of a [`RecordingHost`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostRequest {
    OpenExternal {
        url: String,
        mailbox: Option<MailboxId>,
    },
    ContentWindow {
        window_id: WindowId,
        #[serde(flatten)]
        request: ContentWindowRequest,
    },
    PopupWindow {
        window_id: WindowId,
        #[serde(flatten)]
        request: PopupWindowRequest,
    },
    Download {
        contents: ContentsHandle,
        url: String,
    },
    GracefulReload,
    LoadFrame,
}

/// Host that records every request instead of acting on it.
///
/// Used by the replay binary's dry-run mode and by tests.
#[derive(Debug, Default)]
pub struct RecordingHost {
    requests: Vec<HostRequest>,
    next_window_id: u64,
    fail_windows: bool,
    fail_external: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            next_window_id: 1,
            ..Self::default()
        }
    }

    /// Make window creation fail, to exercise fallbacks
    pub fn failing_windows(mut self) -> Self {
        self.fail_windows = true;
        self
    }

    /// Make the system browser opener fail
    pub fn failing_external(mut self) -> Self {
        self.fail_external = true;
        self
    }

    pub fn requests(&self) -> &[HostRequest] {
        &self.requests
    }

    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    /// URLs handed to the system browser, in order
    pub fn external_urls(&self) -> Vec<&str> {
        self.requests
            .iter()
            .filter_map(|request| match request {
                HostRequest::OpenExternal { url, .. } => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    fn allocate_window_id(&mut self) -> WindowId {
        let id = WindowId(self.next_window_id.max(1));
        self.next_window_id = id.0 + 1;
        id
    }
}

impl WindowHost for RecordingHost {
    fn open_external(&mut self, url: &str, mailbox: Option<&MailboxId>) -> MailwaveResult<()> {
        if self.fail_external {
            return Err(MailwaveError::host(format!("cannot open {}", url)));
        }
        self.requests.push(HostRequest::OpenExternal {
            url: url.to_string(),
            mailbox: mailbox.cloned(),
        });
        Ok(())
    }

    fn create_content_window(&mut self, request: ContentWindowRequest) -> MailwaveResult<WindowId> {
        if self.fail_windows {
            return Err(MailwaveError::host("content window creation disabled"));
        }
        let window_id = self.allocate_window_id();
        self.requests
            .push(HostRequest::ContentWindow { window_id, request });
        Ok(window_id)
    }

    fn create_popup_window(&mut self, request: PopupWindowRequest) -> MailwaveResult<WindowId> {
        if self.fail_windows {
            return Err(MailwaveError::host("popup window creation disabled"));
        }
        let window_id = self.allocate_window_id();
        self.requests.push(HostRequest::PopupWindow { window_id, request });
        Ok(window_id)
    }

    fn download(&mut self, contents: ContentsHandle, url: &str) -> MailwaveResult<()> {
        self.requests.push(HostRequest::Download {
            contents,
            url: url.to_string(),
        });
        Ok(())
    }

    fn request_graceful_reload(&mut self) -> MailwaveResult<()> {
        self.requests.push(HostRequest::GracefulReload);
        Ok(())
    }

    fn load_frame(&mut self) -> MailwaveResult<()> {
        self.requests.push(HostRequest::LoadFrame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailwave_core::types::{OwnerId, WebPreferences};
    use serde_json::{Map, Value};

    #[test]
    fn test_window_request_json_keeps_type_and_fields() {
        let mut host = RecordingHost::new();
        let owner: OwnerId = "acct1:mail".parse().unwrap();
        let window_id = host
            .create_content_window(ContentWindowRequest {
                owner_id: owner,
                url: "https://example.org/".to_string(),
                partition: Some("persist:acct1".to_string()),
                window_preferences: Map::new(),
                web_preferences: WebPreferences::default(),
            })
            .unwrap();
        assert_eq!(window_id, WindowId(1));

        let json: Value = serde_json::to_value(host.requests()).unwrap();
        assert_eq!(json[0]["type"], "content_window");
        assert_eq!(json[0]["window_id"], 1);
        assert_eq!(json[0]["ownerId"], "acct1:mail");
        assert_eq!(json[0]["partition"], "persist:acct1");
    }

    #[test]
    fn test_failing_windows_record_nothing() {
        let mut host = RecordingHost::new().failing_windows();
        let result = host.create_popup_window(PopupWindowRequest {
            owner_id: "acct1:mail".parse().unwrap(),
            url: "https://example.org/".to_string(),
            window_preferences: Map::new(),
            web_preferences: WebPreferences::default(),
        });
        assert!(result.is_err());
        assert!(host.requests().is_empty());
    }
}

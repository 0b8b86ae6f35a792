//! Common types used throughout Mailwave

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::MailwaveError;

/// Identifier of a mailbox (account)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MailboxId(pub String);

/// Service type tag within a mailbox, e.g. `mail`, `chat`, `boards`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceType(pub String);

/// Engine-assigned id of an embedded browsing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub u64);

/// Host-assigned id of a managed secondary window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

/// Opaque handle to the contents that raised a new-window event, used to
/// start downloads through the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentsHandle(pub u64);

/// Identifier of a bundled extension hosted in its own surface
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionId(pub String);

impl MailboxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ServiceType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MailboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// The (mailbox, service) pair a surface or managed window belongs to.
///
/// Serialized as `"{mailboxId}:{serviceType}"`. Mailbox ids may themselves
/// contain `:`, so parsing splits on the last separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId {
    pub mailbox_id: MailboxId,
    pub service_type: ServiceType,
}

impl OwnerId {
    pub fn new(mailbox_id: MailboxId, service_type: ServiceType) -> Self {
        Self {
            mailbox_id,
            service_type,
        }
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.mailbox_id, self.service_type)
    }
}

impl FromStr for OwnerId {
    type Err = MailwaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once(':') {
            Some((mailbox, service)) if !mailbox.is_empty() && !service.is_empty() => Ok(Self {
                mailbox_id: MailboxId::new(mailbox),
                service_type: ServiceType::new(service),
            }),
            _ => Err(MailwaveError::Config(format!("Invalid owner id: {}", s))),
        }
    }
}

impl Serialize for OwnerId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OwnerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How the engine wanted the new window to be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Disposition {
    #[default]
    Default,
    ForegroundTab,
    BackgroundTab,
    NewWindow,
    NewPopup,
    SaveToDisk,
    #[serde(other)]
    Other,
}

impl From<&str> for Disposition {
    fn from(value: &str) -> Self {
        match value {
            "default" => Disposition::Default,
            "foreground-tab" => Disposition::ForegroundTab,
            "background-tab" => Disposition::BackgroundTab,
            "new-window" => Disposition::NewWindow,
            "new-popup" => Disposition::NewPopup,
            "save-to-disk" => Disposition::SaveToDisk,
            _ => Disposition::Other,
        }
    }
}

/// What to do with a new-window request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowOpenMode {
    External,
    ExternalProvisional,
    Default,
    DefaultProvisional,
    Content,
    ContentProvisional,
    PopupContent,
    Download,
}

impl WindowOpenMode {
    /// True for the variants that open the provisional URL instead of the target
    pub fn is_provisional(self) -> bool {
        matches!(
            self,
            WindowOpenMode::ExternalProvisional
                | WindowOpenMode::DefaultProvisional
                | WindowOpenMode::ContentProvisional
        )
    }

    /// The variant that opens the literal target URL
    pub fn non_provisional(self) -> Self {
        match self {
            WindowOpenMode::ExternalProvisional => WindowOpenMode::External,
            WindowOpenMode::DefaultProvisional => WindowOpenMode::Default,
            WindowOpenMode::ContentProvisional => WindowOpenMode::Content,
            other => other,
        }
    }
}

/// What to do with an in-place navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavigateMode {
    #[default]
    Default,
    Suppress,
    OpenExternal,
    OpenContent,
}

/// Per-mailbox preference for links the service leaves up to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefaultWindowOpenMode {
    #[default]
    SystemBrowser,
    InApp,
}

/// Kind of managed secondary window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Content,
    Popup,
}

/// Page preferences passed through to new windows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebPreferences {
    /// Session partition, e.g. `persist:{mailboxId}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WebPreferences {
    pub fn with_partition(partition: impl Into<String>) -> Self {
        Self {
            partition: Some(partition.into()),
            extra: Map::new(),
        }
    }
}

/// Options the engine attached to a new-window request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowOptions {
    #[serde(default)]
    pub web_preferences: WebPreferences,

    #[serde(default)]
    pub window_preferences: Map<String, Value>,

    /// Contents that raised the request, if the engine exposed it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<ContentsHandle>,
}

impl WindowOptions {
    pub fn partition(&self) -> Option<&str> {
        self.web_preferences.partition.as_deref()
    }
}

/// A mailbox surface reported itself as attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceAttached {
    pub surface_id: SurfaceId,
    pub mailbox_id: MailboxId,
    pub service_type: ServiceType,
}

impl SurfaceAttached {
    pub fn owner_id(&self) -> OwnerId {
        OwnerId::new(self.mailbox_id.clone(), self.service_type.clone())
    }
}

/// An extension surface reported itself as attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionAttached {
    pub surface_id: SurfaceId,
    pub extension_id: ExtensionId,
}

/// New-window interception from an embedded surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWindowEvent {
    pub surface_id: SurfaceId,
    pub target_url: String,
    #[serde(default)]
    pub frame_name: String,
    #[serde(default)]
    pub disposition: Disposition,
    #[serde(default)]
    pub options: WindowOptions,
}

/// Will-navigate interception from an embedded surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WillNavigateEvent {
    pub surface_id: SurfaceId,
    pub target_url: String,
}

/// Frame-initiated request to open a content window for a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenWindowRequest {
    pub mailbox_id: MailboxId,
    pub service_type: ServiceType,
    pub url: String,
    #[serde(default)]
    pub partition: Option<String>,
    #[serde(default)]
    pub window_preferences: Map<String, Value>,
    #[serde(default)]
    pub web_preferences: WebPreferences,
}

/// Request to the host to create a managed content window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentWindowRequest {
    pub owner_id: OwnerId,
    pub url: String,
    pub partition: Option<String>,
    pub window_preferences: Map<String, Value>,
    pub web_preferences: WebPreferences,
}

/// Request to the host to create a popup window usable as a guest surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupWindowRequest {
    pub owner_id: OwnerId,
    pub url: String,
    pub window_preferences: Map<String, Value>,
    pub web_preferences: WebPreferences,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_id_roundtrip_string() {
        let owner = OwnerId::new(MailboxId::new("acct1"), ServiceType::new("mail"));
        assert_eq!(owner.to_string(), "acct1:mail");
        assert_eq!("acct1:mail".parse::<OwnerId>().unwrap(), owner);
    }

    #[test]
    fn test_owner_id_splits_on_last_colon() {
        let owner: OwnerId = "urn:acct:7:chat".parse().unwrap();
        assert_eq!(owner.mailbox_id.as_str(), "urn:acct:7");
        assert_eq!(owner.service_type.as_str(), "chat");
        assert!("nocolon".parse::<OwnerId>().is_err());
        assert!(":mail".parse::<OwnerId>().is_err());
    }

    #[test]
    fn test_unknown_disposition_is_other() {
        let d: Disposition = serde_json::from_str("\"offscreen\"").unwrap();
        assert_eq!(d, Disposition::Other);
        assert_eq!(Disposition::from("new-window"), Disposition::NewWindow);
    }

    #[test]
    fn test_provisional_siblings() {
        assert_eq!(
            WindowOpenMode::DefaultProvisional.non_provisional(),
            WindowOpenMode::Default
        );
        assert_eq!(
            WindowOpenMode::PopupContent.non_provisional(),
            WindowOpenMode::PopupContent
        );
        assert!(WindowOpenMode::ContentProvisional.is_provisional());
        assert!(!WindowOpenMode::Download.is_provisional());
    }

    #[test]
    fn test_window_options_partition_from_json() {
        let options: WindowOptions = serde_json::from_str(
            r#"{"webPreferences":{"partition":"persist:acct1","nodeIntegration":false}}"#,
        )
        .unwrap();
        assert_eq!(options.partition(), Some("persist:acct1"));
        assert!(options.web_preferences.extra.contains_key("nodeIntegration"));
        assert!(options.contents.is_none());
    }
}

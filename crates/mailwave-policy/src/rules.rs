//! Built-in policy strategies, one per service kind

use crate::UrlRef;
use mailwave_core::types::{Disposition, NavigateMode, WindowOpenMode};
use serde::{Deserialize, Serialize};
use url::Url;

/// Closed set of policy strategies a service can be configured with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServicePolicyKind {
    #[default]
    Generic,
    Mail,
    Chat,
    Boards,
}

impl ServicePolicyKind {
    pub fn window_open_mode(
        self,
        home: &Url,
        target: UrlRef<'_>,
        disposition: Disposition,
        provisional: Option<UrlRef<'_>>,
    ) -> WindowOpenMode {
        let mode = match self {
            ServicePolicyKind::Generic => None,
            ServicePolicyKind::Mail => mail_window_open_mode(home, target, provisional),
            ServicePolicyKind::Chat => chat_window_open_mode(home, target, provisional),
            ServicePolicyKind::Boards => boards_window_open_mode(home, target),
        };
        mode.unwrap_or_else(|| generic_window_open_mode(target, disposition, provisional))
    }

    pub fn navigate_mode(self, home: &Url, target: UrlRef<'_>) -> NavigateMode {
        let leaves_service =
            is_web(target.parsed) && !same_site(target.parsed, home) && !is_auth_url(target.parsed);

        match self {
            ServicePolicyKind::Generic => NavigateMode::Default,
            ServicePolicyKind::Mail | ServicePolicyKind::Chat if leaves_service => {
                NavigateMode::OpenExternal
            }
            ServicePolicyKind::Boards if leaves_service => NavigateMode::OpenContent,
            _ => NavigateMode::Default,
        }
    }
}

fn generic_window_open_mode(
    target: UrlRef<'_>,
    disposition: Disposition,
    provisional: Option<UrlRef<'_>>,
) -> WindowOpenMode {
    if disposition == Disposition::SaveToDisk {
        return WindowOpenMode::Download;
    }

    if is_blank(target.raw) {
        // Script-opened blank windows either redirect to the announced URL or
        // need a real guest to write into.
        return match provisional {
            Some(p) if is_web(p.parsed) => WindowOpenMode::DefaultProvisional,
            _ => WindowOpenMode::PopupContent,
        };
    }

    WindowOpenMode::Default
}

fn mail_window_open_mode(
    home: &Url,
    target: UrlRef<'_>,
    provisional: Option<UrlRef<'_>>,
) -> Option<WindowOpenMode> {
    let url = target.parsed;

    if url.path() == "/url" && query_value(url, "q").is_some() {
        return Some(redirect_wrapper_mode(provisional));
    }

    if same_site(url, home) {
        match query_value(url, "view").as_deref() {
            Some("att") => {
                if matches!(query_value(url, "disp").as_deref(), Some("safe") | Some("attd")) {
                    return Some(WindowOpenMode::Download);
                }
            }
            Some("pt") | Some("cm") => return Some(WindowOpenMode::Content),
            _ => {}
        }
    }

    if is_auth_url(url) {
        return Some(WindowOpenMode::PopupContent);
    }

    None
}

fn chat_window_open_mode(
    home: &Url,
    target: UrlRef<'_>,
    provisional: Option<UrlRef<'_>>,
) -> Option<WindowOpenMode> {
    let url = target.parsed;
    let host = url.host_str().unwrap_or("");

    if host == "slack-redir.net" {
        return Some(redirect_wrapper_mode(provisional));
    }

    if same_site(url, home) {
        if host.starts_with("files.") && url.path().contains("/download/") {
            return Some(WindowOpenMode::Download);
        }
        if url.path().contains("/call/") {
            return Some(WindowOpenMode::PopupContent);
        }
    }

    None
}

fn boards_window_open_mode(home: &Url, target: UrlRef<'_>) -> Option<WindowOpenMode> {
    if is_web(target.parsed) && same_site(target.parsed, home) {
        Some(WindowOpenMode::Content)
    } else {
        None
    }
}

/// Redirect wrappers hide the destination; the hovered link usually shows it
fn redirect_wrapper_mode(provisional: Option<UrlRef<'_>>) -> WindowOpenMode {
    match provisional {
        Some(p) if is_web(p.parsed) => WindowOpenMode::ExternalProvisional,
        _ => WindowOpenMode::External,
    }
}

fn is_blank(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("about:blank")
}

fn is_web(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn is_auth_url(url: &Url) -> bool {
    let host = url.host_str().unwrap_or("");
    host.starts_with("accounts.")
        || host.starts_with("login.")
        || host.starts_with("auth.")
        || url.path().contains("/oauth")
}

/// Last two host labels, good enough to group `mail.example.com` with
/// `accounts.example.com`
fn site_of(host: &str) -> &str {
    let mut dots = host.rmatch_indices('.');
    match (dots.next(), dots.next()) {
        (Some(_), Some((idx, _))) => &host[idx + 1..],
        _ => host,
    }
}

fn same_site(url: &Url, home: &Url) -> bool {
    match (url.host_str(), home.host_str()) {
        (Some(a), Some(b)) => site_of(a).eq_ignore_ascii_case(site_of(b)),
        _ => false,
    }
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn open(
        kind: ServicePolicyKind,
        home: &str,
        target: &str,
        disposition: Disposition,
        provisional: Option<&str>,
    ) -> WindowOpenMode {
        let home = url(home);
        let parsed = url(target);
        let parsed_provisional = provisional.map(url);
        let provisional_ref = match (provisional, parsed_provisional.as_ref()) {
            (Some(raw), Some(parsed)) => Some(UrlRef::new(raw, parsed)),
            _ => None,
        };
        kind.window_open_mode(
            &home,
            UrlRef::new(target, &parsed),
            disposition,
            provisional_ref,
        )
    }

    fn navigate(kind: ServicePolicyKind, home: &str, target: &str) -> NavigateMode {
        let home = url(home);
        let parsed = url(target);
        kind.navigate_mode(&home, UrlRef::new(target, &parsed))
    }

    #[test]
    fn test_site_of() {
        assert_eq!(site_of("mail.google.com"), "google.com");
        assert_eq!(site_of("google.com"), "google.com");
        assert_eq!(site_of("localhost"), "localhost");
    }

    #[test]
    fn test_generic_blank_window() {
        let home = "https://example.com/";
        assert_eq!(
            open(
                ServicePolicyKind::Generic,
                home,
                "about:blank",
                Disposition::NewWindow,
                Some("https://accounts.example.com/oauth/redirect?state=1"),
            ),
            WindowOpenMode::DefaultProvisional
        );
        assert_eq!(
            open(ServicePolicyKind::Generic, home, "about:blank", Disposition::NewWindow, None),
            WindowOpenMode::PopupContent
        );
        assert_eq!(
            open(
                ServicePolicyKind::Generic,
                home,
                "https://other.org/",
                Disposition::ForegroundTab,
                None,
            ),
            WindowOpenMode::Default
        );
        assert_eq!(
            open(
                ServicePolicyKind::Generic,
                home,
                "https://other.org/file.zip",
                Disposition::SaveToDisk,
                None,
            ),
            WindowOpenMode::Download
        );
    }

    #[test]
    fn test_mail_rules() {
        let home = "https://mail.google.com/mail/";
        assert_eq!(
            open(
                ServicePolicyKind::Mail,
                home,
                "https://mail.google.com/mail/u/0/?ui=2&view=att&disp=safe&th=1",
                Disposition::ForegroundTab,
                None,
            ),
            WindowOpenMode::Download
        );
        assert_eq!(
            open(
                ServicePolicyKind::Mail,
                home,
                "https://mail.google.com/mail/u/0/?ui=2&view=pt&th=1",
                Disposition::NewWindow,
                None,
            ),
            WindowOpenMode::Content
        );
        assert_eq!(
            open(
                ServicePolicyKind::Mail,
                home,
                "https://accounts.google.com/signin",
                Disposition::NewPopup,
                None,
            ),
            WindowOpenMode::PopupContent
        );
        assert_eq!(
            open(
                ServicePolicyKind::Mail,
                home,
                "https://www.google.com/url?q=https://rust-lang.org",
                Disposition::ForegroundTab,
                Some("https://rust-lang.org/"),
            ),
            WindowOpenMode::ExternalProvisional
        );
        assert_eq!(
            open(
                ServicePolicyKind::Mail,
                home,
                "https://www.google.com/url?q=https://rust-lang.org",
                Disposition::ForegroundTab,
                None,
            ),
            WindowOpenMode::External
        );
        assert_eq!(
            open(
                ServicePolicyKind::Mail,
                home,
                "https://rust-lang.org/",
                Disposition::ForegroundTab,
                None,
            ),
            WindowOpenMode::Default
        );
    }

    #[test]
    fn test_chat_rules() {
        let home = "https://team.slack.com/";
        assert_eq!(
            open(
                ServicePolicyKind::Chat,
                home,
                "https://app.slack.com/call/T1/C2",
                Disposition::NewWindow,
                None,
            ),
            WindowOpenMode::PopupContent
        );
        assert_eq!(
            open(
                ServicePolicyKind::Chat,
                home,
                "https://files.slack.com/files-pri/T1-F2/download/report.pdf",
                Disposition::ForegroundTab,
                None,
            ),
            WindowOpenMode::Download
        );
        assert_eq!(
            open(
                ServicePolicyKind::Chat,
                home,
                "https://slack-redir.net/link?url=https%3A%2F%2Fexample.org",
                Disposition::ForegroundTab,
                Some("https://example.org/"),
            ),
            WindowOpenMode::ExternalProvisional
        );
    }

    #[test]
    fn test_boards_rules() {
        let home = "https://trello.com/";
        assert_eq!(
            open(
                ServicePolicyKind::Boards,
                home,
                "https://trello.com/c/abc123",
                Disposition::ForegroundTab,
                None,
            ),
            WindowOpenMode::Content
        );
        assert_eq!(
            navigate(ServicePolicyKind::Boards, home, "https://example.org/doc"),
            NavigateMode::OpenContent
        );
        assert_eq!(
            navigate(ServicePolicyKind::Boards, home, "https://trello.com/b/xyz"),
            NavigateMode::Default
        );
    }

    #[test]
    fn test_navigate_leaving_service() {
        let home = "https://mail.google.com/";
        assert_eq!(
            navigate(ServicePolicyKind::Mail, home, "https://rust-lang.org/"),
            NavigateMode::OpenExternal
        );
        assert_eq!(
            navigate(ServicePolicyKind::Mail, home, "https://login.microsoftonline.com/x"),
            NavigateMode::Default
        );
        assert_eq!(
            navigate(ServicePolicyKind::Chat, home, "mailto:someone@example.org"),
            NavigateMode::Default
        );
        assert_eq!(
            navigate(ServicePolicyKind::Generic, home, "https://rust-lang.org/"),
            NavigateMode::Default
        );
    }
}

//! Replays a recorded event script against a mailboxes window
//!
//! Time is virtual: each step advances the clock by its `delayMs`, and the
//! reload fallback is polled against that clock before every step.

use crate::platform::SystemHost;
use mailwave_core::MailwaveResult;
use mailwave_policy::PolicyLookup;
use mailwave_shell::{EventOutcome, HostRequest, MailboxesWindow, ShellEvent};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptStep {
    /// Milliseconds to wait after the previous step
    #[serde(default)]
    pub delay_ms: u64,

    #[serde(flatten)]
    pub event: ShellEvent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn from_json(json: &str) -> MailwaveResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> MailwaveResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// What happened for one step
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    /// None for the trailing reload check after the last step
    pub step: Option<usize>,
    pub at_ms: u64,
    /// The frame reload fallback fired before this step ran
    pub forced_reload: bool,
    pub outcome: EventOutcome,
    pub host_requests: Vec<HostRequest>,
}

pub fn replay(
    window: &mut MailboxesWindow,
    accounts: &dyn PolicyLookup,
    host: &mut SystemHost,
    script: &Script,
) -> Vec<StepReport> {
    let start = Instant::now();
    let mut elapsed = Duration::ZERO;
    let mut reports = Vec::with_capacity(script.steps.len());

    for (index, step) in script.steps.iter().enumerate() {
        elapsed += Duration::from_millis(step.delay_ms);
        let now = start + elapsed;

        let forced_reload = window.poll(host, now);
        let outcome = window.handle_event(step.event.clone(), accounts, host, now);

        reports.push(StepReport {
            step: Some(index),
            at_ms: elapsed.as_millis() as u64,
            forced_reload,
            outcome,
            host_requests: host.take_requests(),
        });
    }

    // Let a pending fallback run out
    if let Some(deadline) = window.reload().deadline() {
        let now = deadline.max(start + elapsed);
        if window.poll(host, now) {
            reports.push(StepReport {
                step: None,
                at_ms: now.duration_since(start).as_millis() as u64,
                forced_reload: true,
                outcome: EventOutcome::Reload { forced: true },
                host_requests: host.take_requests(),
            });
        }
    }

    window.destroy();
    reports
}

//! Managed secondary windows and their owners

use mailwave_core::types::{OwnerId, WindowId, WindowKind};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedWindow {
    pub window_id: WindowId,
    pub owner_id: OwnerId,
    pub kind: WindowKind,
}

/// Tracks which owner each managed window belongs to.
///
/// The host owns the windows themselves; this only answers ownership and
/// count queries.
#[derive(Debug, Default)]
pub struct ManagedWindowRegistry {
    windows: HashMap<WindowId, ManagedWindow>,
}

impl ManagedWindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, window_id: WindowId, owner_id: OwnerId, kind: WindowKind) {
        log::info!("Managed {:?} window {} opened for {}", kind, window_id, owner_id);
        self.windows.insert(
            window_id,
            ManagedWindow {
                window_id,
                owner_id,
                kind,
            },
        );
    }

    /// Forget a window the host has closed
    pub fn remove(&mut self, window_id: WindowId) -> Option<ManagedWindow> {
        let removed = self.windows.remove(&window_id);
        if let Some(window) = &removed {
            log::info!("Managed window {} closed for {}", window_id, window.owner_id);
        }
        removed
    }

    pub fn get(&self, window_id: WindowId) -> Option<&ManagedWindow> {
        self.windows.get(&window_id)
    }

    pub fn count_by_owner(&self, owner_id: &OwnerId) -> usize {
        self.windows
            .values()
            .filter(|window| &window.owner_id == owner_id)
            .count()
    }

    pub fn windows_for_owner(&self, owner_id: &OwnerId) -> Vec<&ManagedWindow> {
        let mut windows: Vec<&ManagedWindow> = self
            .windows
            .values()
            .filter(|window| &window.owner_id == owner_id)
            .collect();
        windows.sort_by_key(|window| window.window_id);
        windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

//! Registry of embedded surfaces attached to the mailboxes window

use mailwave_core::types::{ExtensionId, OwnerId, SurfaceId};
use std::collections::HashMap;

/// Maps surface ids to the service (or extension) they host.
///
/// Entries live as long as the owning window; there is no eviction.
#[derive(Debug, Default)]
pub struct AttachedSurfaceRegistry {
    mailboxes: HashMap<SurfaceId, OwnerId>,
    extensions: HashMap<SurfaceId, ExtensionId>,
}

impl AttachedSurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the owner of a mailbox surface. Re-attaching overwrites.
    pub fn attach(&mut self, surface_id: SurfaceId, owner_id: OwnerId) {
        log::debug!("Surface {} attached for {}", surface_id, owner_id);
        if let Some(previous) = self.mailboxes.insert(surface_id, owner_id) {
            log::debug!("Surface {} was previously attached for {}", surface_id, previous);
        }
    }

    pub fn attach_extension(&mut self, surface_id: SurfaceId, extension_id: ExtensionId) {
        log::debug!("Extension surface {} attached ({})", surface_id, extension_id.0);
        self.extensions.insert(surface_id, extension_id);
    }

    pub fn lookup(&self, surface_id: SurfaceId) -> Option<&OwnerId> {
        self.mailboxes.get(&surface_id)
    }

    pub fn is_known(&self, surface_id: SurfaceId) -> bool {
        self.mailboxes.contains_key(&surface_id)
    }

    pub fn extension(&self, surface_id: SurfaceId) -> Option<&ExtensionId> {
        self.extensions.get(&surface_id)
    }

    pub fn is_extension(&self, surface_id: SurfaceId) -> bool {
        self.extensions.contains_key(&surface_id)
    }

    /// Number of attached mailbox surfaces
    pub fn len(&self) -> usize {
        self.mailboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mailboxes.is_empty()
    }
}

//! Side-effect boundary between a session and its host.
//!
//! The core never saves or animates anything itself. It calls
//! [`SessionHooks`] at the checkpoints where the host must act.

use crate::id::DeliveryId;

/// Why the session asked for an immediate save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveReason {
    OnetimeSpawn,
    OnetimeCompleted,
    JobUnlock,
    ChapterTransition,
    InterludeDequeue,
}

/// Host callbacks. Both methods default to no-ops.
pub trait SessionHooks {
    /// Persist the current state now.
    fn save_now(&mut self, _reason: SaveReason) {}

    /// Play the click animation for an offer.
    fn shake(&mut self, _offer: DeliveryId) {}
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl SessionHooks for NoopHooks {}

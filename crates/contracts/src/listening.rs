//! ListeningType - event subscription mask

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Event categories a listener can subscribe to.
    ///
    /// Flags are bit-disjoint and combine with `|`. An empty mask is valid:
    /// such a listener receives no messages, only fault notifications.
    ///
    /// Serializes as a flag-name string (e.g. `"OUTPUT_MESSAGE | POINT_RESULT"`)
    /// so blueprints can state subscriptions declaratively.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ListeningType: u32 {
        /// Raw output messages (object stream, zone events, health reports).
        const OUTPUT_MESSAGE = 1 << 0;

        /// Derived point results (classified point clouds).
        const POINT_RESULT = 1 << 1;
    }
}

//! Tag presence tracking.
//!
//! The transport reports a plain level ("a tag answers right now"). The
//! tracker turns that level into edges so an action fires once per physical
//! placement:
//!
//! ```text
//! last \ current   false     true
//! false            Absent    Arrived
//! true             Removed   Present
//! ```
//!
//! A [`TriggerPolicy`] then decides whether an edge is allowed to trigger
//! the read or write path.

use crate::transport::TagUid;

/// Presence transition observed on one poll tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// A tag was just placed on the reader.
    Arrived,
    /// The same placement is still on the reader.
    Present,
    /// The tag was just taken away.
    Removed,
    /// Nothing on the reader.
    Absent,
}

/// Edge detector over the raw presence level.
#[derive(Clone, Debug, Default)]
pub struct PresenceTracker {
    last_present: bool,
}

impl PresenceTracker {
    /// Tracker starting from "no tag".
    pub const fn new() -> Self {
        Self {
            last_present: false,
        }
    }

    /// Classify the current level against the previous one and remember it.
    pub fn poll_edge(&mut self, current_present: bool) -> Edge {
        let edge = match (self.last_present, current_present) {
            (false, true) => Edge::Arrived,
            (true, true) => Edge::Present,
            (true, false) => Edge::Removed,
            (false, false) => Edge::Absent,
        };
        self.last_present = current_present;
        edge
    }

    /// Level seen on the last poll.
    pub fn is_present(&self) -> bool {
        self.last_present
    }
}

/// Decides whether a classified edge may start a tag action.
pub trait TriggerPolicy {
    /// `uid` is the tag's UID when the transport could report one,
    /// `now_ms` a monotonic timestamp.
    fn should_trigger(&mut self, edge: Edge, uid: Option<&TagUid>, now_ms: u64) -> bool;
}

/// Plain edge detection: every arrival triggers.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeTrigger;

impl TriggerPolicy for EdgeTrigger {
    fn should_trigger(&mut self, edge: Edge, _uid: Option<&TagUid>, _now_ms: u64) -> bool {
        edge == Edge::Arrived
    }
}

/// Edge detection plus suppression of a quick re-place of the same tag.
///
/// An arrival of the UID that last triggered is ignored until `window_ms`
/// has elapsed since that trigger. A different UID, or an arrival whose UID
/// is unknown, always triggers.
#[derive(Clone, Debug)]
pub struct UidDebounce {
    window_ms: u64,
    last: Option<(TagUid, u64)>,
}

impl UidDebounce {
    pub const fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last: None,
        }
    }
}

impl TriggerPolicy for UidDebounce {
    fn should_trigger(&mut self, edge: Edge, uid: Option<&TagUid>, now_ms: u64) -> bool {
        if edge != Edge::Arrived {
            return false;
        }

        let Some(uid) = uid else {
            return true;
        };

        if let Some((last_uid, at)) = &self.last {
            if last_uid == uid && now_ms.saturating_sub(*at) < self.window_ms {
                return false;
            }
        }

        self.last = Some((uid.clone(), now_ms));
        true
    }
}

//! Two-Slot History Buffer for Per-Stream Detections
//!
//! ## Overview
//!
//! Forecasting only ever looks at the two most recent observations of a
//! stream, so the history is a ring of exactly two slots:
//!
//! ```text
//! ┌──────────┬──────────┐
//! │ slot 0   │ slot 1   │
//! │ (older)  │ (newer)  │
//! └──────────┴──────────┘
//! ```
//!
//! ### Push
//!
//! A push swaps the slots, which moves the previous newest event into
//! slot 0, and then overwrites slot 1 with the incoming event:
//!
//! ```text
//! [A, B] --swap--> [B, A] --write--> [B, C]
//! ```
//!
//! Ordering is by arrival, not by timestamp. A late event still becomes the
//! newest observation; the buffer holds the two most recently *pushed*
//! events.
//!
//! All operations are O(1) and never allocate.
//!
//! ## Usage Example
//!
//! ```rust
//! use tracecast_core::buffer::HistoryBuffer;
//! use tracecast_core::events::{EventRecord, Location};
//!
//! let mut history = HistoryBuffer::new();
//! history.push(EventRecord::new(1, Location::new(0.0, 0.0), 0.0).unwrap());
//! history.push(EventRecord::new(1, Location::new(10.0, 0.0), 10.0).unwrap());
//!
//! assert_eq!(history.oldest().map(|e| e.time()), Some(0.0));
//! assert_eq!(history.newest().map(|e| e.time()), Some(10.0));
//! assert_eq!(history.elapsed(), Some(10.0));
//! ```

use crate::constants::{EMPTY_SLOT_TIME, HISTORY_SLOTS};
use crate::events::EventRecord;
use crate::time::ModelTime;

const OLDEST: usize = 0;
const NEWEST: usize = 1;

/// Fixed two-slot history of detections
///
/// ## Internal Invariants
///
/// - `len <= 2`
/// - `len == 1` implies only slot 1 is occupied
/// - `len == 2` implies slot 1 holds the last pushed event and slot 0 the
///   one pushed before it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryBuffer {
    slots: [Option<EventRecord>; HISTORY_SLOTS],
    len: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            slots: [None; HISTORY_SLOTS],
            len: 0,
        }
    }

    /// Record an event as the newest observation
    pub fn push(&mut self, event: EventRecord) {
        self.slots.swap(OLDEST, NEWEST);
        self.slots[NEWEST] = Some(event);

        if self.len < HISTORY_SLOTS {
            self.len += 1;
        }
    }

    /// Exchange the two observations
    ///
    /// No-op until both slots are filled, so a lone observation always
    /// stays the newest.
    pub fn swap(&mut self) {
        if self.is_full() {
            self.slots.swap(OLDEST, NEWEST);
        }
    }

    /// Older of the two observations
    pub fn oldest(&self) -> Option<&EventRecord> {
        self.slots[OLDEST].as_ref()
    }

    /// Most recent observation
    pub fn newest(&self) -> Option<&EventRecord> {
        self.slots[NEWEST].as_ref()
    }

    /// Both observations, oldest first, once two have been pushed
    pub fn pair(&self) -> Option<(&EventRecord, &EventRecord)> {
        Some((self.oldest()?, self.newest()?))
    }

    /// `newest.time - oldest.time`, if both slots are filled
    ///
    /// Negative when the newest event arrived late.
    pub fn elapsed(&self) -> Option<ModelTime> {
        self.pair().map(|(oldest, newest)| newest.time() - oldest.time())
    }

    /// Slot times, oldest first, with `EMPTY_SLOT_TIME` for empty slots
    pub fn times(&self) -> [ModelTime; HISTORY_SLOTS] {
        self.slots
            .map(|slot| slot.map_or(EMPTY_SLOT_TIME, |event| event.time()))
    }

    /// Number of stored observations
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if nothing has been pushed
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if both slots are filled
    pub fn is_full(&self) -> bool {
        self.len == HISTORY_SLOTS
    }

    /// Iterate over observations from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.slots.iter().flatten()
    }

    /// Drop both observations
    pub fn clear(&mut self) {
        self.slots = [None; HISTORY_SLOTS];
        self.len = 0;
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

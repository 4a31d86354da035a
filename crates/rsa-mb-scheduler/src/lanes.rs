//! Fixed-width lane array for one batch

use rsa_mb_core::LANES;

/// One lane of a batch
#[derive(Debug)]
pub enum Slot<K> {
    /// Admitted request (index into the stage's request slice) and its
    /// materialized key state
    Live { request: usize, key: K },
    /// Unused lane; dispatched with null operand, result and key
    Padding,
}

impl<K> Slot<K> {
    pub fn is_live(&self) -> bool {
        matches!(self, Slot::Live { .. })
    }
}

/// Lanes `[0, live)` are admitted requests, lanes `[live, LANES)` are padding
///
/// Key states are owned by their slot and dropped when the array is
/// cleared, so every flushed batch releases exactly the key states it
/// materialized.
#[derive(Debug)]
pub struct LaneArray<K> {
    slots: [Slot<K>; LANES],
    live: usize,
}

impl<K> LaneArray<K> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot::Padding),
            live: 0,
        }
    }

    /// Number of admitted lanes
    pub fn live(&self) -> usize {
        self.live
    }

    pub fn padding(&self) -> usize {
        LANES - self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn is_full(&self) -> bool {
        self.live == LANES
    }

    /// Admit a request into the next free lane
    ///
    /// The caller drains the array before it fills past `LANES`.
    pub fn push(&mut self, request: usize, key: K) {
        debug_assert!(!self.is_full(), "lane array overflow");
        self.slots[self.live] = Slot::Live { request, key };
        self.live += 1;
    }

    /// Most recently admitted lane: its request index and key state
    pub fn last_live(&self) -> Option<(usize, &K)> {
        let last = self.live.checked_sub(1)?;
        match &self.slots[last] {
            Slot::Live { request, key } => Some((*request, key)),
            Slot::Padding => None,
        }
    }

    /// Reset every lane at or past the live count to padding
    ///
    /// Returns the live count, i.e. the number of real lanes the backend
    /// will see in this batch.
    pub fn seal(&mut self) -> usize {
        for slot in &mut self.slots[self.live..] {
            *slot = Slot::Padding;
        }
        self.live
    }

    /// Per-lane key references, `None` for padding
    pub fn key_refs(&self) -> [Option<&K>; LANES] {
        std::array::from_fn(|lane| match &self.slots[lane] {
            Slot::Live { key, .. } => Some(key),
            Slot::Padding => None,
        })
    }

    /// Per-lane request indices, `None` for padding
    pub fn request_indices(&self) -> [Option<usize>; LANES] {
        std::array::from_fn(|lane| match &self.slots[lane] {
            Slot::Live { request, .. } => Some(*request),
            Slot::Padding => None,
        })
    }

    pub fn slots(&self) -> &[Slot<K>; LANES] {
        &self.slots
    }

    /// Drop every key state and return to an empty batch
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Padding;
        }
        self.live = 0;
    }
}

impl<K> Default for LaneArray<K> {
    fn default() -> Self {
        Self::new()
    }
}

//! Slot usage statistics for debugging and monitoring

/// Arena slot statistics.
///
/// `allocs` and `frees` only ever grow, so `allocs - frees` is the number of
/// live tasks and a mismatch with the queue's count points at a leak or a
/// double release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotStats {
    /// Total number of slots in the arena
    pub total_slots: usize,
    /// Number of slots currently free
    pub free_slots: usize,
    /// Number of slots currently holding a pending task
    pub used_slots: usize,
    /// Minimum number of free slots ever reached
    pub min_free_slots: usize,
    /// Slots handed out since creation
    pub allocs: u32,
    /// Slots released since creation
    pub frees: u32,
}

impl SlotStats {
    /// Create new slot statistics
    pub const fn new(total_slots: usize) -> Self {
        Self {
            total_slots,
            free_slots: total_slots,
            used_slots: 0,
            min_free_slots: total_slots,
            allocs: 0,
            frees: 0,
        }
    }

    /// Update statistics after a slot is taken
    pub fn on_alloc(&mut self) {
        self.used_slots += 1;
        self.free_slots -= 1;
        self.allocs = self.allocs.wrapping_add(1);
        if self.free_slots < self.min_free_slots {
            self.min_free_slots = self.free_slots;
        }
    }

    /// Update statistics after a slot is released
    pub fn on_dealloc(&mut self) {
        debug_assert!(self.used_slots > 0, "slot released twice");
        if self.used_slots > 0 {
            self.used_slots -= 1;
            self.free_slots += 1;
            self.frees = self.frees.wrapping_add(1);
        }
    }

    /// Slots handed out and not yet released
    pub const fn live(&self) -> u32 {
        self.allocs.wrapping_sub(self.frees)
    }

    /// Peak number of slots in use at once
    pub const fn high_water(&self) -> usize {
        self.total_slots - self.min_free_slots
    }

    /// Get utilization as a percentage (0-100)
    pub fn utilization(&self) -> u8 {
        if self.total_slots == 0 {
            0
        } else {
            ((self.used_slots * 100) / self.total_slots) as u8
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SlotStats {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "SlotStats{{ total: {}, free: {}, used: {}, min_free: {} }}",
            self.total_slots,
            self.free_slots,
            self.used_slots,
            self.min_free_slots
        );
    }
}

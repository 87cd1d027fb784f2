//! Debounce registry for decoded DTCs: two fixed-capacity, insertion-ordered
//! lists tracking the candidate → active lifecycle.
//!
//! A code enters as a candidate on first sighting, is promoted to active
//! once observed `threshold_reads` times within `window_active` seconds,
//! and leaves the active list after `window_inactive` seconds of silence.
//! A key lives in at most one of the two lists at any instant.
use crate::core::{Dtc, DtcKey, DtcRecord, FilterConfig};

//==================================================================================Constants

/// Maximum number of candidate DTCs awaiting promotion.
pub const MAX_CANDIDATE_DTCS: usize = 40;

/// Maximum number of active DTCs tracked at once.
pub const MAX_ACTIVE_DTCS: usize = 20;

//==================================================================================Registry

/// Owns the candidate and active lists plus the change flag the tick
/// publishes through. Both lists are plain arrays with left-shift removal:
/// iteration and publication preserve insertion order, which observers rely
/// on.
#[derive(Debug, Clone, Copy)]
pub struct DtcRegistry {
    candidates: [DtcRecord; MAX_CANDIDATE_DTCS],
    candidate_count: usize,
    active: [DtcRecord; MAX_ACTIVE_DTCS],
    active_count: usize,
    changed: bool,
}

impl Default for DtcRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DtcRegistry {
    /// Instantiate an empty registry.
    pub const fn new() -> Self {
        Self {
            candidates: [DtcRecord::EMPTY; MAX_CANDIDATE_DTCS],
            candidate_count: 0,
            active: [DtcRecord::EMPTY; MAX_ACTIVE_DTCS],
            active_count: 0,
            changed: false,
        }
    }

    //==================================================================================Mutators

    /// Record one observation of a decoded DTC at time `now`.
    ///
    /// An active hit refreshes lamps, occurrence counter, and `last_seen`.
    /// A candidate hit additionally counts the read. A miss appends a new
    /// candidate (dropped when the list is full). Every observation ends
    /// with a promotion pass so a code crossing the threshold activates on
    /// the frame that pushed it over.
    pub fn observe(&mut self, dtc: Dtc, now: u32, config: &FilterConfig) {
        if let Some(record) = Self::find(&mut self.active[..self.active_count], &dtc.key) {
            record.dtc.oc = dtc.oc;
            record.dtc.lamps = dtc.lamps;
            record.last_seen = now;
        } else if let Some(record) =
            Self::find(&mut self.candidates[..self.candidate_count], &dtc.key)
        {
            record.dtc.oc = dtc.oc;
            record.dtc.lamps = dtc.lamps;
            record.last_seen = now;
            record.read_count = record.read_count.saturating_add(1);
        } else if self.candidate_count < MAX_CANDIDATE_DTCS {
            self.candidates[self.candidate_count] = DtcRecord {
                dtc,
                first_seen: now,
                last_seen: now,
                read_count: 1,
            };
            self.candidate_count += 1;
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Candidate list full ({}), dropping SPN {}",
                MAX_CANDIDATE_DTCS,
                dtc.key.spn
            );
        }

        self.promote(now, config);
    }

    /// Move every candidate that crossed the read threshold while still
    /// inside the active window over to the active list. When the active
    /// list is full the move is declined and the candidate stays put.
    fn promote(&mut self, now: u32, config: &FilterConfig) {
        let mut i = 0;
        while i < self.candidate_count {
            let record = &self.candidates[i];
            let within_window = now.wrapping_sub(record.first_seen) <= config.window_active;
            let enough_reads = u32::from(record.read_count) >= config.threshold_reads;

            if within_window && enough_reads {
                if self.active_count < MAX_ACTIVE_DTCS {
                    self.active[self.active_count] = self.candidates[i];
                    self.active_count += 1;
                    self.changed = true;
                    Self::remove_at(&mut self.candidates, &mut self.candidate_count, i);
                    continue; // the shifted element now sits at index i
                }
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "Active list full ({}), SPN {} stays candidate",
                    MAX_ACTIVE_DTCS,
                    record.dtc.key.spn
                );
            }
            i += 1;
        }
    }

    /// Age out stale entries at time `now`. Invoked from the periodic tick.
    ///
    /// Candidates that outlived the active window vanish silently; active
    /// codes removed for inactivity raise the change flag.
    pub fn prune(&mut self, now: u32, config: &FilterConfig) {
        let mut i = 0;
        while i < self.candidate_count {
            if now.wrapping_sub(self.candidates[i].first_seen) > config.window_active {
                Self::remove_at(&mut self.candidates, &mut self.candidate_count, i);
                continue;
            }
            i += 1;
        }

        let mut i = 0;
        while i < self.active_count {
            if now.wrapping_sub(self.active[i].last_seen) > config.window_inactive {
                Self::remove_at(&mut self.active, &mut self.active_count, i);
                self.changed = true;
                continue;
            }
            i += 1;
        }
    }

    /// Forget every candidate and every active code.
    pub fn clear(&mut self) {
        self.candidate_count = 0;
        self.active_count = 0;
        self.changed = false;
    }

    //==================================================================================Accessors

    /// Active codes in insertion order.
    pub fn active(&self) -> &[DtcRecord] {
        &self.active[..self.active_count]
    }

    /// Candidates awaiting promotion, in insertion order.
    pub fn candidates(&self) -> &[DtcRecord] {
        &self.candidates[..self.candidate_count]
    }

    /// Whether the active list changed since the flag was last taken.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Read and reset the change flag.
    pub fn take_changed(&mut self) -> bool {
        core::mem::take(&mut self.changed)
    }

    //==================================================================================Helpers

    fn find<'a>(list: &'a mut [DtcRecord], key: &DtcKey) -> Option<&'a mut DtcRecord> {
        list.iter_mut().find(|record| record.dtc.key == *key)
    }

    /// Left-shift removal keeping the remaining entries in order.
    fn remove_at(list: &mut [DtcRecord], count: &mut usize, index: usize) {
        list.copy_within(index + 1..*count, index);
        *count -= 1;
    }
}

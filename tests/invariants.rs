//! Property tests for the debounce lifecycle invariants: whatever the
//! input trace, the lists stay bounded, disjoint, and inside their time
//! windows, and the promotion/removal rules hold.
mod helpers;

use helpers::{tp_cm_bam, tp_dt, TP_CM_SRC3_ID, TP_DT_SRC3_ID};
use j1939_dtc::core::{Dtc, DtcKey, DtcRecord, FilterConfig, LampStatus};
use j1939_dtc::protocol::monitor::DtcMonitor;
use j1939_dtc::protocol::registry::{DtcRegistry, MAX_ACTIVE_DTCS, MAX_CANDIDATE_DTCS};
use j1939_dtc::protocol::transport::can_frame::CanFrame;
use proptest::prelude::*;

fn dtc(src: u8, spn: u32, fmi: u8) -> Dtc {
    Dtc {
        key: DtcKey { src, spn, fmi },
        cm: 0,
        oc: 1,
        lamps: LampStatus::OFF,
    }
}

const CFG: FilterConfig = FilterConfig {
    threshold_reads: 3,
    window_active: 10,
    window_inactive: 20,
    timeout_multi_frame: 5,
};

proptest! {
    /// P1 + P2: under any observation/prune trace the lists stay within
    /// capacity, no key is in both, and after a prune every entry is
    /// inside its window.
    #[test]
    fn lists_stay_bounded_disjoint_and_windowed(
        steps in prop::collection::vec(
            (0u8..6, 1u32..40, 0u8..3, 0u32..4, prop::bool::ANY),
            1..300,
        )
    ) {
        let mut registry = DtcRegistry::new();
        let mut now = 0u32;

        for (src, spn, fmi, advance, do_prune) in steps {
            now += advance;
            registry.observe(dtc(src, spn, fmi), now, &CFG);
            if do_prune {
                registry.prune(now, &CFG);

                // P2 holds at every quiescent point after a prune.
                for candidate in registry.candidates() {
                    prop_assert!(now - candidate.first_seen <= CFG.window_active);
                }
                for active in registry.active() {
                    prop_assert!(now - active.last_seen <= CFG.window_inactive);
                }
            }

            // P1: capacities and disjointness hold after every operation.
            prop_assert!(registry.active().len() <= MAX_ACTIVE_DTCS);
            prop_assert!(registry.candidates().len() <= MAX_CANDIDATE_DTCS);
            for active in registry.active() {
                prop_assert!(!registry
                    .candidates()
                    .iter()
                    .any(|candidate| candidate.dtc.key == active.dtc.key));
            }

            // I3: bookkeeping timestamps never run ahead of the clock.
            for record in registry.candidates().iter().chain(registry.active()) {
                prop_assert!(record.first_seen <= record.last_seen);
                prop_assert!(record.last_seen <= now);
            }
        }
    }

    /// P3: a key observed at least `threshold_reads` times within the
    /// active window is active afterwards (the list has room here).
    #[test]
    fn enough_reads_within_window_promote(
        deltas in prop::collection::vec(0u32..4, 1..8)
    ) {
        prop_assume!(deltas.iter().sum::<u32>() <= CFG.window_active);

        let mut registry = DtcRegistry::new();
        let mut now = 0u32;

        registry.observe(dtc(3, 100, 1), now, &CFG);
        for delta in &deltas {
            now += delta;
            registry.observe(dtc(3, 100, 1), now, &CFG);
        }

        registry.prune(now, &CFG);

        let key = DtcKey { src: 3, spn: 100, fmi: 1 };
        if deltas.len() + 1 >= CFG.threshold_reads as usize {
            prop_assert!(registry.active().iter().any(|r| r.dtc.key == key));
        } else {
            prop_assert!(registry.candidates().iter().any(|r| r.dtc.key == key));
        }
    }

    /// P4: an active code that is never re-observed disappears once the
    /// inactive window passes, and that tick reports the change.
    #[test]
    fn silent_active_is_removed_with_change(extra in 1u32..50) {
        let mut monitor = DtcMonitor::new();
        monitor.set_filtering(1, 10, 20, 5);

        let frame = CanFrame::new(
            0x18FECA03,
            [0xFF, 0x00, 0x22, 0xEE, 0xE3, 0x81, 0xFF, 0xFF],
            0,
        );
        prop_assert!(monitor.ingest_frame(&frame));
        prop_assert!(monitor.tick(0));

        // Quiet ticks inside the window keep the code active.
        prop_assert!(!monitor.tick(20));

        prop_assert!(monitor.tick(20 + extra));
        let mut buf = [DtcRecord::EMPTY; MAX_ACTIVE_DTCS];
        prop_assert_eq!(monitor.copy_active(&mut buf), Ok(0));
    }

    /// Feeding arbitrary garbage frames never panics and never drives the
    /// active list over its capacity.
    #[test]
    fn arbitrary_frames_never_break_bounds(
        frames in prop::collection::vec(
            (
                prop_oneof![
                    any::<u32>(),
                    (0u32..6).prop_map(|s| 0x18FECA00 | s),
                    Just(TP_CM_SRC3_ID),
                    Just(TP_DT_SRC3_ID),
                ],
                any::<[u8; 8]>(),
                0u32..3,
            ),
            1..250,
        )
    ) {
        let mut monitor = DtcMonitor::new();
        monitor.set_filtering(1, 10, 20, 5);
        let mut now = 0u32;

        for (id, data, advance) in frames {
            now += advance;
            prop_assert!(monitor.ingest_frame(&CanFrame::new(id, data, now)));
            monitor.tick(now);
        }

        let mut buf = [DtcRecord::EMPTY; MAX_ACTIVE_DTCS];
        let count = monitor.copy_active(&mut buf).expect("gate free");
        prop_assert!(count <= MAX_ACTIVE_DTCS);
    }

    /// P7 under random payloads: an out-of-order data frame kills the
    /// session, so whatever follows without a fresh announcement decodes
    /// nothing.
    #[test]
    fn out_of_order_data_never_resurrects(
        bad_sequence in 2u8..255,
        tail in prop::collection::vec((1u8..255, any::<[u8; 7]>()), 0..10)
    ) {
        let mut monitor = DtcMonitor::new();
        monitor.set_filtering(1, 10, 20, 5);

        monitor.ingest_frame(&tp_cm_bam(TP_CM_SRC3_ID, 13, 2, 0));
        monitor.ingest_frame(&tp_dt(TP_DT_SRC3_ID, bad_sequence, [0xFF; 7], 0));

        for (sequence, payload) in tail {
            monitor.ingest_frame(&tp_dt(TP_DT_SRC3_ID, sequence, payload, 0));
        }

        prop_assert!(!monitor.tick(0));
        let mut buf = [DtcRecord::EMPTY; MAX_ACTIVE_DTCS];
        prop_assert_eq!(monitor.copy_active(&mut buf), Ok(0));
    }
}

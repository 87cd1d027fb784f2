//! Frame builders shared by the integration tests.
#![allow(dead_code)]
use j1939_dtc::protocol::transport::can_frame::CanFrame;

/// DM1 broadcast from source 0x03, priority 6.
pub const DM1_SRC3_ID: u32 = 0x18FECA03;
/// TP.CM broadcast (destination 0xFF) from source 0x03.
pub const TP_CM_SRC3_ID: u32 = 0x1CECFF03;
/// TP.DT counterpart of [`TP_CM_SRC3_ID`].
pub const TP_DT_SRC3_ID: u32 = 0x1CEBFF03;

/// The reference DTC tuple used across the tests:
/// SPN 0x7EE22, FMI 3, CM 1, OC 1.
pub const REFERENCE_TUPLE: [u8; 4] = [0x22, 0xEE, 0xE3, 0x81];

/// Single-frame DM1 with all lamps on and one DTC tuple, padded with 0xFF.
pub fn dm1_frame(id: u32, tuple: [u8; 4], timestamp: u32) -> CanFrame {
    CanFrame::new(
        id,
        [
            0xFF, 0x00, tuple[0], tuple[1], tuple[2], tuple[3], 0xFF, 0xFF,
        ],
        timestamp,
    )
}

/// TP.CM BAM announcement for the DM1 PGN (embedded PGN bytes CA FE 00).
pub fn tp_cm_bam(id: u32, total_size: u16, num_packets: u8, timestamp: u32) -> CanFrame {
    let size = total_size.to_le_bytes();
    CanFrame::new(
        id,
        [0x20, size[0], size[1], num_packets, 0xFF, 0xCA, 0xFE, 0x00],
        timestamp,
    )
}

/// TP.DT data frame carrying seven payload bytes behind the sequence number.
pub fn tp_dt(id: u32, sequence: u8, payload: [u8; 7], timestamp: u32) -> CanFrame {
    CanFrame::new(
        id,
        [
            sequence, payload[0], payload[1], payload[2], payload[3], payload[4], payload[5],
            payload[6],
        ],
        timestamp,
    )
}

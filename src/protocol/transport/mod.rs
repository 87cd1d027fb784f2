//! J1939 transport layer: CAN frame representation, 29-bit identifier
//! classification, and BAM (Broadcast Announce Message) reassembly.
//!
//! ## J1939 Protocol Constants
//!
//! The DTC core only listens; it recognises the DM1 broadcast PGN plus the
//! two transport-protocol PGNs that carry multi-frame DM1 payloads.

pub mod bam;
pub mod can_frame;
pub mod can_id;

/// PGN of the DM1 "Active Diagnostic Trouble Codes" broadcast.
pub const PGN_DM1: u32 = 0x00FECA;

/// PDU Format byte of TP.CM (Transport Protocol Connection Management).
pub const TP_CM_PF: u8 = 0xEC;

/// PDU Format byte of TP.DT (Transport Protocol Data Transfer).
pub const TP_DT_PF: u8 = 0xEB;

/// TP.CM control byte announcing a Broadcast Announce Message session.
///
/// The RTS/CTS connection-mode control bytes (`0x10`, `0x11`, …) are not
/// handled; only the connectionless BAM variant carries DM1 broadcasts.
pub const TP_CM_BAM_CONTROL: u8 = 0x20;

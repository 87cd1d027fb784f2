//! J1939 BAM transport support: reassembles DM1 payloads larger than eight
//! bytes from a TP.CM announcement followed by TP.DT data frames.
/// Maximum payload a BAM session can transport once reassembled.
pub const MAX_BAM_PAYLOAD: usize = 256;

pub mod assembler;

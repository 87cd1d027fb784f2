//! In-memory representation of an SAE J1939 CAN frame as the DTC core
//! consumes it from the driver.
use crate::protocol::transport::can_id::CanId;

#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Raw frame handed to [`ingest_frame`](crate::protocol::monitor::DtcMonitor::ingest_frame).
pub struct CanFrame {
    /// Full 29-bit CAN identifier stored inside a `u32`.
    pub id: CanId,
    /// Payload buffer. Classic CAN frames always provide eight bytes.
    pub data: [u8; 8],
    /// Reception time in integer seconds, supplied by the driver. The
    /// library has no clock of its own.
    pub timestamp: u32,
}

impl CanFrame {
    /// Wrap a raw identifier and payload as received from the controller.
    pub const fn new(id: u32, data: [u8; 8], timestamp: u32) -> Self {
        Self {
            id: CanId(id),
            data,
            timestamp,
        }
    }
}

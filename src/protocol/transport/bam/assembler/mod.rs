//! J1939 BAM assembler: rebuilds multi-frame DM1 messages by aggregating
//! the TP.DT frames of an announced broadcast session.
use super::MAX_BAM_PAYLOAD;
use crate::protocol::transport::can_id::CanId;

//==================================================================================Constants

/// Maximum number of BAM sessions handled in parallel (distinct senders).
pub const MAX_CONCURRENT_SESSIONS: usize = 4;

/// Payload bytes carried by each TP.DT frame after the sequence byte.
const BYTES_PER_PACKET: usize = 7;

//==================================================================================Enums and Structs
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProcessResult {
    /// Frame not matched to a session or discarded (oversized announcement,
    /// session pool exhausted, out-of-order packet, etc.).
    Ignored,
    /// Frame successfully integrated but additional packets are still missing.
    FragmentConsumed,
    /// All announced packets were received; the complete DM1 buffer is
    /// available for decoding.
    MessageComplete(CompletedDm1),
}

/// Safe container returning a reassembled DM1 buffer without exposing
/// the assembler's internal session storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompletedDm1 {
    /// Source address of the announcing node (low byte of the TP.CM id).
    pub source: u8,
    /// Reassembled payload, zero-padded past `len`.
    pub payload: [u8; MAX_BAM_PAYLOAD],
    /// Announced message length (number of valid bytes).
    pub len: usize,
}

impl CompletedDm1 {
    /// Immutable view over the announced bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.payload[..self.len]
    }
}

/// Internal structure tracking the state of one BAM session.
/// A free slot is marked by `cm_id == 0`.
#[derive(Debug, Clone, Copy)]
struct BamSession {
    cm_id: u32,
    dt_id: u32,
    total_size: usize,
    num_packets: u8,
    received_packets: u8,
    first_seen: u32,
    last_seen: u32,
    buffer: [u8; MAX_BAM_PAYLOAD],
}

impl BamSession {
    /// Create a session in the free state.
    const fn new() -> Self {
        Self {
            cm_id: 0,
            dt_id: 0,
            total_size: 0,
            num_packets: 0,
            received_packets: 0,
            first_seen: 0,
            last_seen: 0,
            buffer: [0; MAX_BAM_PAYLOAD],
        }
    }

    /// Reset the session and make it available again.
    fn release(&mut self) {
        self.cm_id = 0;
        self.dt_id = 0;
        self.total_size = 0;
        self.num_packets = 0;
        self.received_packets = 0;
        // No need to wipe the buffer; the announcement zeroes it.
    }

    fn is_free(&self) -> bool {
        self.cm_id == 0
    }
}

/// Main assembler: owns a fixed pool of reusable sessions.
#[derive(Debug, Clone, Copy)]
pub struct BamAssembler {
    sessions: [BamSession; MAX_CONCURRENT_SESSIONS],
}

impl Default for BamAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl BamAssembler {
    /// Instantiate the assembler with a free session pool.
    pub const fn new() -> Self {
        Self {
            sessions: [BamSession::new(); MAX_CONCURRENT_SESSIONS],
        }
    }

    //==================================================================================Process Functions
    /// Process a TP.CM BAM announcement (already filtered by the classifier).
    ///
    /// * `id` – identifier of the TP.CM frame; its 29-bit value keys the session
    /// * `data` – raw 8-byte payload of the announcement
    /// * `now` – reception time in seconds
    ///
    /// A new announcement under an identifier that is already in flight
    /// overwrites that session. When the pool is exhausted the announcement
    /// is dropped.
    pub fn announce(&mut self, id: CanId, data: &[u8; 8], now: u32) -> ProcessResult {
        let total_size = usize::from(u16::from_le_bytes([data[1], data[2]]));
        let num_packets = data[3];

        if total_size > MAX_BAM_PAYLOAD {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "BAM announcement of {} bytes exceeds the {} byte session buffer",
                total_size,
                MAX_BAM_PAYLOAD
            );
            return ProcessResult::Ignored;
        }

        let cm_id = id.id29();
        let in_flight_index = self.sessions.iter().position(|s| s.cm_id == cm_id);
        let session_index =
            in_flight_index.or_else(|| self.sessions.iter().position(|s| s.is_free()));

        let Some(index) = session_index else {
            #[cfg(feature = "defmt")]
            defmt::warn!("BAM session pool exhausted, dropping announcement");
            return ProcessResult::Ignored;
        };

        let session = &mut self.sessions[index];
        session.cm_id = cm_id;
        session.dt_id = id.tp_dt_counterpart();
        session.total_size = total_size;
        session.num_packets = num_packets;
        session.received_packets = 0;
        session.first_seen = now;
        session.last_seen = now;
        session.buffer = [0; MAX_BAM_PAYLOAD];

        ProcessResult::FragmentConsumed
    }

    /// Process a TP.DT data frame.
    ///
    /// Packets must arrive strictly in order. A sequence number other than
    /// `received_packets + 1` abandons the whole session; later data frames
    /// for that identifier are ignored until a fresh announcement.
    pub fn consume_data(&mut self, id: CanId, data: &[u8; 8], now: u32) -> ProcessResult {
        let dt_id = id.id29();
        let Some(session) = self
            .sessions
            .iter_mut()
            .find(|s| !s.is_free() && s.dt_id == dt_id)
        else {
            return ProcessResult::Ignored;
        };

        let packet_number = data[0];
        if u16::from(packet_number) != u16::from(session.received_packets) + 1 {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Out-of-order TP.DT packet {} (expected {}), abandoning session",
                packet_number,
                u16::from(session.received_packets) + 1
            );
            session.release();
            return ProcessResult::Ignored;
        }

        let offset = usize::from(packet_number - 1) * BYTES_PER_PACKET;
        // The last packet may carry fewer useful bytes than it transports.
        let copy_len = BYTES_PER_PACKET.min(session.total_size.saturating_sub(offset));
        if copy_len > 0 {
            session.buffer[offset..offset + copy_len].copy_from_slice(&data[1..1 + copy_len]);
        }
        session.received_packets += 1;
        session.last_seen = now;

        if session.received_packets == session.num_packets {
            let completed = CompletedDm1 {
                source: (session.cm_id & 0xFF) as u8,
                payload: session.buffer,
                len: session.total_size,
            };

            // Release the session for future messages.
            session.release();

            return ProcessResult::MessageComplete(completed);
        }

        ProcessResult::FragmentConsumed
    }

    //==================================================================================Maintenance
    /// Drop every in-flight session whose last data frame is older than
    /// `timeout` seconds. Invoked from the periodic tick.
    pub fn sweep(&mut self, now: u32, timeout: u32) {
        for session in self.sessions.iter_mut() {
            if !session.is_free() && now.wrapping_sub(session.last_seen) > timeout {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "Discarding incomplete BAM session {} ({}/{} packets)",
                    session.cm_id,
                    session.received_packets,
                    session.num_packets
                );
                session.release();
            }
        }
    }

    /// Abandon every in-flight session.
    pub fn clear(&mut self) {
        for session in self.sessions.iter_mut() {
            session.release();
        }
    }

    /// Number of sessions currently in flight.
    pub fn in_flight(&self) -> usize {
        self.sessions.iter().filter(|s| !s.is_free()).count()
    }
}

//! DTC monitor: owns the reassembler, the registry, the debounce
//! configuration, and the gate that serialises the interrupt-context
//! ingress path against the main-context readers.
//!
//! The monitor is a plain constructible handle; a firmware instantiates one
//! per CAN bus (typically in a `static`) and drives it with two entry
//! points: [`ingest_frame`](DtcMonitor::ingest_frame) for every received
//! frame and [`tick`](DtcMonitor::tick) once per second from the main loop.
//! No operation blocks and nothing is allocated; when the gate is contended
//! the ingress frame is dropped, never queued.
use crate::core::{DtcRecord, FilterConfig};
use crate::error::SnapshotError;
use crate::protocol::dm1::Dm1Message;
use crate::protocol::registry::DtcRegistry;
use crate::protocol::transport::bam::assembler::{BamAssembler, ProcessResult};
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::FrameClass;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

//==================================================================================Callback

/// Invoked from within [`tick`](DtcMonitor::tick) with the gate held
/// whenever the active list changed since the last successful tick. The
/// view is ordered and valid only for the duration of the call; keep the
/// callback short, frames arriving while it runs are dropped.
pub type ActiveDtcsCallback = fn(active: &[DtcRecord]);

//==================================================================================Gate

/// Single non-reentrant, non-blocking mutual-exclusion flag.
#[derive(Debug, Clone, Copy)]
struct Gate {
    locked: bool,
}

impl Gate {
    const fn new() -> Self {
        Self { locked: false }
    }

    /// Succeeds iff the gate is free; never waits.
    fn try_acquire(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    fn release(&mut self) {
        self.locked = false;
    }

    fn is_locked(&self) -> bool {
        self.locked
    }
}

//==================================================================================Monitor

/// Owning context for one CAN bus worth of DTC tracking.
#[derive(Debug, Clone, Copy)]
pub struct DtcMonitor {
    gate: Gate,
    config: FilterConfig,
    callback: Option<ActiveDtcsCallback>,
    assembler: BamAssembler,
    registry: DtcRegistry,
}

impl Default for DtcMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl DtcMonitor {
    /// Instantiate an empty monitor with the default debounce parameters.
    pub const fn new() -> Self {
        Self {
            gate: Gate::new(),
            config: FilterConfig::new(),
            callback: None,
            assembler: BamAssembler::new(),
            registry: DtcRegistry::new(),
        }
    }

    //==================================================================================Configuration

    /// Overwrite the debounce parameters. A zero value leaves the current
    /// value of that option unchanged. All four options apply together.
    pub fn set_filtering(
        &mut self,
        threshold_reads: u32,
        window_active: u32,
        window_inactive: u32,
        timeout_multi_frame: u32,
    ) {
        self.config.merge_nonzero(
            threshold_reads,
            window_active,
            window_inactive,
            timeout_multi_frame,
        );
    }

    /// Current debounce parameters.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Register the function invoked from `tick` when the active list
    /// changed. The callback must not feed frames back into the monitor.
    pub fn register_callback(&mut self, callback: ActiveDtcsCallback) {
        self.callback = Some(callback);
    }

    //==================================================================================Ingress

    /// Feed one received CAN frame into the monitor. Safe to call from a
    /// CAN interrupt handler.
    ///
    /// Returns `false` when the gate was contended and the frame dropped —
    /// the caller accepted that possibility by reading state under
    /// [`try_lock`](Self::try_lock). Returns `true` once the frame was
    /// examined, whether or not it carried DTC traffic.
    pub fn ingest_frame(&mut self, frame: &CanFrame) -> bool {
        if !self.gate.try_acquire() {
            #[cfg(feature = "defmt")]
            defmt::trace!("Gate contended, dropping frame {}", frame.id.id29());
            return false;
        }

        match frame.id.classify(&frame.data) {
            FrameClass::Dm1 { source } => {
                self.decode_dm1(source, &frame.data, frame.timestamp);
            }
            FrameClass::TpCm => {
                self.assembler
                    .announce(frame.id, &frame.data, frame.timestamp);
            }
            FrameClass::TpDt => {
                if let ProcessResult::MessageComplete(message) =
                    self.assembler
                        .consume_data(frame.id, &frame.data, frame.timestamp)
                {
                    self.decode_dm1(message.source, message.as_slice(), frame.timestamp);
                }
            }
            FrameClass::Ignore => {}
        }

        self.gate.release();
        true
    }

    fn decode_dm1(&mut self, source: u8, buf: &[u8], now: u32) {
        if let Some(message) = Dm1Message::parse(source, buf) {
            for dtc in message.dtcs() {
                self.registry.observe(dtc, now, &self.config);
            }
        }
    }

    //==================================================================================Tick

    /// Periodic maintenance; the application must call this once per second
    /// from its main context with the current time.
    ///
    /// Ages out stale candidates, inactive codes, and incomplete BAM
    /// sessions, then fires the registered callback if the active list
    /// changed since the last successful tick. Returns that change verdict.
    pub fn tick(&mut self, now: u32) -> bool {
        if !self.gate.try_acquire() {
            return false;
        }

        self.registry.prune(now, &self.config);
        self.assembler.sweep(now, self.config.timeout_multi_frame);

        let changed = self.registry.take_changed();
        if changed {
            if let Some(callback) = self.callback {
                callback(self.registry.active());
            }
        }

        self.gate.release();
        changed
    }

    //==================================================================================Observation

    /// Copy the active list into a caller-provided buffer and return the
    /// number of records written.
    pub fn copy_active(&mut self, buf: &mut [DtcRecord]) -> Result<usize, SnapshotError> {
        if !self.gate.try_acquire() {
            return Err(SnapshotError::Contended);
        }

        let active = self.registry.active();
        let result = if buf.len() < active.len() {
            Err(SnapshotError::BufferTooSmall {
                needed: active.len(),
                provided: buf.len(),
            })
        } else {
            buf[..active.len()].copy_from_slice(active);
            Ok(active.len())
        };

        self.gate.release();
        result
    }

    /// Copy the active list into a freshly allocated vector owned by the
    /// caller. An allocator refusal is reported, never fatal.
    #[cfg(feature = "alloc")]
    pub fn dyn_copy_active(&mut self) -> Result<Vec<DtcRecord>, SnapshotError> {
        if !self.gate.try_acquire() {
            return Err(SnapshotError::Contended);
        }

        let active = self.registry.active();
        let mut out = Vec::new();
        let result = match out.try_reserve_exact(active.len()) {
            Ok(()) => {
                out.extend_from_slice(active);
                Ok(out)
            }
            Err(_) => Err(SnapshotError::AllocationFailed),
        };

        self.gate.release();
        result
    }

    /// Take the gate for a borrowed read. While held, ingress frames are
    /// dropped, so pair it with [`unlock`](Self::unlock) as quickly as
    /// possible.
    pub fn try_lock(&mut self) -> bool {
        self.gate.try_acquire()
    }

    /// Release the gate taken with [`try_lock`](Self::try_lock).
    pub fn unlock(&mut self) {
        self.gate.release();
    }

    /// Borrow the active list in insertion order. Yields `None` unless the
    /// gate is held; acquire it with [`try_lock`](Self::try_lock) first.
    pub fn reference_active(&self) -> Option<&[DtcRecord]> {
        if !self.gate.is_locked() {
            return None;
        }
        Some(self.registry.active())
    }

    /// Forget every tracked code and every in-flight reassembly. Returns
    /// `false` when the gate was contended and nothing was cleared.
    pub fn clear_all(&mut self) -> bool {
        if !self.gate.try_acquire() {
            return false;
        }

        self.registry.clear();
        self.assembler.clear();

        self.gate.release();
        true
    }
}

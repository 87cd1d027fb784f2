//! Defines the data contract between the DM1 decoder, the DTC registry,
//! and the observation API exposed to the host application.
//!
//! The on-the-wire DTC fields pack into 40 bits; in memory they are kept as
//! aligned small integers so the host can read them without bit twiddling.

//==================================================================================LAMPS

/// Status of the four J1939 diagnostic lamps carried by a DM1 message.
///
/// Each lamp is a two-bit field (`0..=3`). The status is common to every
/// DTC of the same DM1 message and is rewritten on every observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LampStatus {
    /// Malfunction Indicator Lamp.
    pub mil: u8,
    /// Red Stop Lamp.
    pub rsl: u8,
    /// Amber Warning Lamp.
    pub awl: u8,
    /// Protect Lamp.
    pub pl: u8,
}

impl LampStatus {
    /// All four lamps off.
    pub const OFF: Self = Self {
        mil: 0,
        rsl: 0,
        awl: 0,
        pl: 0,
    };

    /// Decode the DM1 prefix byte (MSB→LSB: `MIL[2] | RSL[2] | AWL[2] | PL[2]`).
    pub const fn from_prefix_byte(byte: u8) -> Self {
        Self {
            mil: (byte >> 6) & 0x03,
            rsl: (byte >> 4) & 0x03,
            awl: (byte >> 2) & 0x03,
            pl: byte & 0x03,
        }
    }
}

//==================================================================================DTC

/// Identity of a diagnostic trouble code.
///
/// Two DTCs are the same code iff source, SPN, and FMI all match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DtcKey {
    /// Source address (low 8 bits of the CAN identifier).
    pub src: u8,
    /// Suspect Parameter Number (19 bits).
    pub spn: u32,
    /// Failure Mode Indicator (5 bits).
    pub fmi: u8,
}

/// A decoded DM1 trouble code: identity plus the mutable metadata
/// rewritten on every observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dtc {
    /// `(src, spn, fmi)` identity triple.
    pub key: DtcKey,
    /// Conversion Method bit; fixed at the first sighting of the code.
    pub cm: u8,
    /// Occurrence Counter (7 bits).
    pub oc: u8,
    /// Lamp status broadcast alongside the code.
    pub lamps: LampStatus,
}

/// A DTC tracked by the registry, with its debounce bookkeeping.
/// Timestamps are integer seconds supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DtcRecord {
    /// The trouble code itself.
    pub dtc: Dtc,
    /// Timestamp of the first observation.
    pub first_seen: u32,
    /// Timestamp of the most recent observation.
    pub last_seen: u32,
    /// Number of observations since `first_seen`.
    pub read_count: u16,
}

impl DtcRecord {
    /// All-zero record, used for unused registry slots and convenient for
    /// pre-filling the caller-side copy buffers.
    pub const EMPTY: Self = Self {
        dtc: Dtc {
            key: DtcKey {
                src: 0,
                spn: 0,
                fmi: 0,
            },
            cm: 0,
            oc: 0,
            lamps: LampStatus::OFF,
        },
        first_seen: 0,
        last_seen: 0,
        read_count: 0,
    };
}

impl Default for DtcRecord {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl core::fmt::Display for DtcRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "SRC: 0x{:02X}, SPN: {} (0x{:X}), FMI: {}, CM: {}, OC: {}, \
             MIL: {}, RSL: {}, AWL: {}, PL: {}, last seen: {}",
            self.dtc.key.src,
            self.dtc.key.spn,
            self.dtc.key.spn,
            self.dtc.key.fmi,
            self.dtc.cm,
            self.dtc.oc,
            self.dtc.lamps.mil,
            self.dtc.lamps.rsl,
            self.dtc.lamps.awl,
            self.dtc.lamps.pl,
            self.last_seen
        )
    }
}

//==================================================================================CONFIG

/// Debounce and timeout configuration, all values in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterConfig {
    /// Observations required within the active window for a candidate to
    /// be promoted to active.
    pub threshold_reads: u32,
    /// Maximum age of a candidate before it is pruned.
    pub window_active: u32,
    /// Inactivity after which an active DTC is removed.
    pub window_inactive: u32,
    /// Maximum age of a partial BAM reassembly.
    pub timeout_multi_frame: u32,
}

impl FilterConfig {
    /// Default debounce parameters.
    pub const fn new() -> Self {
        Self {
            threshold_reads: 10,
            window_active: 10,
            window_inactive: 20,
            timeout_multi_frame: 5,
        }
    }

    /// Overwrite every option whose new value is non-zero; zero leaves the
    /// current value unchanged.
    pub fn merge_nonzero(
        &mut self,
        threshold_reads: u32,
        window_active: u32,
        window_inactive: u32,
        timeout_multi_frame: u32,
    ) {
        if threshold_reads > 0 {
            self.threshold_reads = threshold_reads;
        }
        if window_active > 0 {
            self.window_active = window_active;
        }
        if window_inactive > 0 {
            self.window_inactive = window_inactive;
        }
        if timeout_multi_frame > 0 {
            self.timeout_multi_frame = timeout_multi_frame;
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new()
    }
}

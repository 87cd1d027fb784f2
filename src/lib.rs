//! `j1939-dtc` library: parses SAE J1939 Diagnostic Trouble Code (DM1)
//! messages out of a raw CAN frame stream in a `no_std` environment.
//! The crate reassembles multi-frame BAM transport sessions, debounces the
//! decoded DTCs through a candidate/active lifecycle, and publishes the
//! active set to the host application behind a non-blocking gate so the
//! ingress path may run from a CAN interrupt handler.
#![no_std]
//==================================================================================
#[cfg(feature = "alloc")]
extern crate alloc;
//==================================================================================
/// Core data model shared by the decoder, the registry, and the observation API.
pub mod core;
/// Domain errors (snapshot readers and related issues).
pub mod error;
/// J1939 protocol implementation: CAN transport, DM1 decoding, DTC registry,
/// and the owning monitor context.
pub mod protocol;
//==================================================================================

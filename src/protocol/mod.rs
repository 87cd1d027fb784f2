//! High-level components of the J1939 diagnostic protocol: CAN transport,
//! DM1 payload decoding, the DTC debounce registry, and the monitor that
//! ties them together behind the concurrency gate.
pub mod dm1;
pub mod monitor;
pub mod registry;
pub mod transport;

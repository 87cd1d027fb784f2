//! Error definitions shared across library modules.
//!
//! Every failure in this crate is soft: malformed frames and overflowed
//! pools are silently discarded on the ingress path, so the only errors
//! surfaced to the caller come from the snapshot readers.
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors returned by the active-set snapshot readers.
pub enum SnapshotError {
    /// The gate protecting the DTC lists is held by another context.
    #[error("DTC lists are locked by another context")]
    Contended,
    /// The caller-provided buffer cannot hold the active set.
    #[error("Destination buffer too small -> needed: {needed}, provided: {provided}")]
    BufferTooSmall { needed: usize, provided: usize },
    /// The allocator refused to reserve space for the copy.
    #[cfg(feature = "alloc")]
    #[error("Allocation failed")]
    AllocationFailed,
}

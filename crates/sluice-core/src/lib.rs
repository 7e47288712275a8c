//! Core types for the Sluice interop boundary.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! scratch transfer buffer, the region capability traits the boundary
//! layers adapt their handles to, and the error types every transfer
//! operation reports through.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod norm;
pub mod region;
pub mod scratch;

pub use config::{ScratchConfig, CAPACITY_LIMIT, MAX_CYCLE_LENGTH};
pub use error::{ConfigError, TransferError};
pub use norm::{euclidean_norm, region_norm};
pub use region::{
    ArrayAccess, ArrayRegion, DirectRegion, DirectRegionMut, SampleRegion, SampleRegionMut,
};
pub use scratch::ScratchBuffer;

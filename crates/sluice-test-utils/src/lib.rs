//! Test utilities and mock runtime arrays for Sluice development.
//!
//! Provides deterministic sample generators, a [`MockManagedArray`]
//! standing in for a managed-runtime array behind the region-copy protocol,
//! and a [`HostArray`] that does the same through the C callback table.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod host;

pub use fixtures::{random_samples, MockManagedArray};
pub use host::HostArray;

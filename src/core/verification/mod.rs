//! Data verification for post-export validation
//!
//! This module re-reads exported layers and checks that the CRS and feature
//! count survived the conversion.

pub mod checksum;
pub mod report;
pub mod verify;

pub use report::{FileChecksum, VerificationFailure, VerificationReport};
pub use verify::Verifier;

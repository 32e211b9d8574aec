//! # Formats Module
//!
//! Byte encoding of the records kept in redb.
//!
//! This module contains:
//! - Versioned record format (one version byte + postcard body)
//!
//! Note: table layout and transactions stay in `storage`; this module only
//! handles format conversion (pure transformations).

mod record;

pub use record::*;

//! PocketLibrary application library
//!
//! Catalog search with an offline fallback, branch proximity, reservations,
//! reviews and the fine ledger, packaged as kernel modules.

pub mod modules;
pub mod utils;

pub use modules::register_all;

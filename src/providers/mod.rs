//! Providers Module - External Data Sources
//!
//! The investigation API is the only collaborator: wallet lookup, freeze lists
//! and freeze transitions.

pub mod wallets;

pub use wallets::*;

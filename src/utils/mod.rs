//! Utils Module - Helper Functions & Shared Utilities
//!
//! Constants, in-flight tracking, polling, list filtering and reference data.

pub mod constants;
pub mod filter;
pub mod inflight;
pub mod poller;
pub mod stations;

pub use constants::*;
pub use filter::*;
pub use inflight::*;
pub use poller::*;
pub use stations::*;

//! Shared building blocks for the autostake contract suite.
//!
//! - [`math`]: scaled-integer multiply/divide with explicit rounding.
//! - [`admin_tiers`]: governance tiers used by every contract.
//! - [`greylist`]: administrative exit blocking for the ledgers.
//! - [`pool`]: cross-contract client for the linear emission pool.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod admin_tiers;
pub mod greylist;
pub mod math;
pub mod pool;

pub use admin_tiers::*;
pub use math::{MathError, SCALE};

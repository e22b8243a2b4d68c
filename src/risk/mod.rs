//! Risk management module
//!
//! Stake sizing between trades

mod stake;

pub use stake::{StakeManager, STAKE_PRECISION};

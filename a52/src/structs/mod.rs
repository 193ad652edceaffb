//! Data structures representing format components.
//!
//! Contains the AC-3 and E-AC-3 syncframe headers, the specific parameters
//! they reduce to, and the `dac3` / `dec3` records those parameters are
//! stored in.

pub mod ac3;
pub mod bsi;
pub mod dac3;
pub mod dec3;
pub mod eac3;
pub mod record;

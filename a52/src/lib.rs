#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! Codec parameter extraction for AC-3 and Enhanced AC-3 (E-AC-3) bitstreams
//! according to ETSI TS 102 366, and the `dac3` / `dec3` records that carry
//! those parameters in ISO base media files.
//!
//! ### Syncframes
//!
//! Both codecs share the 0x0B77 syncword. The bsid field tells them apart:
//! values up to 9 are AC-3, 10 to 16 are E-AC-3.
//!
//! ### Access Units
//!
//! An AC-3 syncframe always carries 6 audio blocks. E-AC-3 syncframes carry
//! 1, 2, 3 or 6 blocks, and several syncframes of independent and dependent
//! substreams make up one access unit.
//!
//! ## Quick Start
//!
//! 1. Identify the codec with [`process::probe`]
//! 2. AC-3: decode one syncframe with
//!    [`Ac3SpecificParameters::from_syncframe`](structs::ac3::Ac3SpecificParameters::from_syncframe)
//! 3. E-AC-3: assemble an access unit with [`process::assemble::Assembler`]
//! 4. Write the record with `to_dac3` / `to_dec3`
//!
//! ```rust,no_run
//! use a52::process::{Codec, EXAMPLE_DATA, assemble::Assembler, probe};
//! use a52::structs::ac3::Ac3SpecificParameters;
//!
//! let data = EXAMPLE_DATA; // Example data
//!
//! let record = match probe(data)? {
//!     Codec::Ac3 => Ac3SpecificParameters::from_syncframe(data)?.to_dac3()?,
//!     Codec::Eac3 => Assembler::default().assemble(data)?.params.to_dec3()?,
//! };
//!
//! println!("{} byte record", record.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Processing functionality for syncframe sequences.
///
/// - **Probing** ([`process::probe`]): AC-3 / E-AC-3 detection
/// - **Assembly** ([`process::assemble`]): E-AC-3 access units
pub mod process;

/// Data structures representing A/52 format components.
///
/// - **AC-3** ([`structs::ac3`]): Syncframe header and parameters
/// - **E-AC-3** ([`structs::eac3`]): Syncframe header and substreams
/// - **Bit Stream Information** ([`structs::bsi`]): E-AC-3 field table
/// - **Records** ([`structs::dac3`], [`structs::dec3`], [`structs::record`]): Box codecs
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Bitstream I/O** ([`utils::bitstream_io`]): Bit-level reading
/// - **Error Handling** ([`utils::errors`]): Error types
pub mod utils;

//! Utility functions and supporting infrastructure.
//!
//! Provides the bit-level reader used by the syncframe parsers and the error
//! types shared by parsing, record construction and access unit assembly.

pub mod bitstream_io;
pub mod errors;

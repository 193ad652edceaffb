//! E-AC-3 syncframe header and specific parameters.
//!
//! ## Substreams
//!
//! An E-AC-3 stream multiplexes up to 8 **independent** substreams (programs),
//! each of which may be followed by up to 15 **dependent** substreams carrying
//! extra channels. Syncframes of one access unit are ordered by substream id,
//! every dependent syncframe belonging to the independent one before it.
//!
//! ## Stream Types
//!
//! - **0**: independent
//! - **1**: dependent
//! - **2**: independent, converted from AC-3 (continuation)
//! - **3**: reserved

use std::io;

use anyhow::{Result, bail};
use log::trace;

use super::ac3::{A52_SYNCWORD, ACMOD_CHANNELS, SAMPLE_RATES};
use super::bsi::{AUDIO_BLOCKS, Bsi, Field};
use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::errors::SyncframeError;

/// Largest E-AC-3 syncframe: frmsiz is 11 bits of 16-bit words.
pub const EAC3_MAX_SYNCFRAME_LENGTH: usize = 4096;

/// Bytes needed to reach the end of bsid.
pub const EAC3_MIN_HEADER_LENGTH: usize = 6;

/// Independent substreams an access unit (and the `dec3` record) can describe.
pub const EAC3_MAX_INDEPENDENT_SUBSTREAMS: usize = 8;

/// Dependent substreams per independent substream (4-bit count).
pub const EAC3_MAX_DEPENDENT_SUBSTREAMS: u8 = 15;

pub const EAC3_MIN_BSID: u8 = 10;
pub const EAC3_MAX_BSID: u8 = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum StreamType {
    #[default]
    Independent = 0,
    Dependent = 1,
    /// AC-3 to E-AC-3 conversion, still an independent substream.
    Continuation = 2,
}

impl TryFrom<u8> for StreamType {
    type Error = SyncframeError;

    fn try_from(strmtyp: u8) -> Result<Self, Self::Error> {
        match strmtyp {
            0 => Ok(Self::Independent),
            1 => Ok(Self::Dependent),
            2 => Ok(Self::Continuation),
            _ => Err(SyncframeError::InvalidStreamType),
        }
    }
}

/// One independent substream as described by the `dec3` record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Eac3SubstreamInfo {
    pub fscod: u8,
    /// Only meaningful when `fscod` is 3.
    pub fscod2: u8,
    pub bsid: u8,
    /// 0 unless the syncframe carries informational metadata.
    pub bsmod: u8,
    pub acmod: u8,
    pub lfeon: bool,
    /// Dependent substreams attached to this one, 0 to 15.
    pub num_dep_sub: u8,
    /// Channel locations added by the dependent substreams, 9 bits.
    pub chan_loc: u16,
}

impl Eac3SubstreamInfo {
    pub fn sample_rate(&self) -> Option<u32> {
        if self.fscod == 0x3 {
            SAMPLE_RATES.get(self.fscod2 as usize).map(|rate| rate / 2)
        } else {
            SAMPLE_RATES.get(self.fscod as usize).copied()
        }
    }

    /// Channels of the independent substream alone.
    pub fn channel_count(&self) -> u8 {
        ACMOD_CHANNELS[(self.acmod & 0x7) as usize] + self.lfeon as u8
    }
}

/// Parameters carried by the E-AC-3 specific box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eac3SpecificParameters {
    /// kbit/s, 13 bits.
    pub data_rate: u16,
    pub independent_substreams: Vec<Eac3SubstreamInfo>,
}

impl Eac3SpecificParameters {
    /// Count of independent substreams minus one, as stored in the record.
    pub fn num_ind_sub(&self) -> u8 {
        self.independent_substreams.len().saturating_sub(1) as u8
    }
}

/// Maps a dependent substream's 16-bit chanmap onto the 9-bit chan_loc of
/// the `dec3` record.
pub fn chan_loc_from_chanmap(chanmap: u16) -> u16 {
    ((chanmap & 0x7F8) >> 2) | ((chanmap & 0x2) >> 1)
}

/// Header of a single E-AC-3 syncframe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eac3Syncframe {
    pub stream_type: StreamType,
    pub substreamid: u8,
    /// Syncframe length in bytes.
    pub frame_size: usize,
    pub numblkscod: u8,
    /// Substream fields; `num_dep_sub` and `chan_loc` are left for the
    /// assembler to accumulate.
    pub substream: Eac3SubstreamInfo,
    pub chanmap: Option<u16>,
}

impl Eac3Syncframe {
    /// Decodes the header of the syncframe at the start of `data`.
    ///
    /// At most [`EAC3_MAX_SYNCFRAME_LENGTH`] bytes are examined.
    pub fn read(data: &[u8]) -> Result<Self> {
        if data.len() < EAC3_MIN_HEADER_LENGTH {
            bail!(SyncframeError::InsufficientData {
                available: data.len(),
                required: EAC3_MIN_HEADER_LENGTH,
            });
        }

        let syncword = u16::from_be_bytes([data[0], data[1]]);
        if syncword != A52_SYNCWORD {
            bail!(SyncframeError::SyncwordMismatch(syncword));
        }

        let window = &data[..data.len().min(EAC3_MAX_SYNCFRAME_LENGTH)];
        let reader = &mut BsIoSliceReader::from_slice(window);

        let bsi = match Bsi::read(reader) {
            Ok(bsi) => bsi,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                let frmsiz = (((data[2] & 0x7) as usize) << 8) | data[3] as usize;
                bail!(SyncframeError::InsufficientData {
                    available: data.len(),
                    required: 2 * (frmsiz + 1),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let stream_type = StreamType::try_from(bsi.get(Field::Strmtyp) as u8)?;

        let substream = Eac3SubstreamInfo {
            fscod: bsi.get(Field::Fscod) as u8,
            fscod2: bsi.get(Field::Fscod2) as u8,
            bsid: bsi.get(Field::Bsid) as u8,
            bsmod: bsi.get(Field::Bsmod) as u8,
            acmod: bsi.get(Field::Acmod) as u8,
            lfeon: bsi.flag(Field::Lfeon),
            num_dep_sub: 0,
            chan_loc: 0,
        };

        if substream.fscod == 0x3 && substream.fscod2 == 0x3 {
            bail!(SyncframeError::MalformedSyncframe {
                field: "fscod2",
                value: substream.fscod2 as u16,
            });
        }

        if !(EAC3_MIN_BSID..=EAC3_MAX_BSID).contains(&substream.bsid) {
            bail!(SyncframeError::UnsupportedBitstream(substream.bsid));
        }

        let syncframe = Self {
            stream_type,
            substreamid: bsi.get(Field::Substreamid) as u8,
            frame_size: 2 * (bsi.get(Field::Frmsiz) as usize + 1),
            numblkscod: bsi.numblkscod() as u8,
            substream,
            chanmap: bsi.value(Field::Chanmap).map(|chanmap| chanmap as u16),
        };

        trace!("E-AC-3 syncframe: {syncframe:?}");

        Ok(syncframe)
    }

    pub fn is_independent(&self) -> bool {
        self.stream_type != StreamType::Dependent
    }

    pub fn audio_blocks(&self) -> u8 {
        AUDIO_BLOCKS[(self.numblkscod & 0x3) as usize]
    }

    pub fn chan_loc(&self) -> u16 {
        self.chanmap.map(chan_loc_from_chanmap).unwrap_or(0)
    }
}

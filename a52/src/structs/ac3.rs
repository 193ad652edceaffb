//! AC-3 syncframe header and specific parameters.
//!
//! ## Syncframe Layout
//!
//! **syncinfo**: 16-bit syncword (0x0B77), crc1, fscod and frmsizecod.
//! **bsi**: bitstream identification, service type and channel configuration,
//! followed by optional mix levels and the LFE flag.
//!
//! Only the fields carried by the `dac3` record are retained; everything else
//! is skipped by its bit width.

use anyhow::{Result, bail};
use log::trace;

use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::errors::SyncframeError;

/// Syncword shared by AC-3 and E-AC-3 syncframes.
pub const A52_SYNCWORD: u16 = 0x0B77;

/// Smallest AC-3 syncframe: 32 kbit/s at 48 kHz, 64 words.
pub const AC3_MIN_SYNCFRAME_LENGTH: usize = 128;

/// Highest defined frame size code.
pub const AC3_MAX_FRMSIZECOD: u8 = 0x25;

/// bsid values from 10 upwards belong to E-AC-3.
pub const AC3_MAX_BSID: u8 = 9;

/// Sampling rates indexed by fscod.
pub const SAMPLE_RATES: [u32; 3] = [48000, 44100, 32000];

/// Nominal bit rates in kbit/s, indexed by `frmsizecod >> 1`.
pub const AC3_BIT_RATES: [u32; 19] = [
    32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384, 448, 512, 576, 640,
];

/// Full bandwidth channels indexed by acmod.
pub const ACMOD_CHANNELS: [u8; 8] = [2, 1, 2, 3, 3, 4, 4, 5];

/// 1+1 dual mono.
pub const ACMOD_DUAL_MONO: u8 = 0x0;

/// 2/0 stereo.
pub const ACMOD_STEREO: u8 = 0x2;

/// Parameters carried by the AC-3 specific box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ac3SpecificParameters {
    /// Sample rate code.
    pub fscod: u8,
    /// Bitstream identification, 8 for standard AC-3.
    pub bsid: u8,
    /// Bitstream mode (service type).
    pub bsmod: u8,
    /// Audio coding mode (channel configuration).
    pub acmod: u8,
    /// Low frequency effects channel present.
    pub lfeon: bool,
    /// Frame size code. The record only stores `frmsizecod >> 1`.
    pub frmsizecod: u8,
}

impl Ac3SpecificParameters {
    /// Decodes the parameters from one syncframe.
    ///
    /// `data` must start at the syncword and hold at least
    /// [`AC3_MIN_SYNCFRAME_LENGTH`] bytes.
    pub fn from_syncframe(data: &[u8]) -> Result<Self> {
        if data.len() < AC3_MIN_SYNCFRAME_LENGTH {
            bail!(SyncframeError::InsufficientData {
                available: data.len(),
                required: AC3_MIN_SYNCFRAME_LENGTH,
            });
        }

        let syncword = u16::from_be_bytes([data[0], data[1]]);
        if syncword != A52_SYNCWORD {
            bail!(SyncframeError::SyncwordMismatch(syncword));
        }

        let reader = &mut BsIoSliceReader::from_slice(&data[..AC3_MIN_SYNCFRAME_LENGTH]);
        let param = Self::read(reader)?;
        param.validate()?;

        Ok(param)
    }

    pub fn read(reader: &mut BsIoSliceReader) -> Result<Self> {
        // syncword + crc1
        reader.skip_n(32)?;

        let fscod = reader.get_n(2)?;
        let frmsizecod = reader.get_n(6)?;
        let bsid = reader.get_n(5)?;
        let bsmod = reader.get_n(3)?;
        let acmod: u8 = reader.get_n(3)?;

        if acmod & 0x1 != 0 && acmod != 0x1 {
            // cmixlev
            reader.skip_n(2)?;
        }

        if acmod & 0x4 != 0 {
            // surmixlev
            reader.skip_n(2)?;
        }

        if acmod == ACMOD_STEREO {
            // dsurmod
            reader.skip_n(2)?;
        }

        let param = Self {
            fscod,
            bsid,
            bsmod,
            acmod,
            lfeon: reader.get()?,
            frmsizecod,
        };

        trace!("AC-3 syncframe: {param:?}");

        Ok(param)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fscod as usize >= SAMPLE_RATES.len() {
            bail!(SyncframeError::MalformedSyncframe {
                field: "fscod",
                value: self.fscod as u16,
            });
        }

        if self.frmsizecod > AC3_MAX_FRMSIZECOD {
            bail!(SyncframeError::MalformedSyncframe {
                field: "frmsizecod",
                value: self.frmsizecod as u16,
            });
        }

        if self.bsid > AC3_MAX_BSID {
            bail!(SyncframeError::UnsupportedBitstream(self.bsid));
        }

        Ok(())
    }

    pub fn sample_rate(&self) -> Option<u32> {
        SAMPLE_RATES.get(self.fscod as usize).copied()
    }

    /// Nominal bit rate in kbit/s.
    pub fn bit_rate(&self) -> Option<u32> {
        AC3_BIT_RATES.get((self.frmsizecod >> 1) as usize).copied()
    }

    /// Syncframe length in bytes.
    ///
    /// At 44.1 kHz the odd frame size codes carry one padding word.
    pub fn frame_size(&self) -> Option<usize> {
        let sample_rate = self.sample_rate()?;
        let bit_rate = self.bit_rate()?;

        // 1536 samples per syncframe, 16 bits per word
        let mut words = bit_rate * 96_000 / sample_rate;
        if sample_rate == 44100 {
            words += (self.frmsizecod & 1) as u32;
        }

        Some(words as usize * 2)
    }

    pub fn channel_count(&self) -> u8 {
        ACMOD_CHANNELS[(self.acmod & 0x7) as usize] + self.lfeon as u8
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bitstream_io::{BigEndian, BitWrite, BitWriter};

    /// Builds a syncframe header padded to the minimum syncframe length.
    pub(crate) fn syncframe(fscod: u8, frmsizecod: u8, bsid: u8, acmod: u8, lfeon: bool) -> Vec<u8> {
        let mut data = Vec::new();
        {
            let mut w = BitWriter::endian(&mut data, BigEndian);

            w.write::<16, u16>(A52_SYNCWORD).unwrap();
            w.write::<16, u16>(0xBEEF).unwrap();
            w.write::<2, u8>(fscod).unwrap();
            w.write::<6, u8>(frmsizecod).unwrap();
            w.write::<5, u8>(bsid).unwrap();
            w.write::<3, u8>(0x1).unwrap();
            w.write::<3, u8>(acmod).unwrap();
            if acmod & 0x1 != 0 && acmod != 0x1 {
                w.write::<2, u8>(0x3).unwrap();
            }
            if acmod & 0x4 != 0 {
                w.write::<2, u8>(0x3).unwrap();
            }
            if acmod == ACMOD_STEREO {
                w.write::<2, u8>(0x3).unwrap();
            }
            w.write_bit(lfeon).unwrap();
            w.byte_align().unwrap();
        }

        data.resize(AC3_MIN_SYNCFRAME_LENGTH, 0);
        data
    }

    #[test]
    fn parse_syncframe() -> Result<()> {
        let param = Ac3SpecificParameters::from_syncframe(&syncframe(0, 0x1C, 8, 7, true))?;
        assert_eq!(
            param,
            Ac3SpecificParameters {
                fscod: 0,
                bsid: 8,
                bsmod: 1,
                acmod: 7,
                lfeon: true,
                frmsizecod: 0x1C,
            }
        );
        assert_eq!(param.bit_rate(), Some(384));
        assert_eq!(param.frame_size(), Some(1536));
        assert_eq!(param.channel_count(), 6);

        // every optional mix level combination must land lfeon on the right bit
        for acmod in 0..8 {
            let param = Ac3SpecificParameters::from_syncframe(&syncframe(1, 0x09, 6, acmod, true))?;
            assert_eq!(param.acmod, acmod);
            assert!(param.lfeon);
            assert_eq!(param.frame_size(), Some(280));
        }

        Ok(())
    }

    #[test]
    fn reject_invalid_headers() {
        let kind = |data: &[u8]| {
            Ac3SpecificParameters::from_syncframe(data)
                .unwrap_err()
                .downcast::<SyncframeError>()
                .unwrap()
        };

        let full = syncframe(0, 0x10, 8, 2, false);
        for len in [0, 1, 7, AC3_MIN_SYNCFRAME_LENGTH - 1] {
            assert_eq!(
                kind(&full[..len]),
                SyncframeError::InsufficientData {
                    available: len,
                    required: AC3_MIN_SYNCFRAME_LENGTH
                }
            );
        }

        let mut bad_sync = full.clone();
        bad_sync[1] = 0x78;
        assert_eq!(kind(&bad_sync), SyncframeError::SyncwordMismatch(0x0B78));

        assert!(matches!(
            kind(&syncframe(3, 0x10, 8, 2, false)),
            SyncframeError::MalformedSyncframe { field: "fscod", .. }
        ));
        assert!(matches!(
            kind(&syncframe(0, 0x26, 8, 2, false)),
            SyncframeError::MalformedSyncframe {
                field: "frmsizecod",
                ..
            }
        ));

        for bsid in [10, 16, 31] {
            assert_eq!(
                kind(&syncframe(0, 0x10, bsid, 2, false)),
                SyncframeError::UnsupportedBitstream(bsid)
            );
        }
    }
}

//! AC-3 specific box (`dac3`).
//!
//! ```text
//! size(32) | type(32) | fscod(2) bsid(5) bsmod(3) acmod(3) lfeon(1) bit_rate_code(5) reserved(5)
//! ```

use anyhow::{Context, Result, bail};
use bitstream_io::{BigEndian, BitWrite, BitWriter};

use super::ac3::Ac3SpecificParameters;
use super::record::{self, DAC3};
use crate::utils::errors::RecordError;

/// Full record length with a compact box header.
pub const DAC3_RECORD_LENGTH: usize = 11;

/// Payload length without the box header.
pub const DAC3_PAYLOAD_LENGTH: usize = 3;

impl Ac3SpecificParameters {
    pub fn to_dac3(&self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(DAC3_RECORD_LENGTH);

        {
            let w = &mut BitWriter::endian(&mut data, BigEndian);

            w.write_from::<u32>(DAC3_RECORD_LENGTH as u32)
                .context("size")?;
            w.write_bytes(&DAC3).context("type")?;

            w.write::<2, u8>(self.fscod).context("fscod")?;
            w.write::<5, u8>(self.bsid).context("bsid")?;
            w.write::<3, u8>(self.bsmod).context("bsmod")?;
            w.write::<3, u8>(self.acmod).context("acmod")?;
            w.write_bit(self.lfeon).context("lfeon")?;
            w.write::<5, u8>(self.frmsizecod >> 1)
                .context("bit_rate_code")?;
            w.write::<5, u8>(0).context("reserved")?;

            w.byte_align().context("reserved")?;
        }

        Ok(data)
    }

    /// Decodes a complete `dac3` box, header included.
    pub fn from_dac3(data: &[u8]) -> Result<Self> {
        let payload = record::payload(data, DAC3_RECORD_LENGTH)?;
        Self::from_dac3_payload(payload)
    }

    /// Decodes the body of a `dac3` box whose header was already consumed by
    /// the container.
    pub fn from_dac3_payload(data: &[u8]) -> Result<Self> {
        if data.len() < DAC3_PAYLOAD_LENGTH {
            bail!(RecordError::TooShort {
                len: data.len(),
                min: DAC3_PAYLOAD_LENGTH,
            });
        }

        let (d0, d1, d2) = (data[0], data[1], data[2]);

        Ok(Self {
            fscod: d0 >> 6,
            bsid: (d0 >> 1) & 0x1F,
            bsmod: ((d0 & 0x1) << 2) | (d1 >> 6),
            acmod: (d1 >> 3) & 0x7,
            lfeon: (d1 >> 2) & 0x1 != 0,
            frmsizecod: (((d1 & 0x3) << 3) | (d2 >> 5)) << 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEREO_256K: Ac3SpecificParameters = Ac3SpecificParameters {
        fscod: 0,
        bsid: 8,
        bsmod: 0,
        acmod: 2,
        lfeon: false,
        frmsizecod: 0x20,
    };

    #[test]
    fn encode_stereo() -> Result<()> {
        assert_eq!(
            STEREO_256K.to_dac3()?,
            [0x00, 0x00, 0x00, 0x0B, b'd', b'a', b'c', b'3', 0x10, 0x12, 0x00]
        );

        Ok(())
    }

    #[test]
    fn round_trip() -> Result<()> {
        let param = Ac3SpecificParameters {
            fscod: 2,
            bsid: 6,
            bsmod: 7,
            acmod: 7,
            lfeon: true,
            frmsizecod: 0x24,
        };

        let data = param.to_dac3()?;
        assert_eq!(data.len(), DAC3_RECORD_LENGTH);
        assert_eq!(Ac3SpecificParameters::from_dac3(&data)?, param);
        assert_eq!(Ac3SpecificParameters::from_dac3_payload(&data[8..])?, param);

        // the odd padding code collapses onto its even sibling
        let padded = Ac3SpecificParameters {
            frmsizecod: 0x21,
            ..STEREO_256K
        };
        assert_eq!(
            Ac3SpecificParameters::from_dac3(&padded.to_dac3()?)?,
            STEREO_256K
        );

        Ok(())
    }

    #[test]
    fn round_trip_all_parameters() -> Result<()> {
        use crate::structs::ac3::{AC3_MAX_BSID, AC3_MAX_FRMSIZECOD, SAMPLE_RATES};

        for fscod in 0..SAMPLE_RATES.len() as u8 {
            for bsid in 0..=AC3_MAX_BSID {
                for bsmod in 0..8 {
                    for acmod in 0..8 {
                        for lfeon in [false, true] {
                            for frmsizecod in (0..=AC3_MAX_FRMSIZECOD).step_by(2) {
                                let param = Ac3SpecificParameters {
                                    fscod,
                                    bsid,
                                    bsmod,
                                    acmod,
                                    lfeon,
                                    frmsizecod,
                                };
                                param.validate()?;
                                assert_eq!(Ac3SpecificParameters::from_dac3(&param.to_dac3()?)?, param);
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    #[test]
    fn decode_largesize() -> Result<()> {
        let mut data = vec![0x00, 0x00, 0x00, 0x01, b'd', b'a', b'c', b'3'];
        data.extend_from_slice(&19u64.to_be_bytes());
        data.extend_from_slice(&[0x10, 0x12, 0x00]);

        assert_eq!(Ac3SpecificParameters::from_dac3(&data)?, STEREO_256K);

        Ok(())
    }

    #[test]
    fn reject_short_records() {
        let data = STEREO_256K.to_dac3().unwrap();

        let err = Ac3SpecificParameters::from_dac3(&data[..10]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RecordError>(),
            Some(&RecordError::TooShort { len: 10, min: 11 })
        );

        let err = Ac3SpecificParameters::from_dac3_payload(&data[8..10]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RecordError>(),
            Some(&RecordError::TooShort { len: 2, min: 3 })
        );

        let mut data = data;
        data[3] = 12;
        let err = Ac3SpecificParameters::from_dac3(&data).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RecordError>(),
            Some(&RecordError::SizeMismatch {
                declared: 12,
                actual: 11
            })
        );
    }
}

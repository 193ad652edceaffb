//! E-AC-3 specific box (`dec3`).
//!
//! ```text
//! size(32) | type(32) | data_rate(13) num_ind_sub(3)
//! per independent substream:
//!     fscod(2) bsid(5) bsmod(5) acmod(3) lfeon(1) reserved(3) num_dep_sub(4)
//!     chan_loc(9) if num_dep_sub > 0, else reserved(1)
//! ```
//!
//! bsmod is 5 bits wide here: the top two bits overlay the reserved and
//! asvc bits of the ETSI layout and are always written as 0 from a
//! syncframe.

use anyhow::{Context, Result, bail};
use bitstream_io::{BigEndian, BitWrite, BitWriter};

use super::eac3::{EAC3_MAX_INDEPENDENT_SUBSTREAMS, Eac3SpecificParameters, Eac3SubstreamInfo};
use super::record::{self, BOX_HEADER_SIZE, DEC3};
use crate::utils::errors::RecordError;

/// Shortest record: box header, data_rate/num_ind_sub and one substream.
pub const DEC3_MIN_RECORD_LENGTH: usize = 13;

impl Eac3SpecificParameters {
    pub fn to_dec3(&self) -> Result<Vec<u8>> {
        let count = self.independent_substreams.len();
        if count > EAC3_MAX_INDEPENDENT_SUBSTREAMS {
            bail!(RecordError::SubstreamCountExceeded(count));
        }
        if count == 0 {
            bail!(RecordError::NoSubstream);
        }

        let mut data = Vec::with_capacity(BOX_HEADER_SIZE + 2 + 4 * count);

        {
            let w = &mut BitWriter::endian(&mut data, BigEndian);

            // patched once the body length is known
            w.write_from::<u32>(0).context("size")?;
            w.write_bytes(&DEC3).context("type")?;

            w.write::<13, u16>(self.data_rate).context("data_rate")?;
            w.write::<3, u8>(self.num_ind_sub())
                .context("num_ind_sub")?;

            for ind_sub in &self.independent_substreams {
                w.write::<2, u8>(ind_sub.fscod).context("fscod")?;
                w.write::<5, u8>(ind_sub.bsid).context("bsid")?;
                w.write::<5, u8>(ind_sub.bsmod).context("bsmod")?;
                w.write::<3, u8>(ind_sub.acmod).context("acmod")?;
                w.write_bit(ind_sub.lfeon).context("lfeon")?;
                w.write::<3, u8>(0).context("reserved")?;

                w.write::<4, u8>(ind_sub.num_dep_sub)
                    .context("num_dep_sub")?;
                if ind_sub.num_dep_sub > 0 {
                    w.write::<9, u16>(ind_sub.chan_loc).context("chan_loc")?;
                } else {
                    w.write::<1, u8>(0).context("reserved")?;
                }
            }

            w.byte_align().context("reserved")?;
        }

        let size = data.len() as u32;
        data[..4].copy_from_slice(&size.to_be_bytes());

        Ok(data)
    }

    /// Decodes a complete `dec3` box, header included.
    ///
    /// fscod2 is not carried by the record and is left as 0.
    pub fn from_dec3(data: &[u8]) -> Result<Self> {
        let payload = record::payload(data, DEC3_MIN_RECORD_LENGTH)?;
        let body_offset = data.len() - payload.len();

        let data_rate = ((payload[0] as u16) << 5) | (payload[1] >> 3) as u16;
        let num_ind_sub = (payload[1] & 0x7) as usize;

        let mut independent_substreams = Vec::with_capacity(num_ind_sub + 1);
        let mut offset = 2;

        for _ in 0..=num_ind_sub {
            let Some(&[d0, d1, d2]) = payload.get(offset..offset + 3) else {
                bail!(RecordError::TooShort {
                    len: data.len(),
                    min: body_offset + offset + 3,
                });
            };
            offset += 3;

            let mut ind_sub = Eac3SubstreamInfo {
                fscod: d0 >> 6,
                fscod2: 0,
                bsid: (d0 >> 1) & 0x1F,
                bsmod: ((d0 & 0x1) << 4) | (d1 >> 4),
                acmod: (d1 >> 1) & 0x7,
                lfeon: d1 & 0x1 != 0,
                num_dep_sub: (d2 >> 1) & 0xF,
                chan_loc: 0,
            };

            if ind_sub.num_dep_sub > 0 {
                let Some(&d3) = payload.get(offset) else {
                    bail!(RecordError::TooShort {
                        len: data.len(),
                        min: body_offset + offset + 1,
                    });
                };
                offset += 1;

                ind_sub.chan_loc = (((d2 & 0x1) as u16) << 8) | d3 as u16;
            }

            independent_substreams.push(ind_sub);
        }

        Ok(Self {
            data_rate,
            independent_substreams,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo(num_dep_sub: u8, chan_loc: u16) -> Eac3SubstreamInfo {
        Eac3SubstreamInfo {
            fscod: 0,
            fscod2: 0,
            bsid: 16,
            bsmod: 0,
            acmod: 2,
            lfeon: false,
            num_dep_sub,
            chan_loc,
        }
    }

    #[test]
    fn encode_with_dependent_substream() -> Result<()> {
        let param = Eac3SpecificParameters {
            data_rate: 8,
            independent_substreams: vec![stereo(1, 0x004)],
        };

        assert_eq!(
            param.to_dec3()?,
            [
                0x00, 0x00, 0x00, 0x0E, b'd', b'e', b'c', b'3', 0x00, 0x40, 0x20, 0x04, 0x02, 0x04
            ]
        );

        Ok(())
    }

    #[test]
    fn round_trip() -> Result<()> {
        let param = Eac3SpecificParameters {
            data_rate: 0x1FFF,
            independent_substreams: vec![
                Eac3SubstreamInfo {
                    fscod: 1,
                    bsmod: 7,
                    acmod: 7,
                    lfeon: true,
                    num_dep_sub: 15,
                    chan_loc: 0x1FF,
                    ..stereo(0, 0)
                },
                stereo(0, 0),
                Eac3SubstreamInfo {
                    bsid: 10,
                    bsmod: 0x1F,
                    acmod: 0,
                    ..stereo(2, 0x104)
                },
            ],
        };

        let data = param.to_dec3()?;
        assert_eq!(data.len(), 8 + 2 + 4 + 3 + 4);
        assert_eq!(param.num_ind_sub(), 2);
        assert_eq!(Eac3SpecificParameters::from_dec3(&data)?, param);

        let mut large = data[..8].to_vec();
        large[3] = 1;
        large.extend_from_slice(&(data.len() as u64 + 8).to_be_bytes());
        large.extend_from_slice(&data[8..]);
        assert_eq!(Eac3SpecificParameters::from_dec3(&large)?, param);

        Ok(())
    }

    #[test]
    fn round_trip_field_sweep() -> Result<()> {
        let mut substreams = Vec::new();
        for fscod in 0..4 {
            for bsmod in 0..32 {
                for acmod in 0..8 {
                    for num_dep_sub in 0..16 {
                        let n = substreams.len();
                        substreams.push(Eac3SubstreamInfo {
                            fscod,
                            fscod2: 0,
                            bsid: (n % 32) as u8,
                            bsmod,
                            acmod,
                            lfeon: n % 3 == 0,
                            num_dep_sub,
                            chan_loc: if num_dep_sub > 0 { (n * 37 % 512) as u16 } else { 0 },
                        });
                    }
                }
            }
        }

        // records of 1 to 8 substreams in turn
        let mut rest = substreams.as_slice();
        let mut count = 1;
        while !rest.is_empty() {
            let (chunk, tail) = rest.split_at(count.min(rest.len()));
            rest = tail;

            let param = Eac3SpecificParameters {
                data_rate: (rest.len() * 97 % 0x2000) as u16,
                independent_substreams: chunk.to_vec(),
            };
            assert_eq!(Eac3SpecificParameters::from_dec3(&param.to_dec3()?)?, param);

            count = count % EAC3_MAX_INDEPENDENT_SUBSTREAMS + 1;
        }

        Ok(())
    }

    #[test]
    fn reject_substream_count() {
        let param = Eac3SpecificParameters {
            data_rate: 640,
            independent_substreams: vec![stereo(0, 0); 9],
        };
        let err = param.to_dec3().unwrap_err();
        assert_eq!(
            err.downcast_ref::<RecordError>(),
            Some(&RecordError::SubstreamCountExceeded(9))
        );

        let err = Eac3SpecificParameters::default().to_dec3().unwrap_err();
        assert_eq!(
            err.downcast_ref::<RecordError>(),
            Some(&RecordError::NoSubstream)
        );

        let param = Eac3SpecificParameters {
            data_rate: 640,
            independent_substreams: vec![stereo(0, 0); 8],
        };
        assert_eq!(param.to_dec3().unwrap().len(), 8 + 2 + 8 * 3);
    }

    #[test]
    fn reject_truncated_records() {
        let data = Eac3SpecificParameters {
            data_rate: 8,
            independent_substreams: vec![stereo(1, 0x004)],
        }
        .to_dec3()
        .unwrap();

        let err = Eac3SpecificParameters::from_dec3(&data[..12]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RecordError>(),
            Some(&RecordError::TooShort { len: 12, min: 13 })
        );

        // declared size agrees, but chan_loc is missing
        let mut truncated = data[..13].to_vec();
        truncated[3] = 13;
        let err = Eac3SpecificParameters::from_dec3(&truncated).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RecordError>(),
            Some(&RecordError::TooShort { len: 13, min: 14 })
        );

        // num_ind_sub announces a second substream that is not there
        let mut missing = data.clone();
        missing[9] |= 0x1;
        let err = Eac3SpecificParameters::from_dec3(&missing).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RecordError>(),
            Some(&RecordError::TooShort { len: 14, min: 17 })
        );
    }
}

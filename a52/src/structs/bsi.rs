//! E-AC-3 bit stream information (ETSI TS 102 366 Annex E.1.2.2).
//!
//! The `bsi()` element is described as a table of fields in bitstream order.
//! Each entry carries its width and a presence predicate evaluated against the
//! fields decoded so far, so one walker covers every conditional branch.
//! Fields wider than 32 bits (`mixdata`, `addbsi`) are skipped and recorded
//! as 0.

use std::io;

use log::trace;

use crate::utils::bitstream_io::BsIoSliceReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Syncword,
    Strmtyp,
    Substreamid,
    Frmsiz,
    Fscod,
    Fscod2,
    Numblkscod,
    Acmod,
    Lfeon,
    Bsid,
    Dialnorm,
    Compre,
    Compr,
    Dialnorm2,
    Compr2e,
    Compr2,
    Chanmape,
    Chanmap,
    Mixmdate,
    Dmixmod,
    LtrtCmixlev,
    LoroCmixlev,
    LtrtSurmixlev,
    LoroSurmixlev,
    Lfemixlevcode,
    Lfemixlevcod,
    Pgmscle,
    Pgmscl,
    Pgmscl2e,
    Pgmscl2,
    Extpgmscle,
    Extpgmscl,
    Mixdef,
    Premix,
    Mixdeflen,
    Mixdata,
    Paninfoe,
    Paninfo,
    Paninfo2e,
    Paninfo2,
    Frmmixcfginfoe,
    Blkmixcfginfoe0,
    Blkmixcfginfo0,
    Blkmixcfginfoe1,
    Blkmixcfginfo1,
    Blkmixcfginfoe2,
    Blkmixcfginfo2,
    Blkmixcfginfoe3,
    Blkmixcfginfo3,
    Blkmixcfginfoe4,
    Blkmixcfginfo4,
    Blkmixcfginfoe5,
    Blkmixcfginfo5,
    Infomdate,
    Bsmod,
    Copyrightb,
    Origbs,
    Dsurmod,
    Dheadphonmod,
    Dsurexmod,
    Audprodie,
    Audprodinfo,
    Audprodi2e,
    Audprodinfo2,
    Sourcefscod,
    Convsync,
    Blkid,
    Frmsizecod,
    Addbsie,
    Addbsil,
    Addbsi,
}

pub const FIELD_COUNT: usize = Field::Addbsi as usize + 1;

/// Audio blocks per syncframe, indexed by numblkscod.
pub const AUDIO_BLOCKS: [u8; 4] = [1, 2, 3, 6];

#[derive(Clone, Copy)]
pub enum Width {
    Bits(u32),
    /// Width computed from earlier fields.
    Derived(fn(&Bsi) -> u32),
}

#[derive(Clone, Copy)]
pub struct FieldSpec {
    pub field: Field,
    pub width: Width,
    pub present: fn(&Bsi) -> bool,
}

const fn always(_: &Bsi) -> bool {
    true
}

const fn bits(field: Field, width: u32) -> FieldSpec {
    FieldSpec {
        field,
        width: Width::Bits(width),
        present: always,
    }
}

const fn when(field: Field, width: u32, present: fn(&Bsi) -> bool) -> FieldSpec {
    FieldSpec {
        field,
        width: Width::Bits(width),
        present,
    }
}

fn mixing(b: &Bsi) -> bool {
    b.flag(Field::Mixmdate)
}

/// Program scale, mixdef, pan and mix configuration only exist in
/// independent substreams.
fn program_mixing(b: &Bsi) -> bool {
    mixing(b) && b.get(Field::Strmtyp) == 0
}

fn informational(b: &Bsi) -> bool {
    b.flag(Field::Infomdate)
}

fn mixdata_bits(b: &Bsi) -> u32 {
    match b.get(Field::Mixdef) {
        0x2 => 12,
        _ => 8 * (b.get(Field::Mixdeflen) + 2),
    }
}

fn addbsi_bits(b: &Bsi) -> u32 {
    (b.get(Field::Addbsil) + 1) * 8
}

fn blkmixcfginfoe(b: &Bsi, blk: usize) -> bool {
    b.flag(Field::Frmmixcfginfoe)
        && b.numblkscod() != 0
        && blk < AUDIO_BLOCKS[b.numblkscod() as usize] as usize
}

/// `bsi()` in bitstream order.
pub const BSI_FIELDS: &[FieldSpec] = &[
    bits(Field::Syncword, 16),
    bits(Field::Strmtyp, 2),
    bits(Field::Substreamid, 3),
    bits(Field::Frmsiz, 11),
    bits(Field::Fscod, 2),
    when(Field::Fscod2, 2, |b: &Bsi| b.get(Field::Fscod) == 0x3),
    when(Field::Numblkscod, 2, |b: &Bsi| b.get(Field::Fscod) != 0x3),
    bits(Field::Acmod, 3),
    bits(Field::Lfeon, 1),
    bits(Field::Bsid, 5),
    bits(Field::Dialnorm, 5),
    bits(Field::Compre, 1),
    when(Field::Compr, 8, |b: &Bsi| b.flag(Field::Compre)),
    // 1+1 dual mono
    when(Field::Dialnorm2, 5, |b: &Bsi| b.get(Field::Acmod) == 0x0),
    when(Field::Compr2e, 1, |b: &Bsi| b.get(Field::Acmod) == 0x0),
    when(Field::Compr2, 8, |b: &Bsi| b.flag(Field::Compr2e)),
    when(Field::Chanmape, 1, |b: &Bsi| b.get(Field::Strmtyp) == 0x1),
    when(Field::Chanmap, 16, |b: &Bsi| b.flag(Field::Chanmape)),
    // mixing metadata
    bits(Field::Mixmdate, 1),
    when(Field::Dmixmod, 2, |b: &Bsi| mixing(b) && b.get(Field::Acmod) > 0x2),
    when(Field::LtrtCmixlev, 3, |b: &Bsi| {
        mixing(b) && b.get(Field::Acmod) & 0x1 != 0 && b.get(Field::Acmod) > 0x2
    }),
    when(Field::LoroCmixlev, 3, |b: &Bsi| {
        mixing(b) && b.get(Field::Acmod) & 0x1 != 0 && b.get(Field::Acmod) > 0x2
    }),
    when(Field::LtrtSurmixlev, 3, |b: &Bsi| {
        mixing(b) && b.get(Field::Acmod) & 0x4 != 0
    }),
    when(Field::LoroSurmixlev, 3, |b: &Bsi| {
        mixing(b) && b.get(Field::Acmod) & 0x4 != 0
    }),
    when(Field::Lfemixlevcode, 1, |b: &Bsi| {
        mixing(b) && b.flag(Field::Lfeon)
    }),
    when(Field::Lfemixlevcod, 5, |b: &Bsi| b.flag(Field::Lfemixlevcode)),
    when(Field::Pgmscle, 1, program_mixing),
    when(Field::Pgmscl, 6, |b: &Bsi| b.flag(Field::Pgmscle)),
    when(Field::Pgmscl2e, 1, |b: &Bsi| {
        program_mixing(b) && b.get(Field::Acmod) == 0x0
    }),
    when(Field::Pgmscl2, 6, |b: &Bsi| b.flag(Field::Pgmscl2e)),
    when(Field::Extpgmscle, 1, program_mixing),
    when(Field::Extpgmscl, 6, |b: &Bsi| b.flag(Field::Extpgmscle)),
    when(Field::Mixdef, 2, program_mixing),
    // premixcmpsel, drcsrc, premixcmpscl
    when(Field::Premix, 5, |b: &Bsi| {
        program_mixing(b) && b.get(Field::Mixdef) == 0x1
    }),
    when(Field::Mixdeflen, 5, |b: &Bsi| {
        program_mixing(b) && b.get(Field::Mixdef) == 0x3
    }),
    FieldSpec {
        field: Field::Mixdata,
        width: Width::Derived(mixdata_bits),
        present: |b: &Bsi| program_mixing(b) && b.get(Field::Mixdef) >= 0x2,
    },
    when(Field::Paninfoe, 1, |b: &Bsi| {
        program_mixing(b) && b.get(Field::Acmod) < 0x2
    }),
    // panmean + paninfo
    when(Field::Paninfo, 14, |b: &Bsi| b.flag(Field::Paninfoe)),
    when(Field::Paninfo2e, 1, |b: &Bsi| {
        program_mixing(b) && b.get(Field::Acmod) == 0x0
    }),
    when(Field::Paninfo2, 14, |b: &Bsi| b.flag(Field::Paninfo2e)),
    when(Field::Frmmixcfginfoe, 1, program_mixing),
    when(Field::Blkmixcfginfoe0, 1, |b: &Bsi| blkmixcfginfoe(b, 0)),
    // a single block carries its configuration without a flag
    when(Field::Blkmixcfginfo0, 5, |b: &Bsi| {
        b.flag(Field::Blkmixcfginfoe0)
            || (b.flag(Field::Frmmixcfginfoe) && b.numblkscod() == 0)
    }),
    when(Field::Blkmixcfginfoe1, 1, |b: &Bsi| blkmixcfginfoe(b, 1)),
    when(Field::Blkmixcfginfo1, 5, |b: &Bsi| b.flag(Field::Blkmixcfginfoe1)),
    when(Field::Blkmixcfginfoe2, 1, |b: &Bsi| blkmixcfginfoe(b, 2)),
    when(Field::Blkmixcfginfo2, 5, |b: &Bsi| b.flag(Field::Blkmixcfginfoe2)),
    when(Field::Blkmixcfginfoe3, 1, |b: &Bsi| blkmixcfginfoe(b, 3)),
    when(Field::Blkmixcfginfo3, 5, |b: &Bsi| b.flag(Field::Blkmixcfginfoe3)),
    when(Field::Blkmixcfginfoe4, 1, |b: &Bsi| blkmixcfginfoe(b, 4)),
    when(Field::Blkmixcfginfo4, 5, |b: &Bsi| b.flag(Field::Blkmixcfginfoe4)),
    when(Field::Blkmixcfginfoe5, 1, |b: &Bsi| blkmixcfginfoe(b, 5)),
    when(Field::Blkmixcfginfo5, 5, |b: &Bsi| b.flag(Field::Blkmixcfginfoe5)),
    // informational metadata
    bits(Field::Infomdate, 1),
    when(Field::Bsmod, 3, informational),
    when(Field::Copyrightb, 1, informational),
    when(Field::Origbs, 1, informational),
    when(Field::Dsurmod, 2, |b: &Bsi| {
        informational(b) && b.get(Field::Acmod) == 0x2
    }),
    when(Field::Dheadphonmod, 2, |b: &Bsi| {
        informational(b) && b.get(Field::Acmod) == 0x2
    }),
    when(Field::Dsurexmod, 2, |b: &Bsi| {
        informational(b) && b.get(Field::Acmod) >= 0x6
    }),
    when(Field::Audprodie, 1, informational),
    // mixlevel, roomtyp, adconvtyp
    when(Field::Audprodinfo, 8, |b: &Bsi| b.flag(Field::Audprodie)),
    when(Field::Audprodi2e, 1, |b: &Bsi| {
        informational(b) && b.get(Field::Acmod) == 0x0
    }),
    when(Field::Audprodinfo2, 8, |b: &Bsi| b.flag(Field::Audprodi2e)),
    when(Field::Sourcefscod, 1, |b: &Bsi| {
        informational(b) && b.get(Field::Fscod) < 0x3
    }),
    when(Field::Convsync, 1, |b: &Bsi| {
        b.get(Field::Strmtyp) == 0x0 && b.numblkscod() != 0x3
    }),
    when(Field::Blkid, 1, |b: &Bsi| {
        b.get(Field::Strmtyp) == 0x2 && b.numblkscod() != 0x3
    }),
    when(Field::Frmsizecod, 6, |b: &Bsi| {
        b.get(Field::Strmtyp) == 0x2 && (b.numblkscod() == 0x3 || b.flag(Field::Blkid))
    }),
    bits(Field::Addbsie, 1),
    when(Field::Addbsil, 6, |b: &Bsi| b.flag(Field::Addbsie)),
    FieldSpec {
        field: Field::Addbsi,
        width: Width::Derived(addbsi_bits),
        present: |b: &Bsi| b.flag(Field::Addbsie),
    },
];

/// Decoded `bsi()` fields. Absent fields read as 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bsi {
    values: [Option<u32>; FIELD_COUNT],
}

impl Default for Bsi {
    fn default() -> Self {
        Self {
            values: [None; FIELD_COUNT],
        }
    }
}

impl Bsi {
    pub fn read(reader: &mut BsIoSliceReader) -> io::Result<Self> {
        let mut bsi = Self::default();

        for spec in BSI_FIELDS {
            if !(spec.present)(&bsi) {
                continue;
            }

            let width = match spec.width {
                Width::Bits(n) => n,
                Width::Derived(f) => f(&bsi),
            };

            let value = if width > u32::BITS {
                reader.skip_n(width)?;
                0
            } else {
                reader.get_n::<u32>(width)?
            };

            trace!("{:?} ({width}): {value:#X}", spec.field);
            bsi.values[spec.field as usize] = Some(value);
        }

        Ok(bsi)
    }

    /// Value of a field, `None` when its predicate did not hold.
    pub fn value(&self, field: Field) -> Option<u32> {
        self.values[field as usize]
    }

    pub fn get(&self, field: Field) -> u32 {
        self.value(field).unwrap_or(0)
    }

    pub fn flag(&self, field: Field) -> bool {
        self.get(field) != 0
    }

    /// numblkscod, implied as 3 (six blocks) for reduced sample rates.
    pub fn numblkscod(&self) -> u32 {
        if self.get(Field::Fscod) == 0x3 {
            0x3
        } else {
            self.get(Field::Numblkscod)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use bitstream_io::{BigEndian, BitWrite, BitWriter};

    #[test]
    fn walk_mixing_and_info_metadata() -> Result<()> {
        let mut data = Vec::new();
        let mut expected_bits = 0u32;
        {
            let mut w = BitWriter::endian(&mut data, BigEndian);
            let mut put = |n: u32, v: u32| {
                expected_bits += n;
                w.write_var::<u32>(n, v).unwrap();
            };

            put(16, 0x0B77);
            put(2, 0); // strmtyp
            put(3, 0); // substreamid
            put(11, 63); // frmsiz
            put(2, 0); // fscod
            put(2, 1); // numblkscod, two blocks
            put(3, 7); // acmod 3/2
            put(1, 1); // lfeon
            put(5, 16); // bsid
            put(5, 27); // dialnorm
            put(1, 1); // compre
            put(8, 0xA5); // compr
            put(1, 1); // mixmdate
            put(2, 1); // dmixmod
            put(6, 0b011_100); // ltrt/loro cmixlev
            put(6, 0b101_110); // ltrt/loro surmixlev
            put(1, 1); // lfemixlevcode
            put(5, 10); // lfemixlevcod
            put(1, 0); // pgmscle
            put(1, 1); // extpgmscle
            put(6, 33); // extpgmscl
            put(2, 3); // mixdef
            put(5, 2); // mixdeflen
            put(32, 0xDEAD_BEEF); // mixdata, 8 * (2 + 2)
            put(1, 1); // frmmixcfginfoe
            put(1, 1); // blkmixcfginfoe[0]
            put(5, 17); // blkmixcfginfo[0]
            put(1, 0); // blkmixcfginfoe[1]
            put(1, 1); // infomdate
            put(3, 5); // bsmod
            put(1, 1); // copyrightb
            put(1, 0); // origbs
            put(2, 2); // dsurexmod
            put(1, 0); // audprodie
            put(1, 1); // sourcefscod
            put(1, 1); // convsync
            put(1, 1); // addbsie
            put(6, 1); // addbsil
            put(16, 0x1234); // addbsi
            w.byte_align().unwrap();
        }
        data.resize(128, 0);

        let reader = &mut BsIoSliceReader::from_slice(&data);
        let bsi = Bsi::read(reader)?;

        assert_eq!(reader.position()?, expected_bits as u64);
        assert_eq!(bsi.get(Field::Acmod), 7);
        assert_eq!(bsi.get(Field::LoroSurmixlev), 0b110);
        assert_eq!(bsi.get(Field::Lfemixlevcod), 10);
        assert_eq!(bsi.value(Field::Pgmscl), None);
        assert_eq!(bsi.get(Field::Extpgmscl), 33);
        assert_eq!(bsi.get(Field::Mixdata), 0xDEAD_BEEF);
        assert_eq!(bsi.get(Field::Blkmixcfginfo0), 17);
        assert_eq!(bsi.value(Field::Blkmixcfginfo1), None);
        assert_eq!(bsi.value(Field::Blkmixcfginfoe2), None);
        assert_eq!(bsi.get(Field::Bsmod), 5);
        assert_eq!(bsi.value(Field::Dsurmod), None);
        assert_eq!(bsi.get(Field::Dsurexmod), 2);
        assert!(bsi.flag(Field::Convsync));
        assert_eq!(bsi.get(Field::Addbsi), 0x1234);

        Ok(())
    }

    #[test]
    fn reduced_rate_implies_six_blocks() -> Result<()> {
        let mut data = Vec::new();
        {
            let mut w = BitWriter::endian(&mut data, BigEndian);
            w.write::<16, u16>(0x0B77)?;
            w.write::<2, u8>(2)?; // strmtyp
            w.write::<3, u8>(0)?;
            w.write::<11, u16>(7)?;
            w.write::<2, u8>(3)?; // fscod
            w.write::<2, u8>(1)?; // fscod2
            w.write::<3, u8>(1)?; // acmod
            w.write_bit(false)?;
            w.write::<5, u8>(16)?;
            w.write::<5, u8>(31)?;
            w.write_bit(false)?; // compre
            w.write_bit(false)?; // mixmdate
            w.write_bit(false)?; // infomdate
            w.write::<6, u8>(0x2A)?; // frmsizecod, no blkid at six blocks
            w.write_bit(false)?; // addbsie
            w.byte_align()?;
        }
        data.resize(16, 0);

        let bsi = Bsi::read(&mut BsIoSliceReader::from_slice(&data))?;
        assert_eq!(bsi.value(Field::Numblkscod), None);
        assert_eq!(bsi.numblkscod(), 3);
        assert_eq!(bsi.get(Field::Fscod2), 1);
        assert_eq!(bsi.value(Field::Blkid), None);
        assert_eq!(bsi.get(Field::Frmsizecod), 0x2A);
        assert_eq!(bsi.value(Field::Bsmod), None);

        Ok(())
    }
}

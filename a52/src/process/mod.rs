use std::fmt::Display;

use anyhow::{Result, bail};

use crate::structs::ac3::{A52_SYNCWORD, AC3_MAX_BSID};
use crate::structs::eac3::{EAC3_MAX_BSID, EAC3_MIN_BSID};
use crate::utils::errors::SyncframeError;

/// E-AC-3 access unit assembly.
///
/// Provides the [`Assembler`](assemble::Assembler), which folds consecutive
/// syncframes into [`Eac3SpecificParameters`](crate::structs::eac3::Eac3SpecificParameters).
pub mod assemble;

/// One E-AC-3 access unit: a six block independent syncframe followed by a
/// dependent syncframe carrying one extra channel pair.
pub const EXAMPLE_DATA: &[u8] = &[
    0x0B, 0x77, 0x00, 0x07, 0x34, 0x87, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x0B, 0x77, 0x40, 0x07, 0x34, 0x87, 0xD0, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Bytes needed to reach bsid, which sits at bits 40..45 in both syncframe kinds.
pub const PROBE_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Ac3,
    Eac3,
}

impl Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Codec::Ac3 => write!(f, "AC-3"),
            Codec::Eac3 => write!(f, "E-AC-3"),
        }
    }
}

/// Identifies the codec of the syncframe at the start of `data` from its bsid.
pub fn probe(data: &[u8]) -> Result<Codec> {
    if data.len() < PROBE_LENGTH {
        bail!(SyncframeError::InsufficientData {
            available: data.len(),
            required: PROBE_LENGTH,
        });
    }

    let syncword = u16::from_be_bytes([data[0], data[1]]);
    if syncword != A52_SYNCWORD {
        bail!(SyncframeError::SyncwordMismatch(syncword));
    }

    match data[5] >> 3 {
        bsid if bsid <= AC3_MAX_BSID => Ok(Codec::Ac3),
        EAC3_MIN_BSID..=EAC3_MAX_BSID => Ok(Codec::Eac3),
        bsid => bail!(SyncframeError::UnsupportedBitstream(bsid)),
    }
}

#[test]
fn probe_codec() -> Result<()> {
    use crate::structs::ac3::tests::syncframe;

    assert_eq!(probe(EXAMPLE_DATA)?, Codec::Eac3);
    assert_eq!(probe(&syncframe(0, 0x10, 8, 2, false))?, Codec::Ac3);
    assert_eq!(probe(&syncframe(1, 0x10, 6, 7, true))?, Codec::Ac3);

    let err = probe(&syncframe(0, 0x10, 20, 2, false)).unwrap_err();
    assert_eq!(
        err.downcast_ref::<SyncframeError>(),
        Some(&SyncframeError::UnsupportedBitstream(20))
    );

    let err = probe(&EXAMPLE_DATA[..5]).unwrap_err();
    assert_eq!(
        err.downcast_ref::<SyncframeError>(),
        Some(&SyncframeError::InsufficientData {
            available: 5,
            required: PROBE_LENGTH
        })
    );

    Ok(())
}

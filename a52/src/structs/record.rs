//! Box framing shared by the `dac3` and `dec3` records.
//!
//! Both records are stored as plain ISO base media boxes: a 32-bit size, a
//! four character type, and the payload. A size of 1 escalates to a 64-bit
//! `largesize` following the type.

use anyhow::{Result, bail};

use crate::utils::errors::RecordError;

/// AC-3 specific box type.
pub const DAC3: [u8; 4] = *b"dac3";

/// E-AC-3 specific box type.
pub const DEC3: [u8; 4] = *b"dec3";

/// `size` + `type`.
pub const BOX_HEADER_SIZE: usize = 8;

/// `size` + `type` + `largesize`.
pub const LARGE_BOX_HEADER_SIZE: usize = 16;

/// Returns the four character type of a record, if the header is present.
pub fn box_type(data: &[u8]) -> Option<[u8; 4]> {
    data.get(4..8)?.try_into().ok()
}

/// Validates the declared size of a record against the supplied bytes and
/// returns the payload following the box header.
///
/// `min_len` is the smallest legal record length including the compact
/// 8-byte header.
pub fn payload(data: &[u8], min_len: usize) -> Result<&[u8]> {
    if data.len() < min_len {
        bail!(RecordError::TooShort {
            len: data.len(),
            min: min_len,
        });
    }

    let mut size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as u64;
    let mut header_size = BOX_HEADER_SIZE;

    if size == 1 {
        let min = min_len - BOX_HEADER_SIZE + LARGE_BOX_HEADER_SIZE;
        if data.len() < min {
            bail!(RecordError::TooShort {
                len: data.len(),
                min,
            });
        }

        let mut largesize = [0u8; 8];
        largesize.copy_from_slice(&data[8..16]);
        size = u64::from_be_bytes(largesize);
        header_size = LARGE_BOX_HEADER_SIZE;
    }

    if size != data.len() as u64 {
        bail!(RecordError::SizeMismatch {
            declared: size,
            actual: data.len(),
        });
    }

    Ok(&data[header_size..])
}

#[test]
fn compact_and_large_size() -> Result<()> {
    let compact = [0, 0, 0, 11, b'd', b'a', b'c', b'3', 0x10, 0x12, 0x00];
    assert_eq!(payload(&compact, 11)?, &[0x10, 0x12, 0x00]);
    assert_eq!(box_type(&compact), Some(DAC3));

    let mut large = vec![0, 0, 0, 1, b'd', b'a', b'c', b'3'];
    large.extend_from_slice(&19u64.to_be_bytes());
    large.extend_from_slice(&[0x10, 0x12, 0x00]);
    assert_eq!(payload(&large, 11)?, &[0x10, 0x12, 0x00]);

    let err = payload(&compact[..10], 11).unwrap_err();
    assert_eq!(
        err.downcast_ref::<RecordError>(),
        Some(&RecordError::TooShort { len: 10, min: 11 })
    );

    let mut wrong = compact.to_vec();
    wrong.push(0);
    let err = payload(&wrong, 11).unwrap_err();
    assert_eq!(
        err.downcast_ref::<RecordError>(),
        Some(&RecordError::SizeMismatch {
            declared: 11,
            actual: 12
        })
    );

    Ok(())
}

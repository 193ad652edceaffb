//! Bitstream I/O utilities for syncframe parsing.
//!
//! Thin MSB-first reader over [`bitstream_io::BitReader`] that reports
//! out-of-bounds reads as [`io::ErrorKind::UnexpectedEof`] with the failing
//! bit position attached.

use std::io;

use bitstream_io::{BigEndian, BitRead, BitReader, UnsignedInteger};

#[derive(Debug)]
pub struct BitstreamIoReader<R: io::Read + io::Seek> {
    bs: BitReader<R, BigEndian>,
    len: u64,
}

pub type BsIoSliceReader<'a> = BitstreamIoReader<io::Cursor<&'a [u8]>>;

impl<R> BitstreamIoReader<R>
where
    R: io::Read + io::Seek,
{
    pub fn new(read: R, len_bytes: u64) -> Self {
        Self {
            bs: BitReader::new(read),
            len: len_bytes << 3,
        }
    }

    #[inline(always)]
    pub fn get(&mut self) -> io::Result<bool> {
        self.bs.read_bit()
    }

    #[inline(always)]
    pub fn get_n<I: UnsignedInteger>(&mut self, n: u32) -> io::Result<I> {
        match self.bs.read_unsigned_var(n) {
            Ok(val) => Ok(val),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(self.out_of_bounds("get_n", n)),
            Err(e) => Err(e),
        }
    }

    #[inline(always)]
    pub fn skip_n(&mut self, n: u32) -> io::Result<()> {
        // mixdata and addbsi may run to several hundred bits
        if n as u64 > self.available()? {
            return Err(self.out_of_bounds("skip_n", n));
        }

        self.bs.skip(n)
    }

    #[inline(always)]
    pub fn available(&mut self) -> io::Result<u64> {
        self.bs
            .position_in_bits()
            .map(|pos| self.len.saturating_sub(pos))
    }

    #[inline(always)]
    pub fn position(&mut self) -> io::Result<u64> {
        self.bs.position_in_bits()
    }

    fn out_of_bounds(&mut self, op: &str, n: u32) -> io::Error {
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "{op}({n}): out of bounds bits at {}",
                self.bs.position_in_bits().unwrap_or(0)
            ),
        )
    }
}

impl<'a> BsIoSliceReader<'a> {
    pub fn from_slice(buf: &'a [u8]) -> Self {
        let len = buf.len() as u64;
        let read = io::Cursor::new(buf);

        Self::new(read, len)
    }
}

#[test]
fn read_past_end() {
    let mut reader = BsIoSliceReader::from_slice(&[0x0B, 0x77, 0xA5]);

    assert_eq!(reader.get_n::<u16>(16).unwrap(), 0x0B77);
    assert!(reader.get().unwrap());
    assert_eq!(reader.get_n::<u8>(3).unwrap(), 0b010);
    assert_eq!(reader.available().unwrap(), 4);

    let err = reader.get_n::<u8>(5).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);

    let mut reader = BsIoSliceReader::from_slice(&[0u8; 4]);
    assert!(reader.skip_n(33).is_err());
    reader.skip_n(32).unwrap();
    assert_eq!(reader.position().unwrap(), 32);
}

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::Result;

/// Input reader that handles both file and pipe input with buffered reading
pub struct InputReader {
    reader: Box<dyn Read>,
}

impl InputReader {
    /// Create a new InputReader from a path
    /// Use "-" for stdin pipe input
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let is_pipe = input_path.as_ref().as_os_str() == "-";

        let reader: Box<dyn Read> = if is_pipe {
            Box::new(io::stdin().lock())
        } else {
            let file = File::open(input_path)?;
            Box::new(BufReader::new(file))
        };

        Ok(Self { reader })
    }

    /// Read all remaining data. Syncframe headers and records are inspected
    /// from a single contiguous buffer.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_file() -> Result<()> {
        let path = std::env::temp_dir().join(format!("a52d-input-{}.bin", std::process::id()));
        std::fs::write(&path, [0x0B, 0x77, 0x00])?;

        let data = InputReader::new(&path)?.read_all()?;
        std::fs::remove_file(&path)?;

        assert_eq!(data, [0x0B, 0x77, 0x00]);
        assert!(InputReader::new(path).is_err());

        Ok(())
    }
}

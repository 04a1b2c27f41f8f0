//! Memory image files: the raw `EM` bytes of a built dictionary.

use super::Memory;
use crate::error;
use crate::lang::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use tracing::info;

type Result<T> = std::result::Result<T, Error>;

/// CRC-32 (IEEE) of the whole image.
pub fn checksum(mem: &Memory) -> u32 {
    crc::crc32::checksum_ieee(mem.as_bytes())
}

pub fn dump<P: AsRef<Path>>(mem: &Memory, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = match File::create(path) {
        Ok(file) => file,
        Err(error) => return Err(error!(InternalError; error.to_string())),
    };
    let mut writer = BufWriter::new(file);
    mem.write_to(&mut writer)?;
    if let Err(error) = writer.flush() {
        return Err(error!(InternalError; error.to_string()));
    }
    info!(path = %path.display(), crc = checksum(mem), "image written");
    Ok(())
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<Memory> {
    let path = path.as_ref();
    let mut reader = match File::open(path) {
        Ok(file) => BufReader::new(file),
        Err(error) => {
            let msg = format!("{}: {}", path.display(), error);
            match error.kind() {
                ErrorKind::NotFound => return Err(error!(FileNotFound; msg)),
                _ => return Err(error!(InternalError; msg)),
            }
        }
    };
    let mem = Memory::read_from(&mut reader)?;
    info!(path = %path.display(), crc = checksum(&mem), "image loaded");
    Ok(mem)
}

//! Legacy MS-DOS stub header.
//!
//! Every PE file starts with an MS-DOS executable stub whose header carries exactly one
//! field modern loaders care about: `e_lfanew`, the file offset of the PE signature. This
//! module validates the `MZ` signature and extracts that offset; the rest of the stub is
//! skipped, never interpreted.

use crate::{file::parser::Parser, Error, Result};

/// Absolute file offset of the `e_lfanew` field within the DOS header.
const E_LFANEW_OFFSET: usize = 60;

/// The legacy MS-DOS stub header at the very start of every PE file.
///
/// Only the two fields the PE loader uses are retained; the DOS program between them is
/// opaque filler of varying length.
///
/// # Examples
///
/// ```rust
/// use pescope::{DosHeader, Parser};
///
/// let mut stub = vec![0u8; 64];
/// stub[0] = b'M';
/// stub[1] = b'Z';
/// stub[60..64].copy_from_slice(&0x80u32.to_le_bytes());
///
/// let dos = DosHeader::read(&mut Parser::new(&stub))?;
/// assert_eq!(dos.e_lfanew, 0x80);
/// # Ok::<(), pescope::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DosHeader {
    /// Magic signature, always the two bytes `MZ`
    pub e_magic: [u8; 2],
    /// File offset of the PE signature ("offset to new exe header")
    pub e_lfanew: u32,
}

impl DosHeader {
    /// Read a [`DosHeader`] from the start of the input.
    ///
    /// Validates the `MZ` signature, then fetches `e_lfanew` at absolute offset 60. The
    /// cursor is left where the signature check ended; callers seek to `e_lfanew`
    /// themselves.
    ///
    /// # Arguments
    /// * `parser` - Cursor positioned at offset 0 of the file
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidSignature`] if the first two bytes are not `MZ`, and
    /// [`crate::Error::TruncatedInput`] if the input ends before the `e_lfanew` field.
    pub fn read(parser: &mut Parser) -> Result<DosHeader> {
        let magic = parser.read_bytes(2)?;
        if magic != b"MZ" {
            return Err(Error::InvalidSignature { expected: "MZ" });
        }

        let e_magic = [magic[0], magic[1]];
        let e_lfanew = parser.read_le_at::<u32>(E_LFANEW_OFFSET)?;

        Ok(DosHeader { e_magic, e_lfanew })
    }
}

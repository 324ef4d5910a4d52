//! COFF file header.
//!
//! The COFF header follows the 4-byte `PE\0\0` signature and describes the overall shape of
//! the image: target machine, section count, and the size of the optional header that comes
//! next. Its `number_of_sections` and `size_of_optional_header` fields drive the two
//! variable-length decoders downstream.
//!
//! # Reference
//! - [PE Format - COFF File Header](https://learn.microsoft.com/windows/win32/debug/pe-format#coff-file-header-object-and-image)

use bitflags::bitflags;

use crate::{file::parser::Parser, Error, Result};

bitflags! {
    /// Image characteristics flags from the COFF file header.
    ///
    /// Unknown bits are retained as-is; the decoder never rejects a file for carrying
    /// flags it does not know about.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileCharacteristics: u16 {
        /// Relocation information was stripped from the file
        const RELOCS_STRIPPED = 0x0001;
        /// The file is executable (no unresolved external references)
        const EXECUTABLE_IMAGE = 0x0002;
        /// COFF line numbers were stripped
        const LINE_NUMS_STRIPPED = 0x0004;
        /// COFF local symbols were stripped
        const LOCAL_SYMS_STRIPPED = 0x0008;
        /// Aggressively trim the working set (obsolete)
        const AGGRESSIVE_WS_TRIM = 0x0010;
        /// The image can handle addresses beyond 2 GB
        const LARGE_ADDRESS_AWARE = 0x0020;
        /// Little-endian byte order (obsolete)
        const BYTES_REVERSED_LO = 0x0080;
        /// Target machine uses 32-bit words
        const MACHINE_32BIT = 0x0100;
        /// Debugging information was stripped
        const DEBUG_STRIPPED = 0x0200;
        /// Copy to swap if the image lives on removable media
        const REMOVABLE_RUN_FROM_SWAP = 0x0400;
        /// Copy to swap if the image lives on network media
        const NET_RUN_FROM_SWAP = 0x0800;
        /// The image is a system file
        const SYSTEM = 0x1000;
        /// The image is a DLL
        const DLL = 0x2000;
        /// Run only on a uniprocessor machine
        const UP_SYSTEM_ONLY = 0x4000;
        /// Big-endian byte order (obsolete)
        const BYTES_REVERSED_HI = 0x8000;
    }
}

/// The COFF file header embedded in a PE image, following the `PE\0\0` signature.
#[derive(Debug)]
pub struct CoffHeader {
    /// Signature bytes, always `PE\0\0`
    pub signature: [u8; 4],
    /// Target machine type (raw wire value; unknown machines decode unchanged)
    pub machine: u16,
    /// Number of entries in the section table
    pub number_of_sections: u16,
    /// Link time as seconds since the Unix epoch
    pub time_date_stamp: u32,
    /// File offset of the COFF symbol table, zero if none
    pub pointer_to_symbol_table: u32,
    /// Number of entries in the symbol table
    pub number_of_symbols: u32,
    /// Size in bytes of the optional header that follows this record
    pub size_of_optional_header: u16,
    /// Image characteristics flags
    pub characteristics: FileCharacteristics,
}

impl CoffHeader {
    /// Read a [`CoffHeader`] at the cursor position.
    ///
    /// The cursor must sit on the `PE\0\0` signature (i.e. at the DOS header's `e_lfanew`
    /// offset); on success it is left on the first byte of the optional header.
    ///
    /// # Arguments
    /// * `parser` - Cursor positioned on the PE signature
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidSignature`] if the signature is not `PE\0\0`, and
    /// [`crate::Error::TruncatedInput`] if the fixed 20-byte record is cut short.
    pub fn read(parser: &mut Parser) -> Result<CoffHeader> {
        let magic = parser.read_bytes(4)?;
        if magic != b"PE\x00\x00" {
            return Err(Error::InvalidSignature { expected: "PE\\0\\0" });
        }

        let signature = [magic[0], magic[1], magic[2], magic[3]];
        let machine = parser.read_le::<u16>()?;
        let number_of_sections = parser.read_le::<u16>()?;
        let time_date_stamp = parser.read_le::<u32>()?;
        let pointer_to_symbol_table = parser.read_le::<u32>()?;
        let number_of_symbols = parser.read_le::<u32>()?;
        let size_of_optional_header = parser.read_le::<u16>()?;
        let characteristics = FileCharacteristics::from_bits_retain(parser.read_le::<u16>()?);

        Ok(CoffHeader {
            signature,
            machine,
            number_of_sections,
            time_date_stamp,
            pointer_to_symbol_table,
            number_of_symbols,
            size_of_optional_header,
            characteristics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            b'P', b'E', 0x00, 0x00, // signature
            0x64, 0x86,             // machine = 0x8664 (x64)
            0x07, 0x00,             // number_of_sections = 7
            0x22, 0x04, 0xFF, 0x5F, // time_date_stamp = 1610482722 (0x5FFF0422)
            0x00, 0x00, 0x00, 0x00, // pointer_to_symbol_table = 0
            0x00, 0x00, 0x00, 0x00, // number_of_symbols = 0
            0xF0, 0x00,             // size_of_optional_header = 240
            0x22, 0x00,             // characteristics = 0x0022
        ];

        let coff = CoffHeader::read(&mut Parser::new(&header_bytes)).unwrap();

        assert_eq!(coff.signature, *b"PE\x00\x00");
        assert_eq!(coff.machine, 0x8664);
        assert_eq!(coff.number_of_sections, 7);
        assert_eq!(coff.time_date_stamp, 0x5FFF_0422);
        assert_eq!(coff.pointer_to_symbol_table, 0);
        assert_eq!(coff.number_of_symbols, 0);
        assert_eq!(coff.size_of_optional_header, 240);
        assert_eq!(
            coff.characteristics,
            FileCharacteristics::EXECUTABLE_IMAGE | FileCharacteristics::LARGE_ADDRESS_AWARE
        );
    }

    #[test]
    fn wrong_signature() {
        let header_bytes = [b'P', b'E', 0x01, 0x00, 0, 0, 0, 0];
        let result = CoffHeader::read(&mut Parser::new(&header_bytes));
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidSignature {
                expected: "PE\\0\\0"
            }
        ));
    }

    #[test]
    fn truncated_record() {
        let header_bytes = [b'P', b'E', 0x00, 0x00, 0x64, 0x86];
        let result = CoffHeader::read(&mut Parser::new(&header_bytes));
        assert!(matches!(result.unwrap_err(), Error::TruncatedInput { .. }));
    }

    #[test]
    fn unknown_characteristics_bits_retained() {
        #[rustfmt::skip]
        let header_bytes = [
            b'P', b'E', 0x00, 0x00,
            0x4C, 0x01,             // machine = 0x014C (i386)
            0x01, 0x00,             // number_of_sections = 1
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0xE0, 0x00,             // size_of_optional_header = 224
            0x42, 0x00,             // characteristics: EXECUTABLE_IMAGE | 0x0040 (undefined)
        ];

        let coff = CoffHeader::read(&mut Parser::new(&header_bytes)).unwrap();
        assert_eq!(coff.characteristics.bits(), 0x0042);
        assert!(coff
            .characteristics
            .contains(FileCharacteristics::EXECUTABLE_IMAGE));
    }
}

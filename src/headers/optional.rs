//! Optional header decoding for both PE32 and PE32+ layouts.
//!
//! The "optional" header is mandatory for executable images and comes in two layouts
//! selected by a 2-byte magic read at runtime: `0x10B` (PE32, 32-bit) and `0x20B` (PE32+,
//! 64-bit). The layouts differ in width, not just content — PE32 carries a `base_of_data`
//! field and 4-byte image base and stack/heap sizes, PE32+ drops `base_of_data` and widens
//! those fields to 8 bytes. This module models the split as a tagged variant,
//! [`OptionalHeader`], decoded by explicit dispatch on the magic.
//!
//! The trailing data-directory array is *not* part of these records; its length comes from
//! [`WindowsFields32::number_of_rva_and_sizes`] (or the 64-bit twin) and it is decoded
//! separately by [`read_data_directories`].
//!
//! # Reference
//! - [PE Format - Optional Header](https://learn.microsoft.com/windows/win32/debug/pe-format#optional-header-image-only)

use bitflags::bitflags;

use crate::{file::parser::Parser, Error, Result};

/// Optional-header magic selecting the PE32 (32-bit) layout.
pub const MAGIC_PE32: u16 = 0x10B;
/// Optional-header magic selecting the PE32+ (64-bit) layout.
pub const MAGIC_PE32_PLUS: u16 = 0x20B;

/// Index of the import table entry within the data-directory array, by convention.
pub const IMPORT_TABLE_INDEX: usize = 1;

/// Which of the two optional-header layouts an image uses.
///
/// This is the single runtime decision point of the whole decode: it is taken once, when
/// the magic is read, and carried forward so every later width choice dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeFormat {
    /// PE32, the 32-bit layout (magic `0x10B`)
    Pe32,
    /// PE32+, the 64-bit layout (magic `0x20B`)
    Pe32Plus,
}

bitflags! {
    /// DLL characteristics flags from the Windows-specific optional header fields.
    ///
    /// Unknown bits are retained as-is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DllCharacteristics: u16 {
        /// Image can handle a high-entropy 64-bit virtual address space
        const HIGH_ENTROPY_VA = 0x0020;
        /// DLL can be relocated at load time
        const DYNAMIC_BASE = 0x0040;
        /// Code integrity checks are enforced
        const FORCE_INTEGRITY = 0x0080;
        /// Image is NX compatible
        const NX_COMPAT = 0x0100;
        /// Isolation aware, but do not isolate the image
        const NO_ISOLATION = 0x0200;
        /// No structured exception handling
        const NO_SEH = 0x0400;
        /// Do not bind the image
        const NO_BIND = 0x0800;
        /// Image must execute in an AppContainer
        const APPCONTAINER = 0x1000;
        /// A WDM driver
        const WDM_DRIVER = 0x2000;
        /// Image supports Control Flow Guard
        const GUARD_CF = 0x4000;
        /// Terminal Server aware
        const TERMINAL_SERVER_AWARE = 0x8000;
    }
}

/// Standard fields of the PE32 optional header.
///
/// `base_of_data` exists only in this layout; PE32+ drops it entirely.
#[derive(Debug, Clone)]
pub struct StandardFields32 {
    /// Layout magic, always `0x10B` for this record
    pub magic: u16,
    /// Linker major version
    pub major_linker_version: u8,
    /// Linker minor version
    pub minor_linker_version: u8,
    /// Size of the code (text) section(s)
    pub size_of_code: u32,
    /// Size of the initialized data section(s)
    pub size_of_initialized_data: u32,
    /// Size of the uninitialized data section(s)
    pub size_of_uninitialized_data: u32,
    /// RVA of the entry point
    pub address_of_entry_point: u32,
    /// RVA of the start of the code section
    pub base_of_code: u32,
    /// RVA of the start of the data section
    pub base_of_data: u32,
}

/// Standard fields of the PE32+ optional header.
#[derive(Debug, Clone)]
pub struct StandardFields64 {
    /// Layout magic, always `0x20B` for this record
    pub magic: u16,
    /// Linker major version
    pub major_linker_version: u8,
    /// Linker minor version
    pub minor_linker_version: u8,
    /// Size of the code (text) section(s)
    pub size_of_code: u32,
    /// Size of the initialized data section(s)
    pub size_of_initialized_data: u32,
    /// Size of the uninitialized data section(s)
    pub size_of_uninitialized_data: u32,
    /// RVA of the entry point
    pub address_of_entry_point: u32,
    /// RVA of the start of the code section
    pub base_of_code: u32,
}

/// Windows-specific fields of the PE32 optional header.
///
/// Image base and the four stack/heap sizes are 4 bytes wide in this layout.
#[derive(Debug, Clone)]
pub struct WindowsFields32 {
    /// Preferred load address of the image
    pub image_base: u32,
    /// Section alignment in memory
    pub section_alignment: u32,
    /// Section alignment in the file
    pub file_alignment: u32,
    /// Required OS major version
    pub major_operating_system_version: u16,
    /// Required OS minor version
    pub minor_operating_system_version: u16,
    /// Image major version
    pub major_image_version: u16,
    /// Image minor version
    pub minor_image_version: u16,
    /// Subsystem major version
    pub major_subsystem_version: u16,
    /// Subsystem minor version
    pub minor_subsystem_version: u16,
    /// Reserved, must be zero
    pub win32_version_value: u32,
    /// Size of the image in memory, including headers
    pub size_of_image: u32,
    /// Combined size of all headers, rounded to `file_alignment`
    pub size_of_headers: u32,
    /// Image checksum (not validated by this decoder)
    pub check_sum: u32,
    /// Required subsystem (raw wire value)
    pub subsystem: u16,
    /// DLL characteristics flags
    pub dll_characteristics: DllCharacteristics,
    /// Stack size to reserve
    pub size_of_stack_reserve: u32,
    /// Stack size to commit
    pub size_of_stack_commit: u32,
    /// Heap size to reserve
    pub size_of_heap_reserve: u32,
    /// Heap size to commit
    pub size_of_heap_commit: u32,
    /// Reserved, must be zero
    pub loader_flags: u32,
    /// Number of entries in the trailing data-directory array
    pub number_of_rva_and_sizes: u32,
}

/// Windows-specific fields of the PE32+ optional header.
///
/// Image base and the four stack/heap sizes widen to 8 bytes in this layout.
#[derive(Debug, Clone)]
pub struct WindowsFields64 {
    /// Preferred load address of the image
    pub image_base: u64,
    /// Section alignment in memory
    pub section_alignment: u32,
    /// Section alignment in the file
    pub file_alignment: u32,
    /// Required OS major version
    pub major_operating_system_version: u16,
    /// Required OS minor version
    pub minor_operating_system_version: u16,
    /// Image major version
    pub major_image_version: u16,
    /// Image minor version
    pub minor_image_version: u16,
    /// Subsystem major version
    pub major_subsystem_version: u16,
    /// Subsystem minor version
    pub minor_subsystem_version: u16,
    /// Reserved, must be zero
    pub win32_version_value: u32,
    /// Size of the image in memory, including headers
    pub size_of_image: u32,
    /// Combined size of all headers, rounded to `file_alignment`
    pub size_of_headers: u32,
    /// Image checksum (not validated by this decoder)
    pub check_sum: u32,
    /// Required subsystem (raw wire value)
    pub subsystem: u16,
    /// DLL characteristics flags
    pub dll_characteristics: DllCharacteristics,
    /// Stack size to reserve
    pub size_of_stack_reserve: u64,
    /// Stack size to commit
    pub size_of_stack_commit: u64,
    /// Heap size to reserve
    pub size_of_heap_reserve: u64,
    /// Heap size to commit
    pub size_of_heap_commit: u64,
    /// Reserved, must be zero
    pub loader_flags: u32,
    /// Number of entries in the trailing data-directory array
    pub number_of_rva_and_sizes: u32,
}

/// The complete PE32 optional header payload.
#[derive(Debug, Clone)]
pub struct OptionalHeader32 {
    /// Format-discriminating standard fields
    pub standard: StandardFields32,
    /// OS/loader fields
    pub windows: WindowsFields32,
}

/// The complete PE32+ optional header payload.
#[derive(Debug, Clone)]
pub struct OptionalHeader64 {
    /// Format-discriminating standard fields
    pub standard: StandardFields64,
    /// OS/loader fields
    pub windows: WindowsFields64,
}

/// The optional header of a PE image, in whichever of the two layouts the file uses.
///
/// The variant is selected once, by the magic value, and every field width downstream of
/// that choice follows from it. Accessors are provided for the fields callers need without
/// caring about the layout; everything else is reached by matching.
///
/// # Examples
///
/// ```rust,no_run
/// use pescope::{OptionalHeader, PeImage};
///
/// let image = PeImage::from_file("example.exe")?;
/// match &image.optional {
///     OptionalHeader::Pe32(header) => {
///         println!("PE32, data starts at RVA 0x{:x}", header.standard.base_of_data);
///     }
///     OptionalHeader::Pe32Plus(header) => {
///         println!("PE32+, image base 0x{:x}", header.windows.image_base);
///     }
/// }
/// # Ok::<(), pescope::Error>(())
/// ```
#[derive(Debug, Clone)]
pub enum OptionalHeader {
    /// 32-bit layout (magic `0x10B`)
    Pe32(OptionalHeader32),
    /// 64-bit layout (magic `0x20B`)
    Pe32Plus(OptionalHeader64),
}

impl OptionalHeader {
    /// Read an [`OptionalHeader`] at the cursor position.
    ///
    /// Reads the 2-byte magic and dispatches to the matching layout. On success the cursor
    /// is left on the first byte after the Windows-specific fields, i.e. on the
    /// data-directory array.
    ///
    /// # Arguments
    /// * `parser` - Cursor positioned on the optional-header magic
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidSignature`] for a magic that is neither `0x10B` nor
    /// `0x20B`, and [`crate::Error::TruncatedInput`] if either record is cut short.
    pub fn read(parser: &mut Parser) -> Result<OptionalHeader> {
        let magic = parser.read_le::<u16>()?;
        match magic {
            MAGIC_PE32 => Ok(OptionalHeader::Pe32(OptionalHeader32 {
                standard: StandardFields32::read(parser, magic)?,
                windows: WindowsFields32::read(parser)?,
            })),
            MAGIC_PE32_PLUS => Ok(OptionalHeader::Pe32Plus(OptionalHeader64 {
                standard: StandardFields64::read(parser, magic)?,
                windows: WindowsFields64::read(parser)?,
            })),
            _ => Err(Error::InvalidSignature {
                expected: "optional header magic",
            }),
        }
    }

    /// The layout this header uses.
    #[must_use]
    pub fn format(&self) -> PeFormat {
        match self {
            OptionalHeader::Pe32(_) => PeFormat::Pe32,
            OptionalHeader::Pe32Plus(_) => PeFormat::Pe32Plus,
        }
    }

    /// The raw magic value (`0x10B` or `0x20B`).
    #[must_use]
    pub fn magic(&self) -> u16 {
        match self {
            OptionalHeader::Pe32(header) => header.standard.magic,
            OptionalHeader::Pe32Plus(header) => header.standard.magic,
        }
    }

    /// RVA of the entry point.
    #[must_use]
    pub fn address_of_entry_point(&self) -> u32 {
        match self {
            OptionalHeader::Pe32(header) => header.standard.address_of_entry_point,
            OptionalHeader::Pe32Plus(header) => header.standard.address_of_entry_point,
        }
    }

    /// Preferred load address, widened to `u64` for the PE32 case.
    #[must_use]
    pub fn image_base(&self) -> u64 {
        match self {
            OptionalHeader::Pe32(header) => u64::from(header.windows.image_base),
            OptionalHeader::Pe32Plus(header) => header.windows.image_base,
        }
    }

    /// Required subsystem, as the raw wire value.
    #[must_use]
    pub fn subsystem(&self) -> u16 {
        match self {
            OptionalHeader::Pe32(header) => header.windows.subsystem,
            OptionalHeader::Pe32Plus(header) => header.windows.subsystem,
        }
    }

    /// DLL characteristics flags.
    #[must_use]
    pub fn dll_characteristics(&self) -> DllCharacteristics {
        match self {
            OptionalHeader::Pe32(header) => header.windows.dll_characteristics,
            OptionalHeader::Pe32Plus(header) => header.windows.dll_characteristics,
        }
    }

    /// Declared length of the data-directory array.
    #[must_use]
    pub fn number_of_rva_and_sizes(&self) -> u32 {
        match self {
            OptionalHeader::Pe32(header) => header.windows.number_of_rva_and_sizes,
            OptionalHeader::Pe32Plus(header) => header.windows.number_of_rva_and_sizes,
        }
    }
}

impl StandardFields32 {
    fn read(parser: &mut Parser, magic: u16) -> Result<StandardFields32> {
        Ok(StandardFields32 {
            magic,
            major_linker_version: parser.read_le::<u8>()?,
            minor_linker_version: parser.read_le::<u8>()?,
            size_of_code: parser.read_le::<u32>()?,
            size_of_initialized_data: parser.read_le::<u32>()?,
            size_of_uninitialized_data: parser.read_le::<u32>()?,
            address_of_entry_point: parser.read_le::<u32>()?,
            base_of_code: parser.read_le::<u32>()?,
            base_of_data: parser.read_le::<u32>()?,
        })
    }
}

impl StandardFields64 {
    fn read(parser: &mut Parser, magic: u16) -> Result<StandardFields64> {
        Ok(StandardFields64 {
            magic,
            major_linker_version: parser.read_le::<u8>()?,
            minor_linker_version: parser.read_le::<u8>()?,
            size_of_code: parser.read_le::<u32>()?,
            size_of_initialized_data: parser.read_le::<u32>()?,
            size_of_uninitialized_data: parser.read_le::<u32>()?,
            address_of_entry_point: parser.read_le::<u32>()?,
            base_of_code: parser.read_le::<u32>()?,
        })
    }
}

impl WindowsFields32 {
    fn read(parser: &mut Parser) -> Result<WindowsFields32> {
        Ok(WindowsFields32 {
            image_base: parser.read_le::<u32>()?,
            section_alignment: parser.read_le::<u32>()?,
            file_alignment: parser.read_le::<u32>()?,
            major_operating_system_version: parser.read_le::<u16>()?,
            minor_operating_system_version: parser.read_le::<u16>()?,
            major_image_version: parser.read_le::<u16>()?,
            minor_image_version: parser.read_le::<u16>()?,
            major_subsystem_version: parser.read_le::<u16>()?,
            minor_subsystem_version: parser.read_le::<u16>()?,
            win32_version_value: parser.read_le::<u32>()?,
            size_of_image: parser.read_le::<u32>()?,
            size_of_headers: parser.read_le::<u32>()?,
            check_sum: parser.read_le::<u32>()?,
            subsystem: parser.read_le::<u16>()?,
            dll_characteristics: DllCharacteristics::from_bits_retain(parser.read_le::<u16>()?),
            size_of_stack_reserve: parser.read_le::<u32>()?,
            size_of_stack_commit: parser.read_le::<u32>()?,
            size_of_heap_reserve: parser.read_le::<u32>()?,
            size_of_heap_commit: parser.read_le::<u32>()?,
            loader_flags: parser.read_le::<u32>()?,
            number_of_rva_and_sizes: parser.read_le::<u32>()?,
        })
    }
}

impl WindowsFields64 {
    fn read(parser: &mut Parser) -> Result<WindowsFields64> {
        Ok(WindowsFields64 {
            image_base: parser.read_le::<u64>()?,
            section_alignment: parser.read_le::<u32>()?,
            file_alignment: parser.read_le::<u32>()?,
            major_operating_system_version: parser.read_le::<u16>()?,
            minor_operating_system_version: parser.read_le::<u16>()?,
            major_image_version: parser.read_le::<u16>()?,
            minor_image_version: parser.read_le::<u16>()?,
            major_subsystem_version: parser.read_le::<u16>()?,
            minor_subsystem_version: parser.read_le::<u16>()?,
            win32_version_value: parser.read_le::<u32>()?,
            size_of_image: parser.read_le::<u32>()?,
            size_of_headers: parser.read_le::<u32>()?,
            check_sum: parser.read_le::<u32>()?,
            subsystem: parser.read_le::<u16>()?,
            dll_characteristics: DllCharacteristics::from_bits_retain(parser.read_le::<u16>()?),
            size_of_stack_reserve: parser.read_le::<u64>()?,
            size_of_stack_commit: parser.read_le::<u64>()?,
            size_of_heap_reserve: parser.read_le::<u64>()?,
            size_of_heap_commit: parser.read_le::<u64>()?,
            loader_flags: parser.read_le::<u32>()?,
            number_of_rva_and_sizes: parser.read_le::<u32>()?,
        })
    }
}

/// One (RVA, size) pair in the data-directory array.
///
/// Each index points at a well-known table by array-position convention; index 1 is the
/// import table this decoder consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataDirectory {
    /// RVA of the table this entry points at
    pub virtual_address: u32,
    /// Size of the table in bytes
    pub size: u32,
}

impl DataDirectory {
    /// Read a single [`DataDirectory`] entry at the cursor position.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if fewer than 8 bytes remain.
    pub fn read(parser: &mut Parser) -> Result<DataDirectory> {
        Ok(DataDirectory {
            virtual_address: parser.read_le::<u32>()?,
            size: parser.read_le::<u32>()?,
        })
    }

    /// An entry is empty iff both fields are zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.virtual_address == 0 && self.size == 0
    }
}

/// Read exactly `count` data-directory entries at the cursor position, in array order.
///
/// A count of zero produces an empty array and performs no compensating seek; the cursor
/// simply stays where the Windows-specific fields left it.
///
/// # Arguments
/// * `parser` - Cursor positioned on the first data-directory entry
/// * `count` - `number_of_rva_and_sizes` from the Windows-specific fields
///
/// # Errors
/// Returns [`crate::Error::TruncatedInput`] if the input ends before `count` entries.
pub fn read_data_directories(parser: &mut Parser, count: u32) -> Result<Vec<DataDirectory>> {
    // The count is header-controlled; cap the preallocation at the conventional 16 entries
    // and let the bounded read loop handle anything larger.
    let mut directories = Vec::with_capacity(count.min(16) as usize);
    for _ in 0..count {
        directories.push(DataDirectory::read(parser)?);
    }
    Ok(directories)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    fn pe32_bytes() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&[
            0x0B, 0x01,             // magic = 0x10B (PE32)
            0x0E, 0x1D,             // linker version 14.29
            0x00, 0x10, 0x00, 0x00, // size_of_code = 0x1000
            0x00, 0x20, 0x00, 0x00, // size_of_initialized_data = 0x2000
            0x00, 0x00, 0x00, 0x00, // size_of_uninitialized_data = 0
            0x50, 0x10, 0x00, 0x00, // address_of_entry_point = 0x1050
            0x00, 0x10, 0x00, 0x00, // base_of_code = 0x1000
            0x00, 0x30, 0x00, 0x00, // base_of_data = 0x3000
        ]);
        data.extend_from_slice(&[
            0x00, 0x00, 0x40, 0x00, // image_base = 0x400000
            0x00, 0x10, 0x00, 0x00, // section_alignment = 0x1000
            0x00, 0x02, 0x00, 0x00, // file_alignment = 0x200
            0x06, 0x00, 0x00, 0x00, // OS version 6.0
            0x01, 0x00, 0x00, 0x00, // image version 1.0
            0x06, 0x00, 0x00, 0x00, // subsystem version 6.0
            0x00, 0x00, 0x00, 0x00, // win32_version_value = 0
            0x00, 0x60, 0x00, 0x00, // size_of_image = 0x6000
            0x00, 0x04, 0x00, 0x00, // size_of_headers = 0x400
            0x00, 0x00, 0x00, 0x00, // check_sum = 0
            0x02, 0x00,             // subsystem = 2 (GUI)
            0x40, 0x81,             // dll_characteristics = 0x8140
            0x00, 0x00, 0x10, 0x00, // size_of_stack_reserve = 0x100000
            0x00, 0x10, 0x00, 0x00, // size_of_stack_commit = 0x1000
            0x00, 0x00, 0x10, 0x00, // size_of_heap_reserve = 0x100000
            0x00, 0x10, 0x00, 0x00, // size_of_heap_commit = 0x1000
            0x00, 0x00, 0x00, 0x00, // loader_flags = 0
            0x02, 0x00, 0x00, 0x00, // number_of_rva_and_sizes = 2
        ]);
        data
    }

    #[test]
    fn pe32_layout() {
        let data = pe32_bytes();
        let mut parser = Parser::new(&data);
        let header = OptionalHeader::read(&mut parser).unwrap();

        assert_eq!(header.format(), PeFormat::Pe32);
        assert_eq!(header.magic(), MAGIC_PE32);
        assert_eq!(header.address_of_entry_point(), 0x1050);
        assert_eq!(header.image_base(), 0x40_0000);
        assert_eq!(header.subsystem(), 2);
        assert_eq!(header.number_of_rva_and_sizes(), 2);

        let OptionalHeader::Pe32(header) = header else {
            panic!("expected PE32 layout");
        };
        assert_eq!(header.standard.major_linker_version, 14);
        assert_eq!(header.standard.minor_linker_version, 29);
        assert_eq!(header.standard.base_of_data, 0x3000);
        assert_eq!(header.windows.size_of_stack_reserve, 0x10_0000);
        assert!(header
            .windows
            .dll_characteristics
            .contains(DllCharacteristics::DYNAMIC_BASE | DllCharacteristics::NX_COMPAT));

        // PE32: 28 standard + 68 windows-specific bytes.
        assert_eq!(parser.pos(), 96);
    }

    #[rustfmt::skip]
    fn pe32_plus_bytes() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&[
            0x0B, 0x02,             // magic = 0x20B (PE32+)
            0x0E, 0x00,             // linker version 14.0
            0x00, 0x10, 0x00, 0x00, // size_of_code = 0x1000
            0x00, 0x20, 0x00, 0x00, // size_of_initialized_data = 0x2000
            0x00, 0x00, 0x00, 0x00, // size_of_uninitialized_data = 0
            0x00, 0x10, 0x00, 0x00, // address_of_entry_point = 0x1000
            0x00, 0x10, 0x00, 0x00, // base_of_code = 0x1000 (no base_of_data)
        ]);
        data.extend_from_slice(&[
            0x00, 0x00, 0x00, 0x40, 0x01, 0x00, 0x00, 0x00, // image_base = 0x140000000
            0x00, 0x10, 0x00, 0x00, // section_alignment = 0x1000
            0x00, 0x02, 0x00, 0x00, // file_alignment = 0x200
            0x06, 0x00, 0x00, 0x00, // OS version 6.0
            0x00, 0x00, 0x00, 0x00, // image version 0.0
            0x06, 0x00, 0x00, 0x00, // subsystem version 6.0
            0x00, 0x00, 0x00, 0x00, // win32_version_value = 0
            0x00, 0x60, 0x00, 0x00, // size_of_image = 0x6000
            0x00, 0x04, 0x00, 0x00, // size_of_headers = 0x400
            0x00, 0x00, 0x00, 0x00, // check_sum = 0
            0x03, 0x00,             // subsystem = 3 (console)
            0x60, 0x81,             // dll_characteristics = 0x8160
            0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, // size_of_stack_reserve
            0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // size_of_stack_commit
            0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, // size_of_heap_reserve
            0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // size_of_heap_commit
            0x00, 0x00, 0x00, 0x00, // loader_flags = 0
            0x10, 0x00, 0x00, 0x00, // number_of_rva_and_sizes = 16
        ]);
        data
    }

    #[test]
    fn pe32_plus_layout() {
        let data = pe32_plus_bytes();
        let mut parser = Parser::new(&data);
        let header = OptionalHeader::read(&mut parser).unwrap();

        assert_eq!(header.format(), PeFormat::Pe32Plus);
        assert_eq!(header.magic(), MAGIC_PE32_PLUS);
        assert_eq!(header.image_base(), 0x1_4000_0000);
        assert_eq!(header.subsystem(), 3);
        assert_eq!(header.number_of_rva_and_sizes(), 16);

        let OptionalHeader::Pe32Plus(header) = header else {
            panic!("expected PE32+ layout");
        };
        assert_eq!(header.windows.size_of_stack_reserve, 0x10_0000);
        assert_eq!(header.windows.size_of_heap_commit, 0x1000);

        // PE32+: 24 standard + 88 windows-specific bytes.
        assert_eq!(parser.pos(), 112);
    }

    #[test]
    fn unknown_magic() {
        let data = [0x0C, 0x01, 0x00, 0x00];
        let result = OptionalHeader::read(&mut Parser::new(&data));
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidSignature {
                expected: "optional header magic"
            }
        ));
    }

    #[test]
    fn truncated_windows_fields() {
        let data = pe32_bytes();
        let result = OptionalHeader::read(&mut Parser::new(&data[..40]));
        assert!(matches!(result.unwrap_err(), Error::TruncatedInput { .. }));
    }

    #[test]
    fn data_directories() {
        #[rustfmt::skip]
        let data = [
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // entry 0: empty
            0x00, 0x30, 0x00, 0x00, 0x64, 0x00, 0x00, 0x00, // entry 1: (0x3000, 100)
        ];
        let mut parser = Parser::new(&data);

        let directories = read_data_directories(&mut parser, 2).unwrap();
        assert_eq!(directories.len(), 2);
        assert!(directories[0].is_empty());
        assert!(!directories[1].is_empty());
        assert_eq!(directories[1].virtual_address, 0x3000);
        assert_eq!(directories[1].size, 100);
    }

    #[test]
    fn zero_data_directories() {
        let mut parser = Parser::new(&[0xFF; 8]);
        let directories = read_data_directories(&mut parser, 0).unwrap();
        assert!(directories.is_empty());
        // No compensating seek: the cursor has not moved.
        assert_eq!(parser.pos(), 0);
    }

    #[test]
    fn half_empty_entry_is_not_empty() {
        let entry = DataDirectory {
            virtual_address: 0,
            size: 128,
        };
        assert!(!entry.is_empty());
    }
}

//! # pescope
//!
//! A cross-platform library for parsing and inspecting Windows Portable Executable (PE)
//! files. `pescope` validates the format's structural signatures, decodes the fixed-layout
//! header records — including both the PE32 and PE32+ optional-header layouts — builds the
//! section table, and resolves the import directory into the ordered list of imported
//! module names.
//!
//! The decoder is strictly read-only: it never writes, patches, or re-serializes an image,
//! and it performs exactly the validation required to navigate the format safely (no
//! checksum or signature verification).
//!
//! # Architecture
//!
//! Decoding is a fixed pipeline over a bounds-checked byte cursor:
//!
//! - [`Parser`] - sequential/random-access reader with explicit little-endian decoding
//! - [`headers`] - pure record decoders (DOS, COFF, optional header, sections, imports)
//! - [`rva_to_offset`] - address-space translation through the ordered section table
//! - [`PeImage`] - the owned, immutable aggregate assembled once every stage succeeds
//!
//! Each decode call threads its own cursor over one input and shares nothing; concurrent
//! decodes of different inputs are trivially safe. Every failure is a typed [`Error`] — no
//! step logs, prints, or continues past a malformed field.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pescope::PeImage;
//! use std::path::Path;
//!
//! let image = PeImage::from_file(Path::new("example.exe"))?;
//!
//! println!("format:  {:?}", image.format());
//! println!("machine: 0x{:04X}", image.coff.machine);
//! println!("entry:   0x{:X}", image.optional.address_of_entry_point());
//!
//! for section in &image.sections {
//!     println!(
//!         "{:8} rva=0x{:08X} raw=0x{:08X}",
//!         section.name_str(),
//!         section.virtual_address,
//!         section.pointer_to_raw_data,
//!     );
//! }
//!
//! for module in &image.imported_modules {
//!     println!("imports {module}");
//! }
//! # Ok::<(), pescope::Error>(())
//! ```
//!
//! ## Decoding from memory
//!
//! ```rust,no_run
//! use pescope::PeImage;
//!
//! let data = std::fs::read("example.exe")?;
//! let image = PeImage::from_bytes(&data)?;
//! assert_eq!(image.sections.len(), usize::from(image.coff.number_of_sections));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Address translation
//!
//! ```rust,no_run
//! use pescope::PeImage;
//!
//! let data = std::fs::read("example.exe")?;
//! let image = PeImage::from_bytes(&data)?;
//!
//! // Where in the file does the entry point live?
//! let entry_offset = image.rva_to_offset(image.optional.address_of_entry_point())?;
//! println!("entry point at file offset 0x{entry_offset:X}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub(crate) mod error;
pub(crate) mod file;

/// PE header records and their decoders.
pub mod headers;

/// The decoded image aggregate and decode pipeline.
pub mod image;

/// `pescope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`], used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `pescope` Error type
///
/// The main error type for all operations in this crate. Each decode failure mode has its
/// own variant; see [`error`](crate::Error) for the full taxonomy.
pub use error::Error;

/// Low-level byte cursor used by every decoder.
///
/// Exposed so callers can build their own readers over PE-adjacent data.
pub use file::parser::Parser;

/// Main entry point: the fully decoded PE image.
pub use image::PeImage;

pub use headers::{
    coff::{CoffHeader, FileCharacteristics},
    dos::DosHeader,
    import::ImportDescriptor,
    optional::{
        DataDirectory, DllCharacteristics, OptionalHeader, OptionalHeader32, OptionalHeader64,
        PeFormat,
    },
    section::{rva_to_offset, SectionCharacteristics, SectionHeader},
};

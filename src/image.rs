//! The decoded PE image aggregate and the decode pipeline.
//!
//! [`PeImage`] is the single result type this crate produces: an owned, immutable snapshot
//! of everything the decoder read. It is assembled only after every stage of the pipeline
//! has succeeded — there is no partially populated image, ever.
//!
//! The pipeline runs strictly in sequence, each stage consuming fields the previous one
//! produced:
//!
//! ```text
//! DOS header ─e_lfanew─▶ COFF header ─┬─number_of_sections────────────┐
//!                                     └▶ optional header              │
//!                                         └─number_of_rva_and_sizes─▶ data directories
//!                                                                     ▼
//!                                  import walker ◀─entry 1── section table
//! ```
//!
//! Decoding borrows the caller's bytes for the duration of the call and releases them on
//! every exit path; the resulting image owns all of its data.

use std::{fs, path::Path};

use memmap2::Mmap;

use crate::{
    file::parser::Parser,
    headers::{
        coff::CoffHeader,
        dos::DosHeader,
        import::ImportDescriptor,
        optional::{
            read_data_directories, DataDirectory, OptionalHeader, PeFormat, IMPORT_TABLE_INDEX,
        },
        section::{read_section_table, rva_to_offset, SectionHeader},
    },
    Error, Result,
};

/// A fully decoded PE image.
///
/// All sub-records are owned by the image; the input buffer can be dropped as soon as
/// [`PeImage::from_bytes`] returns. Sections are kept in file order, which is load-bearing:
/// it determines which section wins RVA resolution when virtual ranges overlap.
///
/// # Examples
///
/// ```rust,no_run
/// use pescope::PeImage;
/// use std::path::Path;
///
/// let image = PeImage::from_file(Path::new("example.exe"))?;
///
/// println!("machine: 0x{:04X}", image.coff.machine);
/// println!("entry point RVA: 0x{:X}", image.optional.address_of_entry_point());
/// for section in &image.sections {
///     println!("{:8} @ 0x{:08X}", section.name_str(), section.virtual_address);
/// }
/// for module in &image.imported_modules {
///     println!("imports {module}");
/// }
/// # Ok::<(), pescope::Error>(())
/// ```
#[derive(Debug)]
pub struct PeImage {
    /// The MS-DOS stub header
    pub dos: DosHeader,
    /// The COFF file header
    pub coff: CoffHeader,
    /// The optional header, in whichever layout the file uses
    pub optional: OptionalHeader,
    /// The data-directory array, exactly `number_of_rva_and_sizes` entries
    pub data_directories: Vec<DataDirectory>,
    /// The section table, in file order
    pub sections: Vec<SectionHeader>,
    /// Import directory entries, sentinel excluded, in table order
    pub import_descriptors: Vec<ImportDescriptor>,
    /// Imported module names, one per descriptor, in descriptor order
    pub imported_modules: Vec<String>,
}

impl PeImage {
    /// Decode a PE image from a file on disk.
    ///
    /// The file is memory-mapped for the duration of the decode and unmapped on every
    /// return path, success or failure.
    ///
    /// # Arguments
    /// * `path` - Path to the PE file
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped, and any
    /// of the decode errors described on [`PeImage::from_bytes`].
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use pescope::PeImage;
    /// use std::path::Path;
    ///
    /// let image = PeImage::from_file(Path::new("example.exe"))?;
    /// println!("{} sections", image.sections.len());
    /// # Ok::<(), pescope::Error>(())
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<PeImage> {
        let file = fs::File::open(path)?;
        let map = unsafe { Mmap::map(&file) }?;

        Self::from_bytes(&map)
    }

    /// Decode a PE image from a byte buffer.
    ///
    /// The buffer is owned by the caller and only borrowed for the duration of this call;
    /// the returned image holds no reference into it.
    ///
    /// # Arguments
    /// * `data` - The complete file contents
    ///
    /// # Errors
    /// - [`crate::Error::InvalidSignature`] for a bad `MZ`, `PE\0\0`, or optional-header magic
    /// - [`crate::Error::TruncatedInput`] when any fixed-size field runs past the input
    /// - [`crate::Error::OutOfBounds`] when a header-derived seek target passes the end
    /// - [`crate::Error::UnmappedAddress`] when an import RVA is in no section's range
    /// - [`crate::Error::InvalidEncoding`] when an imported module name is not ASCII
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use pescope::PeImage;
    ///
    /// let data = std::fs::read("example.exe")?;
    /// let image = PeImage::from_bytes(&data)?;
    /// drop(data); // the image owns everything it decoded
    /// println!("{} imported modules", image.imported_modules.len());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_bytes(data: &[u8]) -> Result<PeImage> {
        let mut parser = Parser::new(data);

        let dos = DosHeader::read(&mut parser)?;
        parser.seek(dos.e_lfanew as usize)?;

        let coff = CoffHeader::read(&mut parser)?;
        let optional = OptionalHeader::read(&mut parser)?;
        let data_directories =
            read_data_directories(&mut parser, optional.number_of_rva_and_sizes())?;
        let sections = read_section_table(&mut parser, coff.number_of_sections)?;
        let (import_descriptors, imported_modules) =
            read_imports(&mut parser, &data_directories, &sections)?;

        Ok(PeImage {
            dos,
            coff,
            optional,
            data_directories,
            sections,
            import_descriptors,
            imported_modules,
        })
    }

    /// The layout (PE32 or PE32+) this image uses.
    #[must_use]
    pub fn format(&self) -> PeFormat {
        self.optional.format()
    }

    /// Resolve an RVA against this image's section table.
    ///
    /// First containing section in file order wins; see
    /// [`crate::headers::section::rva_to_offset`].
    ///
    /// # Errors
    /// Returns [`crate::Error::UnmappedAddress`] if no section contains `rva`.
    pub fn rva_to_offset(&self, rva: u32) -> Result<u64> {
        rva_to_offset(&self.sections, rva)
    }

    /// Find a section by its NUL-trimmed name.
    ///
    /// Names are not guaranteed unique; the first match in file order is returned.
    #[must_use]
    pub fn section_by_name(&self, name: &str) -> Option<&SectionHeader> {
        self.sections.iter().find(|s| s.name_str() == name)
    }

    /// Slice a section's raw data out of the caller's file buffer.
    ///
    /// The image does not retain the input, so the same bytes that were decoded must be
    /// passed back in to read section contents.
    ///
    /// # Arguments
    /// * `data` - The complete file contents the image was decoded from
    /// * `section` - The section whose raw data to slice
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the section's
    /// `[pointer_to_raw_data, pointer_to_raw_data + size_of_raw_data)` range does not fit
    /// in `data`.
    pub fn section_data<'a>(&self, data: &'a [u8], section: &SectionHeader) -> Result<&'a [u8]> {
        let start = u64::from(section.pointer_to_raw_data);
        let end = start + u64::from(section.size_of_raw_data);

        if end > data.len() as u64 {
            return Err(Error::OutOfBounds { offset: end });
        }

        Ok(&data[start as usize..end as usize])
    }
}

/// Reposition the cursor at a resolver-produced file offset.
fn seek_to(parser: &mut Parser, offset: u64) -> Result<()> {
    let pos = usize::try_from(offset).map_err(|_| Error::OutOfBounds { offset })?;
    parser.seek(pos)
}

/// Walk the import directory and resolve each imported module's name.
///
/// The walk only runs when the data-directory array has an import entry (index 1) with
/// both `virtual_address` and `size` nonzero; otherwise the import list is defined to be
/// empty and this is not an error. Descriptors are read until the all-zero sentinel, which
/// is discarded. Both loops are bounded by the input length: running off the end surfaces
/// as [`crate::Error::TruncatedInput`] from the cursor, never as an endless scan.
fn read_imports(
    parser: &mut Parser,
    directories: &[DataDirectory],
    sections: &[SectionHeader],
) -> Result<(Vec<ImportDescriptor>, Vec<String>)> {
    let Some(entry) = directories.get(IMPORT_TABLE_INDEX) else {
        return Ok((Vec::new(), Vec::new()));
    };
    if entry.virtual_address == 0 || entry.size == 0 {
        return Ok((Vec::new(), Vec::new()));
    }

    seek_to(parser, rva_to_offset(sections, entry.virtual_address)?)?;

    let mut descriptors = Vec::new();
    loop {
        let descriptor = ImportDescriptor::read(parser)?;
        if descriptor.is_null() {
            break;
        }
        descriptors.push(descriptor);
    }

    let mut modules = Vec::with_capacity(descriptors.len());
    for descriptor in &descriptors {
        seek_to(parser, rva_to_offset(sections, descriptor.name)?)?;
        modules.push(parser.read_string_ascii()?);
    }

    Ok((descriptors, modules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::section::SectionCharacteristics;

    fn section(virtual_address: u32, virtual_size: u32, raw: u32) -> SectionHeader {
        SectionHeader {
            name: *b".idata\0\0",
            virtual_size,
            virtual_address,
            size_of_raw_data: virtual_size,
            pointer_to_raw_data: raw,
            pointer_to_relocations: 0,
            pointer_to_linenumbers: 0,
            number_of_relocations: 0,
            number_of_linenumbers: 0,
            characteristics: SectionCharacteristics::empty(),
        }
    }

    fn descriptor(name_rva: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x3100u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&name_rva.to_le_bytes());
        bytes.extend_from_slice(&0x3200u32.to_le_bytes());
        bytes
    }

    #[test]
    fn missing_entry_means_no_imports() {
        let mut parser = Parser::new(&[]);
        let (descriptors, modules) = read_imports(&mut parser, &[], &[]).unwrap();
        assert!(descriptors.is_empty());
        assert!(modules.is_empty());
    }

    #[test]
    fn empty_entry_means_no_imports() {
        let directories = vec![
            DataDirectory {
                virtual_address: 0,
                size: 0,
            },
            DataDirectory {
                virtual_address: 0,
                size: 0,
            },
        ];
        let mut parser = Parser::new(&[]);
        let (descriptors, modules) = read_imports(&mut parser, &directories, &[]).unwrap();
        assert!(descriptors.is_empty());
        assert!(modules.is_empty());
    }

    #[test]
    fn walks_until_sentinel() {
        // Import data mapped at RVA 0x3000, file offset 0.
        let mut data = Vec::new();
        data.extend_from_slice(&descriptor(0x3080)); // names placed after the table
        data.extend_from_slice(&descriptor(0x308D));
        data.extend_from_slice(&[0u8; 20]); // sentinel
        data.resize(0x80, 0);
        data.extend_from_slice(b"KERNEL32.dll\0");
        data.extend_from_slice(b"USER32.dll\0");

        let directories = vec![
            DataDirectory {
                virtual_address: 0,
                size: 0,
            },
            DataDirectory {
                virtual_address: 0x3000,
                size: 40,
            },
        ];
        let sections = vec![section(0x3000, 0x1000, 0)];

        let mut parser = Parser::new(&data);
        let (descriptors, modules) =
            read_imports(&mut parser, &directories, &sections).unwrap();

        assert_eq!(descriptors.len(), 2);
        assert_eq!(modules, vec!["KERNEL32.dll", "USER32.dll"]);
    }

    #[test]
    fn unresolvable_name_rva_fails() {
        let mut data = Vec::new();
        data.extend_from_slice(&descriptor(0x9000)); // RVA outside every section
        data.extend_from_slice(&[0u8; 20]);

        let directories = vec![
            DataDirectory {
                virtual_address: 0,
                size: 0,
            },
            DataDirectory {
                virtual_address: 0x3000,
                size: 40,
            },
        ];
        let sections = vec![section(0x3000, 0x1000, 0)];

        let mut parser = Parser::new(&data);
        let result = read_imports(&mut parser, &directories, &sections);
        assert!(matches!(
            result.unwrap_err(),
            Error::UnmappedAddress { rva: 0x9000 }
        ));
    }

    #[test]
    fn missing_sentinel_is_truncated_not_endless() {
        let mut data = Vec::new();
        data.extend_from_slice(&descriptor(0x3080));
        // No sentinel, no more data: the walk must stop with an error.

        let directories = vec![
            DataDirectory {
                virtual_address: 0,
                size: 0,
            },
            DataDirectory {
                virtual_address: 0x3000,
                size: 40,
            },
        ];
        let sections = vec![section(0x3000, 0x1000, 0)];

        let mut parser = Parser::new(&data);
        let result = read_imports(&mut parser, &directories, &sections);
        assert!(matches!(result.unwrap_err(), Error::TruncatedInput { .. }));
    }
}

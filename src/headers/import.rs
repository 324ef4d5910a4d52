//! Import directory table records.
//!
//! The import directory is a sentinel-terminated array of fixed 20-byte descriptors, one
//! per imported module. This module defines the record itself; the walk over the array —
//! including resolution of each descriptor's name RVA — lives in [`crate::image`], because
//! it needs the section table to translate addresses.
//!
//! # Reference
//! - [PE Format - Import Directory Table](https://learn.microsoft.com/windows/win32/debug/pe-format#import-directory-table)

use crate::{file::parser::Parser, Result};

/// One import directory entry describing a single imported module.
#[derive(Debug, Clone, Copy)]
pub struct ImportDescriptor {
    /// RVA of the import lookup table (original first thunk)
    pub original_first_thunk: u32,
    /// Bind timestamp, zero until the image is bound
    pub time_date_stamp: u32,
    /// Index of the first forwarder reference
    pub forwarder_chain: u32,
    /// RVA of the NUL-terminated ASCII module name
    pub name: u32,
    /// RVA of the import address table (first thunk)
    pub first_thunk: u32,
}

impl ImportDescriptor {
    /// Read one fixed 20-byte [`ImportDescriptor`] at the cursor position.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if the record is cut short.
    pub fn read(parser: &mut Parser) -> Result<ImportDescriptor> {
        Ok(ImportDescriptor {
            original_first_thunk: parser.read_le::<u32>()?,
            time_date_stamp: parser.read_le::<u32>()?,
            forwarder_chain: parser.read_le::<u32>()?,
            name: parser.read_le::<u32>()?,
            first_thunk: parser.read_le::<u32>()?,
        })
    }

    /// Whether this record is the all-zero sentinel terminating the descriptor array.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.original_first_thunk == 0
            && self.time_date_stamp == 0
            && self.forwarder_chain == 0
            && self.name == 0
            && self.first_thunk == 0
    }
}

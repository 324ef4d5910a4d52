use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure mode of the decoder maps onto exactly one variant, so callers can match on
/// the condition they care about without string inspection. Decoding is all-or-nothing: any
/// of these errors aborts the decode and no partial [`crate::PeImage`] is ever produced.
///
/// # Error Categories
///
/// ## Structural Errors
/// - [`Error::InvalidSignature`] - A fixed magic/signature byte sequence did not match
/// - [`Error::TruncatedInput`] - Fewer bytes remained than a fixed-size field required
/// - [`Error::OutOfBounds`] - A seek target exceeded the input's extent
///
/// ## Address and Content Errors
/// - [`Error::UnmappedAddress`] - An RVA was not covered by any section's virtual range
/// - [`Error::InvalidEncoding`] - A string field held bytes outside the ASCII range
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// # Examples
///
/// ```rust,no_run
/// use pescope::{Error, PeImage};
/// use std::path::Path;
///
/// match PeImage::from_file(Path::new("example.exe")) {
///     Ok(image) => {
///         println!("Decoded {} sections", image.sections.len());
///     }
///     Err(Error::InvalidSignature { expected }) => {
///         eprintln!("Not a PE file: expected {expected} signature");
///     }
///     Err(Error::TruncatedInput { offset, needed }) => {
///         eprintln!("File cut short: needed {needed} byte(s) at offset {offset}");
///     }
///     Err(e) => {
///         eprintln!("Decode failed: {e}");
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A fixed magic/signature byte sequence did not match.
    ///
    /// Raised for the DOS `MZ` signature, the `PE\0\0` signature, and the
    /// optional-header magic. Always fatal; the decode aborts immediately.
    #[error("Signature mismatch - expected {expected}")]
    InvalidSignature {
        /// Human-readable marker for the signature that was expected
        expected: &'static str,
    },

    /// Fewer bytes remained in the input than a fixed-size field required.
    ///
    /// Truncated reads consume nothing: the cursor position is unchanged and
    /// no partial value is produced.
    #[error("Truncated input - needed {needed} byte(s) at offset {offset}")]
    TruncatedInput {
        /// Input offset at which the read was attempted
        offset: usize,
        /// Number of bytes the field required
        needed: usize,
    },

    /// A seek target exceeded the input's extent.
    #[error("Out of bounds - offset {offset} exceeds the input length")]
    OutOfBounds {
        /// The offending absolute offset
        offset: u64,
    },

    /// A relative virtual address was not covered by any section's virtual range.
    ///
    /// This occurs for directory entries pointing into header space, and for
    /// corrupt or adversarial files. Header state decoded before the failing
    /// resolution is well-formed; the decode still aborts without a result.
    #[error("Unmapped address - RVA 0x{rva:08X} is not contained in any section")]
    UnmappedAddress {
        /// The RVA that no section contains
        rva: u32,
    },

    /// A string field held bytes outside the ASCII range.
    ///
    /// Imported module names are defined to be ASCII; anything else is rejected
    /// rather than decoded lossily.
    #[error("Invalid encoding - non-ASCII byte at offset {offset}")]
    InvalidEncoding {
        /// Input offset of the first offending byte
        offset: usize,
    },

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while opening or mapping the
    /// input file, such as missing files or permission issues.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}

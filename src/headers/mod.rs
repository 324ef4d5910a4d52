//! PE header records and their decoders.
//!
//! Each submodule owns one record family of the PE format, decoded strictly in the order
//! the format lays them out:
//!
//! 1. [`crate::headers::dos`] - the MS-DOS stub header (`MZ`, `e_lfanew`)
//! 2. [`crate::headers::coff`] - the COFF file header (`PE\0\0`, machine, section count)
//! 3. [`crate::headers::optional`] - the PE32/PE32+ optional header and data directories
//! 4. [`crate::headers::section`] - the section table and RVA-to-offset resolution
//! 5. [`crate::headers::import`] - import directory records
//!
//! Every decoder is a pure function from a cursor position to a record: no decoder holds
//! state, logs, or reaches around the cursor it is given. The sequencing between them —
//! who seeks where, and which field of one record sizes the next — is the job of
//! [`crate::image::PeImage`].

pub mod coff;
pub mod dos;
pub mod import;
pub mod optional;
pub mod section;

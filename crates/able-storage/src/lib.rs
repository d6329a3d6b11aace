//! Upload storage for applicant files.
//!
//! Resumes and certificates are kept on local disk with a size cap and a
//! pdf/doc/docx allowlist.

pub mod error;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use store::{mime_for, UploadKind, UploadStore, MAX_UPLOAD_BYTES};

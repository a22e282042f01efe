//! # exh-storage: Blob Storage for Uploaded Files
//!
//! The exchange core persists file bytes through the [`BlobStore`] trait and
//! never assumes a particular backend. Two backends ship here:
//!
//! - [`LocalBlobStore`]: files under a root directory, fsynced and renamed
//!   into place before `put` returns.
//! - [`MemoryBlobStore`]: a map in memory, with a switch to make writes fail.
//!
//! Locators are relative slash-separated paths built by [`BlobLocator`]:
//! `{kind}/{yyyy}/{mm}/{dd}/{originId}_{seq:04}.pdf`.

pub mod error;
pub mod local;
pub mod locator;
pub mod memory;
pub mod traits;

pub use error::StorageError;
pub use local::LocalBlobStore;
pub use locator::BlobLocator;
pub use memory::MemoryBlobStore;
pub use traits::{BackendType, BlobRef, BlobStore, PDF_CONTENT_TYPE};

//! Core library: filename codec, content parsing, tag index, search and the
//! document store tying them to the folder providers.

pub mod archive;
pub mod config;
pub mod dates;
pub mod error;
pub mod extractor;
pub mod filename;
pub mod models;
pub mod search;
pub mod store;
pub mod tag_index;

pub use error::{ArchiveError, StoreError};
pub use models::{Document, DocumentEdit, TaggingStatus};
pub use store::{ArchiveSnapshot, DocumentStore, StoreOptions, StoreState};

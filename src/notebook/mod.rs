//! Notebook resources
//!
//! Typed listing records and the name cache capability used by the gate.

pub mod cache;
pub mod types;

pub use cache::{InMemoryNotebookCache, NotebookCache};
pub use types::{NamedResource, NotebookRecord, PageRecord, SectionRecord, decode_listing};

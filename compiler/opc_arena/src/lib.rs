//! Blob arena for opc literal values.
//!
//! Every literal scalar in a document (numbers, strings, booleans, raw file
//! contents) lives in one [`BlobArena`] owned by the document root. Handles
//! alias allocations copy-on-write: [`BlobArena::duplicate`] shares bytes for
//! free, [`BlobArena::set`] always writes into fresh storage. The arena never
//! holds more than its byte quota of live allocations.
//!
//! Two layers:
//! - [`BlobArena`]: the raw handle-based table (`set`/`get`/`duplicate`/`free`/`purge`).
//! - [`SharedArena`] + [`Blob`]: single-threaded shared ownership with an RAII
//!   handle whose `Clone` duplicates and whose `Drop` frees.

mod arena;
mod blob;
mod error;
mod ids;

pub use arena::BlobArena;
pub use blob::{Blob, SharedArena};
pub use error::ArenaError;
pub use ids::{AllocId, HandleId};

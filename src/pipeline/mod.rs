//! Archive pipeline
//!
//! Ties the pieces together for a batch:
//! - Verifying the session and enumerating the user's entries
//! - Extracting, downloading and writing each entry
//! - Collecting a per-entry result into a [`BatchReport`](crate::output::BatchReport)

mod coordinator;

pub use coordinator::Archiver;

//! Shared error classification for plugsync crates.

mod ext;
mod status_code;

pub use ext::ErrorExt;
pub use ext::PlainError;
pub use status_code::StatusCategory;
pub use status_code::StatusCode;
pub use status_code::StatusMeta;

pub mod link;
pub mod note;

pub use link::Link;
pub use note::{Note, NotePayload, NoteWithLinks};

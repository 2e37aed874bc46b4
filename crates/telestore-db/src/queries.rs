//! Database query functions organized by collection.

pub mod entities;
pub mod sent_files;
pub mod sessions;
pub mod update_states;
pub mod version;

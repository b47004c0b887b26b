//! Storage implementations

pub mod in_memory;

pub use in_memory::{
    InMemoryStore, Reference, Session, Stored, Tables, WriteSession, attach_related, split_path,
};

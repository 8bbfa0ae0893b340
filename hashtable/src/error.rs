use thiserror::Error;

/// Errors raised by table construction and mutation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HashTableError {
    /// A table was constructed with a capacity of zero.
    #[error("table capacity must be greater than zero")]
    InvalidCapacity,

    /// The key's textual encoding is empty where a usable key is required.
    #[error("key must not be empty")]
    NullKey,

    /// An entry with this key is already stored.
    #[error("an entry with this key already exists")]
    DuplicateKey,

    /// No entry with this key is stored.
    #[error("no entry found for this key")]
    KeyNotFound,

    /// The open-addressing table has no open slot left for an insertion.
    #[error("hash table is full")]
    TableFull,
}

pub type Result<T> = std::result::Result<T, HashTableError>;

// src/schema/types.rs

use thiserror::Error;

/// Ordered `(old_name, new_name)` pairs for one survey year.
///
/// Kept as a list rather than a map so that a repeated key can be seen
/// and rejected by [`safe_rename`](super::rename::safe_rename).
pub type RenameMap = Vec<(String, String)>;

/// Why a strict rename was refused.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RenameError {
    #[error("Rename dict contains duplicate keys: `{0}`")]
    DuplicateKey(String),

    #[error("Rename dict contains duplicate values: `{0}`")]
    DuplicateValue(String),

    #[error("`{0}` already present in table")]
    AlreadyPresent(String),

    #[error("`{0}` not in table")]
    Missing(String),
}

// src/schema/rename.rs

use std::collections::HashSet;
use tracing::debug;

use super::types::{RenameError, RenameMap};
use crate::process::raw_table::SurveyTable;

/// Renames columns of `table` in a strict manner.
///
/// Old column names must exist, new ones must not, and the rename list may
/// not repeat a key or a value. Every check runs before any header is
/// touched, so on error the table is unchanged.
pub fn safe_rename(table: &mut SurveyTable, renames: &RenameMap) -> Result<(), RenameError> {
    let mut keys = HashSet::with_capacity(renames.len());
    for (old, _) in renames {
        if !keys.insert(old.as_str()) {
            return Err(RenameError::DuplicateKey(old.clone()));
        }
    }

    let mut values = HashSet::with_capacity(renames.len());
    for (_, new) in renames {
        if !values.insert(new.as_str()) {
            return Err(RenameError::DuplicateValue(new.clone()));
        }
    }

    for (old, new) in renames {
        // never rename onto a column that is already there
        if table.has_column(new) {
            return Err(RenameError::AlreadyPresent(new.clone()));
        }
        if !table.has_column(old) {
            return Err(RenameError::Missing(old.clone()));
        }
    }

    for (old, new) in renames {
        if let Some(idx) = table.column_index(old) {
            debug!(year = table.year, from = %old, to = %new, "renaming column");
            table.headers[idx] = new.clone();
        }
    }

    Ok(())
}

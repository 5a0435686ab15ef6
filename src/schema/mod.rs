pub mod evolution;
pub mod rename;
pub mod types;

pub use evolution::{get_rename_dict, get_report_cols_subset};
pub use rename::safe_rename;
pub use types::{RenameError, RenameMap};

// Diff layer - pure field-level change computation
pub mod change_diff;

pub use change_diff::{
    diff_for_create, diff_for_delete, diff_for_update, ChangeSet, FieldChange, FieldMap,
};

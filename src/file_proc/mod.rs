pub mod reconcile;
pub mod scan;
pub mod transfer;

pub use reconcile::{reconcile_directory, DuplicatePolicy, MergeOutcome, SkipReason};
pub use scan::{find_archives, list_children, SourceEntry};
pub use transfer::{copy_tree_missing, move_entry};

//! Directory traversal and file-name matching.

mod pattern;
mod walker;

pub use pattern::WildcardPattern;
pub use walker::{DirectoryWalker, WalkEntry};

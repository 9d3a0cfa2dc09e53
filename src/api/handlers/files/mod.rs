pub mod analytics;
pub mod list;
pub mod operations;
pub mod types;

// Re-export all types
pub use types::*;

// Re-export all handlers
pub use analytics::file_analytics;
pub use list::list_files;
pub use operations::{delete_files, run_operation};

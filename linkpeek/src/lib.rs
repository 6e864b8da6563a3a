pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{LookupOptions, Target, classify_target, handle_lookup, render_profile, write_output};

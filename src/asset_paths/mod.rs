//! Helpers for normalising asset paths before they are handed to a CDN provider.
//!
//! Paths coming from templates may carry stray leading or trailing separators. Providers expect
//! a clean storage key relative to the project root, so everything funnels through here first.

mod clean;

pub use clean::{clean_path, prefixed_path};

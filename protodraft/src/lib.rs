// Library root: re-exports all modules so integration tests and the two
// binaries can access the crate's public API.

pub mod catalog;
pub mod config;
pub mod console;
pub mod draft;
pub mod import;

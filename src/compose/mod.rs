//! Docker Compose file loading
//!
//! Only the service names of a compose file matter here: they form the
//! registry every request is validated against.

pub mod config;
pub mod parser;
pub mod registry;

pub use config::ComposeFile;
pub use parser::ComposeParser;
pub use registry::ServiceRegistry;

pub mod build;
pub mod config;
pub mod context;
pub mod deps;
pub mod docs;
pub mod error;
pub mod facade;
pub(crate) mod fs;
pub mod publish;
pub mod runtime;
pub mod saas;
pub mod secrets;
pub mod testing;
pub mod tooling;
pub mod venv;
pub mod version_file;

#[cfg(test)]
pub(crate) mod test_support;

pub const PYWF_VERSION: &str = env!("CARGO_PKG_VERSION");

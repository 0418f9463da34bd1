//! Global CLI options and the environment-driven configuration snapshot.

mod settings;

pub use settings::{Config, EndpointConfig, GlobalOptions, HttpConfig, ToolConfig};

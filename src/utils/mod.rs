pub mod config;
pub mod credentials;
pub mod logger;
pub mod settings_toml;

pub use config::*;
pub use credentials::load_credentials;
pub use logger::setup_logging;
pub use settings_toml::load_opts;

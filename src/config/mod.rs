//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (overlay APP_ENV, LOG_LEVEL, LOG_PRETTY, ...)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → RuntimeConfig handed to the logger, ServerConfig to the server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env, load_config, ConfigError};
pub use schema::{AppConfig, Environment, RuntimeConfig, ServerConfig};
pub use validation::{validate_config, ValidationError};

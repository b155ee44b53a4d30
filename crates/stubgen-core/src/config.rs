//! Configuration management for stubgen code generation.
//!
//! This module defines the `Config` struct and related functionality for
//! managing code generation settings. The configuration can be loaded from
//! a YAML file, created programmatically, or built from command-line
//! arguments.
//!
//! # Examples
//!
//! ```no_run
//! use stubgen_core::config::Config;
//!
//! // Create a new config programmatically
//! let mut config = Config::new("api.json", "output");
//! config.targets = vec!["csharp".to_string(), "typescript".to_string()];
//! config.gen_client = true;
//! ```

// Internal imports (std, crate)
use std::path::Path;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Configuration for one generation invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the IR document (JSON or YAML)
    pub idl_path: String,

    /// Output directory for generated code
    pub output_dir: String,

    /// Target languages to generate for
    #[serde(default = "default_targets")]
    pub targets: Vec<String>,

    /// Whether to emit the server-side controller skeleton
    #[serde(default = "default_true")]
    pub gen_server: bool,

    /// Whether to emit the client-side proxy stub
    #[serde(default)]
    pub gen_client: bool,

    /// Attribute scopes surviving the output filter
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Base class of generated controllers (target backends append the
    /// service-interface type parameter)
    #[serde(default)]
    pub base_controller: Option<String>,
}

impl Config {
    /// Create a new Config with default values
    pub fn new(idl_path: impl Into<String>, output_dir: impl Into<String>) -> Self {
        Self {
            idl_path: idl_path.into(),
            output_dir: output_dir.into(),
            targets: default_targets(),
            gen_server: true,
            gen_client: false,
            scopes: Vec::new(),
            base_controller: None,
        }
    }

    /// Base controller class, falling back to the built-in default
    pub fn base_controller(&self) -> &str {
        self.base_controller.as_deref().unwrap_or("ServiceController")
    }

    /// Load configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).await?;
        Ok(())
    }
}

fn default_targets() -> Vec<String> {
    vec!["csharp".to_string()]
}

fn default_true() -> bool {
    true
}

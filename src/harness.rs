//! Application harness boundary.
//!
//! Hosting an application under test is not done by this crate. This module
//! only describes what the crate needs from such a harness: given an
//! explicit [`HarnessConfig`], produce a request-capable client, a server
//! handle and the resolved configuration sources.
//!
//! Configuration is always passed in; nothing here reads or writes
//! process-wide settings except [`ConfigurationSources::from_process_env`],
//! which only reads environment variables.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use log::debug;

use crate::core::{HarnessError, Transport};

/// Environment used when none (or a blank one) is configured.
pub const DEFAULT_ENVIRONMENT: &str = "Development";

/// Variable overriding the configuration directory.
pub const CONFIG_DIR_VARIABLE: &str = "CONFIG_DIR";

/// Variable overriding the key-per-file directory.
pub const CONFIG_KEYS_DIR_VARIABLE: &str = "CONFIG_KEYS_DIR";

/// Settings handed to an [`ApplicationHarness`].
///
/// # Examples
/// ```
/// use http_double::harness::HarnessConfigBuilder;
///
/// # fn main() -> Result<(), http_double::core::HarnessError> {
/// let config = HarnessConfigBuilder::default()
///     .with_environment("Staging")
///     .with_app_configuration("appsettings.json")
///     .build()?;
///
/// assert_eq!(config.environment(), "Staging");
/// assert!(!config.allow_redirects);
/// # Ok(())
/// # }
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(
    pattern = "owned",
    name = "HarnessConfigBuilder",
    build_fn(private, name = "build_internal"),
    setter(prefix = "with")
)]
pub struct HarnessConfig {
    /// Hosting environment name.
    #[builder(setter(into), default = "DEFAULT_ENVIRONMENT.into()")]
    pub environment: String,

    /// Application configuration file, absolute or relative to the
    /// configuration directory.
    #[builder(setter(into, strip_option), default = "None")]
    pub app_configuration: Option<PathBuf>,

    /// Content root of the application under test.
    #[builder(setter(into), default = "PathBuf::from(\".\")")]
    pub content_root: PathBuf,

    /// Whether the produced client follows redirects.
    #[builder(default = "false")]
    pub allow_redirects: bool,

    /// Upper bound of followed redirects.
    #[builder(default = "0")]
    pub max_redirects: u32,
}

impl HarnessConfigBuilder {
    /// Validate and build the configuration.
    ///
    /// # Errors
    /// Returns [`HarnessError::Harness`] when the builder is incomplete.
    pub fn build(self) -> Result<HarnessConfig, HarnessError> {
        self.build_internal().map_err(|err| HarnessError::Harness {
            details: err.to_string(),
        })
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.into(),
            app_configuration: None,
            content_root: PathBuf::from("."),
            allow_redirects: false,
            max_redirects: 0,
        }
    }
}

impl HarnessConfig {
    /// Environment name, falling back to [`DEFAULT_ENVIRONMENT`] when blank.
    pub fn environment(&self) -> &str {
        match self.environment.trim() {
            "" => DEFAULT_ENVIRONMENT,
            _ => &self.environment,
        }
    }

    /// Options for the client produced by a harness.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            allow_redirects: self.allow_redirects,
            max_redirects: self.max_redirects,
        }
    }
}

/// Behavior of the client a harness hands out.
///
/// Redirects are not followed unless asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientOptions {
    /// Whether redirects are followed.
    pub allow_redirects: bool,

    /// Upper bound of followed redirects.
    pub max_redirects: u32,
}

/// Where the harness should load configuration from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationSources {
    /// Effective environment name.
    pub environment: String,

    /// Directory relative configuration files are looked up in.
    pub configuration_directory: PathBuf,

    /// Application configuration file, if one was configured.
    pub app_configuration: Option<PathBuf>,

    /// Key-per-file directory, if it exists.
    pub key_per_file_directory: Option<PathBuf>,
}

impl ConfigurationSources {
    /// Resolve sources for `config`, reading variables through `variable`.
    ///
    /// - configuration directory: `CONFIG_DIR`, else `<content root>/config`
    ///   when it exists, else the content root;
    /// - application configuration: kept when absolute, otherwise joined onto
    ///   the configuration directory;
    /// - key-per-file directory: `CONFIG_KEYS_DIR`, else
    ///   `<content root>/config-keys`, kept only when it exists.
    pub fn resolve<F>(config: &HarnessConfig, variable: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let content_root = config.content_root.as_path();

        let configuration_directory = variable(CONFIG_DIR_VARIABLE)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_configuration_directory(content_root));

        let app_configuration = config.app_configuration.as_ref().map(|file| {
            if file.is_absolute() {
                file.clone()
            } else {
                configuration_directory.join(file)
            }
        });

        let key_per_file_directory = variable(CONFIG_KEYS_DIR_VARIABLE)
            .map(PathBuf::from)
            .unwrap_or_else(|| content_root.join("config-keys"));
        let key_per_file_directory = key_per_file_directory
            .is_dir()
            .then_some(key_per_file_directory);

        let sources = Self {
            environment: config.environment().to_string(),
            configuration_directory,
            app_configuration,
            key_per_file_directory,
        };
        debug!("resolved configuration sources: {sources:?}");

        sources
    }

    /// Resolve sources for `config` from the process environment.
    pub fn from_process_env(config: &HarnessConfig) -> Self {
        Self::resolve(config, |name| std::env::var(name).ok())
    }
}

fn default_configuration_directory(content_root: &Path) -> PathBuf {
    let nested = content_root.join("config");
    if nested.is_dir() {
        nested
    } else {
        content_root.to_path_buf()
    }
}

/// Everything a launched application under test hands back.
#[derive(Debug)]
pub struct HarnessHandle<C, S> {
    /// Request-capable client talking to the application.
    pub client: C,

    /// Handle of the hosted application.
    pub server: S,

    /// Configuration the application was started with.
    pub configuration: ConfigurationSources,
}

/// Hosts an application under test.
///
/// Implementations own the application entry point; the crate only relies
/// on this contract. [`configure_services`] and [`client_options`] are the
/// customization points, and `launch` is expected to go through
/// [`services`] and [`client_options`] rather than building either itself.
///
/// [`configure_services`]: ApplicationHarness::configure_services
/// [`client_options`]: ApplicationHarness::client_options
/// [`services`]: ApplicationHarness::services
#[async_trait::async_trait]
pub trait ApplicationHarness: Send + Sync {
    /// Client type produced for the application.
    type Client: Transport;

    /// Server handle type.
    type Server: Send;

    /// Service registry the application is started with.
    type Services: Default + Send;

    /// Adjust the service registry before launch. Does nothing by default.
    fn configure_services(&self, _services: &mut Self::Services) {}

    /// Options of the produced client, taken from `config` by default.
    fn client_options(&self, config: &HarnessConfig) -> ClientOptions {
        config.client_options()
    }

    /// Default registry passed through [`configure_services`].
    ///
    /// [`configure_services`]: ApplicationHarness::configure_services
    fn services(&self) -> Self::Services {
        let mut services = Self::Services::default();
        self.configure_services(&mut services);
        services
    }

    /// Start the application with `config`.
    ///
    /// # Errors
    /// Should return [`HarnessError::Harness`] when the application cannot be
    /// started.
    async fn launch(
        &self,
        config: &HarnessConfig,
    ) -> Result<HarnessHandle<Self::Client, Self::Server>, HarnessError>;
}

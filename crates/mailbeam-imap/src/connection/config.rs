//! Connection configuration.

use std::path::PathBuf;

use crate::auth::Mechanism;

/// IMAP connection configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Whether to wrap the connection in TLS.
    pub tls: bool,
    /// Path to a PEM file with additional CA roots.
    pub ca_cert_path: Option<PathBuf>,
    /// Path to a PEM client certificate chain.
    pub cert_path: Option<PathBuf>,
    /// Path to the PEM private key for the client certificate.
    pub key_path: Option<PathBuf>,
    /// Login name for authentication.
    pub login: String,
    /// Password for authentication.
    pub password: String,
    /// Fixed authentication mechanism; when set, the server must
    /// advertise it. When unset the first advertised mechanism from the
    /// preference list is used.
    pub auth_mechanism: Option<Mechanism>,
}

impl Config {
    /// Creates a configuration for the given host with defaults:
    /// port 143, no TLS, no credentials.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 143,
            tls: false,
            ca_cert_path: None,
            cert_path: None,
            key_path: None,
            login: String::new(),
            password: String::new(),
            auth_mechanism: None,
        }
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder {
            config: Self::new(host),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("localhost")
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Sets the port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enables or disables TLS.
    #[must_use]
    pub fn tls(mut self, tls: bool) -> Self {
        self.config.tls = tls;
        self
    }

    /// Sets the CA certificate file path.
    #[must_use]
    pub fn ca_cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ca_cert_path = Some(path.into());
        self
    }

    /// Sets the client certificate file path.
    #[must_use]
    pub fn cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cert_path = Some(path.into());
        self
    }

    /// Sets the client key file path.
    #[must_use]
    pub fn key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.key_path = Some(path.into());
        self
    }

    /// Sets the credentials.
    #[must_use]
    pub fn credentials(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.login = login.into();
        self.config.password = password.into();
        self
    }

    /// Fixes the authentication mechanism.
    #[must_use]
    pub fn auth_mechanism(mut self, mechanism: Mechanism) -> Self {
        self.config.auth_mechanism = Some(mechanism);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}

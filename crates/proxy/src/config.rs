//! Proxy configuration and pluggable hooks.
//!
//! The proxy's behavior is parameterized by a small capability set:
//! upstream resolution, authorized-keys retrieval, private-key retrieval,
//! and the master-key switch. Hooks are plain closures; anything not hooked
//! falls back to the conventional `/home/<user>/.ssh` layout.

use ferry_platform::{FerryError, FerryResult};
use std::path::PathBuf;

/// Resolves the upstream host for a username.
pub type FindUpstreamHook = Box<dyn Fn(&str) -> FerryResult<String> + Send + Sync>;

/// Fetches raw bytes (authorized_keys or private key material) for a username.
pub type FetchBytesHook = Box<dyn Fn(&str) -> FerryResult<Vec<u8>> + Send + Sync>;

/// Immutable proxy configuration.
///
/// `find_upstream` is required and therefore a constructor argument; the
/// remaining hooks are optional and default to reading the user's `~/.ssh`
/// files.
pub struct ProxyConfig {
    /// Maps a username to the upstream host to dial.
    find_upstream: FindUpstreamHook,
    /// Port appended to the host returned by `find_upstream`.
    pub destination_port: u16,
    /// Returns raw authorized_keys bytes for a user.
    ///
    /// Defaults to reading `/home/<user>/.ssh/authorized_keys`.
    pub fetch_authorized_keys: Option<FetchBytesHook>,
    /// Returns raw private-key bytes for a user.
    ///
    /// Defaults to reading `/home/<user>/.ssh/id_rsa`.
    pub fetch_private_key: Option<FetchBytesHook>,
    /// When set, `master_key_path` is used for all upstream authentication
    /// regardless of user.
    pub use_master_key: bool,
    /// Path of the master private key.
    pub master_key_path: Option<PathBuf>,
}

impl ProxyConfig {
    /// Creates a configuration with the required upstream resolver and
    /// defaults for everything else.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ferry_proxy::config::ProxyConfig;
    ///
    /// let config = ProxyConfig::new(|user| Ok(format!("{}.internal", user)));
    /// assert_eq!(config.upstream_addr("alice").unwrap(), "alice.internal:22");
    /// ```
    pub fn new<F>(find_upstream: F) -> Self
    where
        F: Fn(&str) -> FerryResult<String> + Send + Sync + 'static,
    {
        Self {
            find_upstream: Box::new(find_upstream),
            destination_port: 22,
            fetch_authorized_keys: None,
            fetch_private_key: None,
            use_master_key: false,
            master_key_path: None,
        }
    }

    /// Resolves the full upstream address (`host:port`) for `user`.
    pub fn upstream_addr(&self, user: &str) -> FerryResult<String> {
        let host = (self.find_upstream)(user)?;
        Ok(format!("{}:{}", host, self.destination_port))
    }

    /// Validates option consistency at setup time.
    pub fn validate(&self) -> FerryResult<()> {
        if self.use_master_key && self.master_key_path.is_none() {
            return Err(FerryError::Config(
                "use_master_key is set but master_key_path is empty".to_string(),
            ));
        }
        Ok(())
    }
}

// Manual Debug implementation because the hooks are not Debug
impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("destination_port", &self.destination_port)
            .field(
                "fetch_authorized_keys",
                &self.fetch_authorized_keys.as_ref().map(|_| "<hook>"),
            )
            .field(
                "fetch_private_key",
                &self.fetch_private_key.as_ref().map(|_| "<hook>"),
            )
            .field("use_master_key", &self.use_master_key)
            .field("master_key_path", &self.master_key_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_addr_appends_port() {
        let mut config = ProxyConfig::new(|user| Ok(format!("{}.example.net", user)));
        config.destination_port = 2022;
        assert_eq!(
            config.upstream_addr("bob").unwrap(),
            "bob.example.net:2022"
        );
    }

    #[test]
    fn test_upstream_resolution_error_propagates() {
        let config =
            ProxyConfig::new(|_| Err(FerryError::Config("unknown user".to_string())));
        assert!(config.upstream_addr("nobody").is_err());
    }

    #[test]
    fn test_validate_master_key_path_required() {
        let mut config = ProxyConfig::new(|user| Ok(user.to_string()));
        config.use_master_key = true;
        assert!(matches!(
            config.validate(),
            Err(FerryError::Config(_))
        ));

        config.master_key_path = Some(PathBuf::from("/etc/ferry/master_key"));
        assert!(config.validate().is_ok());
    }
}

//! Key material resolution.
//!
//! Resolves, per username, the authorized-keys bytes the proxy verifies
//! against and the private-key bytes it re-signs with. Selection order for
//! private keys:
//!
//! 1. master key (when `use_master_key` is set)
//! 2. `fetch_private_key` hook
//! 3. `/home/<user>/.ssh/id_rsa`
//!
//! Files read from disk pass a permission gate first: any group/other bit
//! refuses access before the contents are touched.

use crate::config::ProxyConfig;
use ferry_platform::{FerryError, FerryResult};
use std::path::{Path, PathBuf};

const AUTHORIZED_KEYS_FILE: &str = "authorized_keys";
const PRIVATE_KEY_FILE: &str = "id_rsa";

/// Returns raw authorized_keys bytes for `username`.
pub fn fetch_authorized_keys(config: &ProxyConfig, username: &str) -> FerryResult<Vec<u8>> {
    match &config.fetch_authorized_keys {
        Some(hook) => hook(username),
        None => read_user_file(username, AUTHORIZED_KEYS_FILE),
    }
}

/// Returns raw private-key bytes to re-sign as `username`.
pub fn fetch_private_key(config: &ProxyConfig, username: &str) -> FerryResult<Vec<u8>> {
    if config.use_master_key {
        let path = config.master_key_path.as_ref().ok_or_else(|| {
            FerryError::Config("use_master_key is set but master_key_path is empty".to_string())
        })?;
        return read_protected(path);
    }

    match &config.fetch_private_key {
        Some(hook) => hook(username),
        None => read_user_file(username, PRIVATE_KEY_FILE),
    }
}

fn user_spec_file(username: &str, file: &str) -> PathBuf {
    Path::new("/home").join(username).join(".ssh").join(file)
}

fn read_user_file(username: &str, file: &str) -> FerryResult<Vec<u8>> {
    read_protected(&user_spec_file(username, file))
}

/// Reads a file after checking its mode; group/other permission bits refuse
/// access without reading the contents.
fn read_protected(path: &Path) -> FerryResult<Vec<u8>> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(FerryError::Config(format!(
            "permissions 0{:o} for {} are too open",
            mode & 0o777,
            path.display()
        )));
    }

    Ok(std::fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn temp_file(name: &str, mode: u32) -> PathBuf {
        let path = std::env::temp_dir().join(format!("ferry-keys-{}-{}", std::process::id(), name));
        fs::write(&path, b"key material").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_read_protected_ok() {
        let path = temp_file("ok", 0o600);
        let bytes = read_protected(&path).unwrap();
        assert_eq!(bytes, b"key material");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_protected_refuses_open_mode() {
        let path = temp_file("open", 0o644);
        let err = read_protected(&path).unwrap_err();
        assert!(matches!(err, FerryError::Config(_)));
        assert!(err.to_string().contains(path.to_str().unwrap()));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_protected_missing_file() {
        let err = read_protected(Path::new("/nonexistent/ferry-test")).unwrap_err();
        assert!(matches!(err, FerryError::Io(_)));
    }

    #[test]
    fn test_master_key_takes_priority_over_hook() {
        let path = temp_file("master", 0o600);
        let mut config = crate::config::ProxyConfig::new(|user| Ok(user.to_string()));
        config.use_master_key = true;
        config.master_key_path = Some(path.clone());
        config.fetch_private_key = Some(Box::new(|_| Ok(b"hook material".to_vec())));

        assert_eq!(fetch_private_key(&config, "alice").unwrap(), b"key material");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_private_key_hook_used_without_master() {
        let mut config = crate::config::ProxyConfig::new(|user| Ok(user.to_string()));
        config.fetch_private_key = Some(Box::new(|user| {
            Ok(format!("material for {}", user).into_bytes())
        }));

        assert_eq!(
            fetch_private_key(&config, "alice").unwrap(),
            b"material for alice"
        );
    }

    #[test]
    fn test_authorized_keys_hook_used() {
        let mut config = crate::config::ProxyConfig::new(|user| Ok(user.to_string()));
        config.fetch_authorized_keys = Some(Box::new(|_| Ok(b"ssh-ed25519 AAAA".to_vec())));

        assert_eq!(
            fetch_authorized_keys(&config, "alice").unwrap(),
            b"ssh-ed25519 AAAA"
        );
    }
}

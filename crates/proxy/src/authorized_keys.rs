//! authorized_keys parsing and candidate-key matching (OpenSSH format).
//!
//! Each line has the format:
//! ```text
//! [options] keytype base64-key [comment]
//! ```
//!
//! The matcher compares the candidate's marshaled blob against each entry's
//! decoded key data. Parsing is strict: a malformed entry aborts the match
//! and the caller treats the candidate as not authorized. Comment lines,
//! options, and trailing whitespace are discarded.

use crate::pubkey::PublicKey;
use base64::Engine;
use ferry_platform::{FerryError, FerryResult};
use subtle::ConstantTimeEq;

/// A single authorized key entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedKey {
    /// Key options (e.g., "no-port-forwarding", "command=\"...\"")
    options: Vec<String>,
    /// Algorithm name (e.g., "ssh-ed25519", "ssh-rsa")
    algorithm: String,
    /// Decoded public key data (SSH wire blob)
    key_data: Vec<u8>,
    /// Optional comment
    comment: String,
}

impl AuthorizedKey {
    /// Returns the key options.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Returns the algorithm name.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Returns the key data (SSH wire format).
    pub fn key_data(&self) -> &[u8] {
        &self.key_data
    }

    /// Returns the comment.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Parses a single non-empty, non-comment line.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ferry_proxy::authorized_keys::AuthorizedKey;
    ///
    /// let line = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIBRanDK33/M2A9M0Lc/TQ/pF5kfd8rplxF34cupZF1gD user@host";
    /// let key = AuthorizedKey::parse_line(line).unwrap();
    /// assert_eq!(key.algorithm(), "ssh-ed25519");
    /// ```
    pub fn parse_line(line: &str) -> FerryResult<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            return Err(FerryError::Protocol(
                "invalid authorized_keys line: too few fields".to_string(),
            ));
        }

        // First field is either the key type or the start of the options list
        let (options, algorithm_idx) = if Self::is_key_type(parts[0]) {
            (Vec::new(), 0)
        } else {
            let mut opts = Vec::new();
            let mut idx = 0;

            while idx < parts.len() && !Self::is_key_type(parts[idx]) {
                opts.push(parts[idx].to_string());
                idx += 1;
            }

            if idx >= parts.len() {
                return Err(FerryError::Protocol(
                    "no key type found in authorized_keys line".to_string(),
                ));
            }

            (opts, idx)
        };

        if algorithm_idx + 1 >= parts.len() {
            return Err(FerryError::Protocol(
                "missing key data in authorized_keys line".to_string(),
            ));
        }

        let algorithm = parts[algorithm_idx].to_string();
        let key_data = base64::engine::general_purpose::STANDARD
            .decode(parts[algorithm_idx + 1])
            .map_err(|e| FerryError::Protocol(format!("invalid base64 key data: {}", e)))?;

        let comment = if algorithm_idx + 2 < parts.len() {
            parts[algorithm_idx + 2..].join(" ")
        } else {
            String::new()
        };

        Ok(Self {
            options,
            algorithm,
            key_data,
            comment,
        })
    }

    /// Checks if a string is a recognized SSH key type.
    fn is_key_type(s: &str) -> bool {
        matches!(
            s,
            "ssh-rsa"
                | "rsa-sha2-256"
                | "rsa-sha2-512"
                | "ssh-ed25519"
                | "ecdsa-sha2-nistp256"
                | "ecdsa-sha2-nistp384"
                | "ecdsa-sha2-nistp521"
                | "ssh-dss"
        )
    }
}

/// Parsed contents of an authorized_keys file.
#[derive(Debug, Clone, Default)]
pub struct AuthorizedKeysFile {
    keys: Vec<AuthorizedKey>,
}

impl AuthorizedKeysFile {
    /// Parses authorized keys from raw file bytes.
    ///
    /// Empty lines and `#` comments are skipped; any malformed entry is an
    /// error.
    pub fn from_bytes(content: &[u8]) -> FerryResult<Self> {
        let content = std::str::from_utf8(content)
            .map_err(|_| FerryError::Protocol("authorized_keys is not valid UTF-8".to_string()))?;

        let mut keys = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            keys.push(AuthorizedKey::parse_line(line)?);
        }

        Ok(Self { keys })
    }

    /// Returns the list of authorized keys.
    pub fn keys(&self) -> &[AuthorizedKey] {
        &self.keys
    }

    /// Checks whether `blob` equals any entry's key data.
    ///
    /// Comparison is constant-time per entry.
    pub fn contains(&self, blob: &[u8]) -> bool {
        self.keys
            .iter()
            .any(|key| bool::from(key.key_data.ct_eq(blob)))
    }
}

/// Checks a candidate public key against raw authorized_keys bytes.
///
/// Returns `Ok(true)` on the first matching entry and `Ok(false)` when the
/// file is exhausted. A parse error aborts the match; the bridge treats that
/// as "not authorized".
pub fn is_authorized(auth_keys: &[u8], candidate: &PublicKey) -> FerryResult<bool> {
    let file = AuthorizedKeysFile::from_bytes(auth_keys)?;
    Ok(file.contains(&candidate.marshal()))
}

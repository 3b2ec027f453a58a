//! Public keys and signatures in SSH wire format.
//!
//! A [`PublicKey`] is an algorithm identifier plus the algorithm-specific
//! fields of its wire blob; equality is byte equality of the marshaled blob.
//! Verification dispatches on the signature format, so an `ssh-rsa` key blob
//! verifies `rsa-sha2-256` / `rsa-sha2-512` signatures (RFC 8332).
//!
//! Accepted algorithms are deliberately narrow: ssh-ed25519 and RSA with
//! SHA-2. SHA-1 `ssh-rsa` signatures are refused.

use crate::wire::{put_bytes, put_str, read_bytes, read_string};
use bytes::BytesMut;
use ed25519_dalek::Verifier;
use ferry_platform::{FerryError, FerryResult};
use rsa::signature::Verifier as _;
use sha2::{Sha256, Sha512};

/// Algorithm names accepted in publickey auth requests and signatures.
///
/// Covers both the key-blob algorithms and the signature formats that may
/// name them (RFC 8332 allows rsa-sha2-* requests over ssh-rsa blobs).
pub fn is_acceptable_algo(name: &str) -> bool {
    matches!(
        name,
        "ssh-ed25519" | "ssh-rsa" | "rsa-sha2-256" | "rsa-sha2-512"
    )
}

/// An SSH public key parsed from its wire blob.
///
/// RSA components are kept exactly as read so that `marshal` reproduces the
/// original blob byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// Ed25519 public key (32 bytes).
    Ed25519([u8; 32]),
    /// RSA public key.
    Rsa {
        /// Public exponent, mpint bytes as read from the blob.
        e: Vec<u8>,
        /// Modulus, mpint bytes as read from the blob.
        n: Vec<u8>,
    },
}

impl PublicKey {
    /// Parses a public key from its SSH wire blob.
    ///
    /// Format:
    /// ```text
    /// string    algorithm name
    /// ....      algorithm specific fields
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::Protocol`] on unknown algorithms, malformed
    /// fields, or trailing bytes.
    pub fn from_blob(blob: &[u8]) -> FerryResult<Self> {
        let mut offset = 0;
        let algorithm = read_string(blob, &mut offset)?;

        let key = match algorithm.as_str() {
            "ssh-ed25519" => {
                let bytes = read_bytes(blob, &mut offset)?;
                let key: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                    FerryError::Protocol(format!(
                        "ssh-ed25519 key must be 32 bytes, got {}",
                        bytes.len()
                    ))
                })?;
                PublicKey::Ed25519(key)
            }
            "ssh-rsa" => {
                let e = read_bytes(blob, &mut offset)?;
                let n = read_bytes(blob, &mut offset)?;
                PublicKey::Rsa { e, n }
            }
            _ => {
                return Err(FerryError::Protocol(format!(
                    "unsupported public key algorithm {:?}",
                    algorithm
                )))
            }
        };

        if offset != blob.len() {
            return Err(FerryError::Protocol(
                "trailing bytes after public key blob".to_string(),
            ));
        }

        Ok(key)
    }

    /// Builds an RSA public key from big-endian component bytes, applying
    /// mpint normalization.
    pub fn from_rsa_components(e: &[u8], n: &[u8]) -> Self {
        PublicKey::Rsa {
            e: mpint_bytes(e),
            n: mpint_bytes(n),
        }
    }

    /// Returns the key-blob algorithm name.
    pub fn algorithm(&self) -> &'static str {
        match self {
            PublicKey::Ed25519(_) => "ssh-ed25519",
            PublicKey::Rsa { .. } => "ssh-rsa",
        }
    }

    /// Serializes the key to its SSH wire blob.
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        match self {
            PublicKey::Ed25519(key) => {
                put_str(&mut buf, "ssh-ed25519");
                put_bytes(&mut buf, key);
            }
            PublicKey::Rsa { e, n } => {
                put_str(&mut buf, "ssh-rsa");
                put_bytes(&mut buf, e);
                put_bytes(&mut buf, n);
            }
        }
        buf.to_vec()
    }

    /// Verifies `signature` over `data`.
    ///
    /// Returns `false` on any mismatch: wrong format for this key type,
    /// malformed signature blob, or failed verification.
    pub fn verify(&self, data: &[u8], signature: &SshSignature) -> bool {
        match (self, signature.format.as_str()) {
            (PublicKey::Ed25519(key), "ssh-ed25519") => {
                let Ok(verifying_key) = ed25519_dalek::VerifyingKey::from_bytes(key) else {
                    return false;
                };
                let Ok(sig) = ed25519_dalek::Signature::from_slice(&signature.blob) else {
                    return false;
                };
                verifying_key.verify(data, &sig).is_ok()
            }
            (PublicKey::Rsa { e, n }, "rsa-sha2-256") => {
                verify_rsa(e, n, data, &signature.blob, false)
            }
            (PublicKey::Rsa { e, n }, "rsa-sha2-512") => {
                verify_rsa(e, n, data, &signature.blob, true)
            }
            _ => false,
        }
    }
}

fn verify_rsa(e: &[u8], n: &[u8], data: &[u8], sig: &[u8], sha512: bool) -> bool {
    let n = rsa::BigUint::from_bytes_be(n);
    let e = rsa::BigUint::from_bytes_be(e);
    let Ok(public_key) = rsa::RsaPublicKey::new(n, e) else {
        return false;
    };
    let Ok(sig) = rsa::pkcs1v15::Signature::try_from(sig) else {
        return false;
    };
    if sha512 {
        rsa::pkcs1v15::VerifyingKey::<Sha512>::new(public_key)
            .verify(data, &sig)
            .is_ok()
    } else {
        rsa::pkcs1v15::VerifyingKey::<Sha256>::new(public_key)
            .verify(data, &sig)
            .is_ok()
    }
}

/// Strips leading zeros and re-pads when the high bit is set, producing the
/// byte form an SSH mpint field carries for a non-negative integer.
fn mpint_bytes(raw: &[u8]) -> Vec<u8> {
    let mut start = 0;
    while start < raw.len() && raw[start] == 0 {
        start += 1;
    }
    let trimmed = &raw[start..];

    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed[0] & 0x80 != 0 {
        let mut padded = Vec::with_capacity(trimmed.len() + 1);
        padded.push(0);
        padded.extend_from_slice(trimmed);
        padded
    } else {
        trimmed.to_vec()
    }
}

/// An SSH signature: format name plus algorithm-specific blob.
///
/// On the wire a signature travels as one `string` containing:
/// ```text
/// string    format name
/// string    signature blob
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshSignature {
    /// Signature format name (e.g. "ssh-ed25519", "rsa-sha2-256").
    pub format: String,
    /// Raw signature bytes.
    pub blob: Vec<u8>,
}

impl SshSignature {
    /// Creates a signature value.
    pub fn new(format: impl Into<String>, blob: Vec<u8>) -> Self {
        Self {
            format: format.into(),
            blob,
        }
    }

    /// Parses the inner layout of a signature string.
    pub fn from_bytes(data: &[u8]) -> FerryResult<Self> {
        let mut offset = 0;
        let format = read_string(data, &mut offset)?;
        let blob = read_bytes(data, &mut offset)?;

        if offset != data.len() {
            return Err(FerryError::Protocol(
                "trailing bytes after signature".to_string(),
            ));
        }

        Ok(Self { format, blob })
    }

    /// Serializes the inner layout of a signature string.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        put_str(&mut buf, &self.format);
        put_bytes(&mut buf, &self.blob);
        buf.to_vec()
    }
}

/// A valid ssh-ed25519 wire blob for codec tests.
#[cfg(test)]
pub(crate) fn blob_for_tests() -> Vec<u8> {
    use ed25519_dalek::SigningKey;

    let signing_key = SigningKey::from_bytes(&[7u8; 32]);
    PublicKey::Ed25519(signing_key.verifying_key().to_bytes()).marshal()
}

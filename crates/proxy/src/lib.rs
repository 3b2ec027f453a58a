//! SSH reverse-proxy authentication bridge.
//!
//! ferry sits between an SSH client (the *downstream*) and a dynamically
//! selected backend server (the *upstream*), running an independent
//! user-authentication exchange (RFC 4252) against each side over two
//! already-handshaken transports:
//!
//! 1. **Verify** — a downstream publickey attempt is checked against the
//!    user's authorized keys, its signature verified under the *downstream*
//!    session ID.
//! 2. **Re-sign** — the proxy then authenticates to the upstream with its
//!    own key material, producing a fresh signature bound to the *upstream*
//!    session ID. Password and other methods tunnel through unchanged.
//! 3. **Forward** — once the upstream accepts, all traffic is relayed
//!    opaquely in both directions.
//!
//! The SSH transport layer itself is external: it plugs in through the
//! [`transport::PacketConn`] trait.
//!
//! # Example
//!
//! ```rust
//! use ferry_proxy::config::ProxyConfig;
//!
//! let mut config = ProxyConfig::new(|user| Ok(format!("{}.backends.internal", user)));
//! config.destination_port = 22;
//! config.use_master_key = true;
//! config.master_key_path = Some("/etc/ferry/master_key".into());
//! assert!(config.validate().is_ok());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod authorized_keys;
pub mod bridge;
pub mod config;
pub mod forward;
pub mod keys;
pub mod message;
pub mod privatekey;
pub mod pubkey;
pub mod resign;
pub mod transport;
mod wire;

// Re-export main types
pub use auth::{
    construct_signature_data, AuthBanner, AuthFailure, AuthPkOk, AuthSuccess, PublicKeyRequest,
    ServiceAccept, ServiceRequest, UserAuthRequest, SERVICE_CONNECTION, SERVICE_USERAUTH,
};
pub use authorized_keys::{is_authorized, AuthorizedKey, AuthorizedKeysFile};
pub use bridge::ProxyConn;
pub use config::{FetchBytesHook, FindUpstreamHook, ProxyConfig};
pub use forward::Forwarder;
pub use message::MessageType;
pub use privatekey::{Ed25519PrivateKey, PrivateKey, RsaPrivateKey};
pub use pubkey::{is_acceptable_algo, PublicKey, SshSignature};
pub use resign::resign_request;
pub use transport::{read_auth_request, request_userauth_service, PacketConn};

//! SSH user-authentication message codec (RFC 4252).
//!
//! The proxy sits between two authentication dialogues, so this codec is
//! built for translation rather than termination: a [`UserAuthRequest`]
//! keeps its method-specific payload as raw bytes, which makes
//! `to_bytes(from_bytes(p)) == p` hold for every well-formed request. Methods
//! the bridge tunnels unchanged (password and anything it does not know)
//! therefore reach the upstream byte-for-byte.
//!
//! Publickey payloads are decomposed on demand by
//! [`PublicKeyRequest::parse`].

use crate::message::MessageType;
use crate::pubkey::{is_acceptable_algo, PublicKey, SshSignature};
use crate::wire::{put_bytes, put_str, read_bytes, read_string};
use bytes::{BufMut, BytesMut};
use ferry_platform::{FerryError, FerryResult};

/// Service name requested before user authentication.
pub const SERVICE_USERAUTH: &str = "ssh-userauth";

/// Service every user-auth request must name.
pub const SERVICE_CONNECTION: &str = "ssh-connection";

/// SSH_MSG_USERAUTH_REQUEST message (RFC 4252 Section 5).
///
/// Format:
/// ```text
/// byte      SSH_MSG_USERAUTH_REQUEST (50)
/// string    user name
/// string    service name
/// string    method name
/// ....      method specific fields (kept verbatim in `payload`)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAuthRequest {
    /// User name to authenticate as.
    pub user: String,
    /// Service to start after authentication (always "ssh-connection").
    pub service: String,
    /// Authentication method name ("none", "password", "publickey", ...).
    pub method: String,
    /// Method-specific fields, undecoded.
    pub payload: Vec<u8>,
}

impl UserAuthRequest {
    /// Creates a "none" method request for `user`.
    ///
    /// Sent upstream when the proxy gives up on publickey for the current
    /// attempt (unreadable or non-matching authorized keys) so the upstream
    /// answers with its available methods.
    pub fn none(user: &str) -> Self {
        Self {
            user: user.to_string(),
            service: SERVICE_CONNECTION.to_string(),
            method: "none".to_string(),
            payload: Vec::new(),
        }
    }

    /// Serializes the request to a packet.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();

        buf.put_u8(MessageType::UserauthRequest as u8);
        put_str(&mut buf, &self.user);
        put_str(&mut buf, &self.service);
        put_str(&mut buf, &self.method);
        buf.put_slice(&self.payload);

        buf.to_vec()
    }

    /// Parses a request from a packet.
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::Protocol`] if the packet is not a well-formed
    /// USERAUTH_REQUEST.
    pub fn from_bytes(data: &[u8]) -> FerryResult<Self> {
        if data.is_empty() {
            return Err(FerryError::Protocol(
                "USERAUTH_REQUEST message is empty".to_string(),
            ));
        }

        if data[0] != MessageType::UserauthRequest as u8 {
            return Err(FerryError::Protocol(format!(
                "invalid message type: expected 50 (SSH_MSG_USERAUTH_REQUEST), got {}",
                data[0]
            )));
        }

        let mut offset = 1;
        let user = read_string(data, &mut offset)?;
        let service = read_string(data, &mut offset)?;
        let method = read_string(data, &mut offset)?;
        let payload = data[offset..].to_vec();

        Ok(Self {
            user,
            service,
            method,
            payload,
        })
    }
}

/// Decomposed `publickey` method payload.
///
/// `has_sig(1) || algo(string) || pubkey_blob(string) || [signature(string)]`
#[derive(Debug, Clone)]
pub struct PublicKeyRequest {
    /// Algorithm name from the request (e.g. "ssh-ed25519", "rsa-sha2-256").
    pub algorithm: String,
    /// Parsed candidate key.
    pub public_key: PublicKey,
    /// True when `has_sig` is 0: the client is probing whether the key would
    /// be acceptable, no signature follows.
    pub is_query: bool,
    /// Signature over the signed-for-auth canonical form, present when
    /// `has_sig` is 1.
    pub signature: Option<SshSignature>,
}

impl PublicKeyRequest {
    /// Decomposes a publickey auth request.
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::Protocol`] when the method is not `publickey`,
    /// the payload is malformed, trailing bytes follow the signature, or the
    /// requested algorithm is not in the accepted set.
    pub fn parse(req: &UserAuthRequest) -> FerryResult<Self> {
        if req.method != "publickey" {
            return Err(FerryError::Protocol(format!(
                "not a publickey auth request: method {:?}",
                req.method
            )));
        }

        let payload = &req.payload;
        if payload.is_empty() {
            return Err(FerryError::Protocol(
                "publickey payload is empty".to_string(),
            ));
        }

        let is_query = payload[0] == 0;
        let mut offset = 1;

        let algorithm = read_string(payload, &mut offset)?;
        if !is_acceptable_algo(&algorithm) {
            return Err(FerryError::Protocol(format!(
                "algorithm {:?} not accepted",
                algorithm
            )));
        }

        let blob = read_bytes(payload, &mut offset)?;
        let public_key = PublicKey::from_blob(&blob)?;

        let signature = if is_query {
            None
        } else {
            let sig_bytes = read_bytes(payload, &mut offset)?;
            Some(SshSignature::from_bytes(&sig_bytes)?)
        };

        if offset != payload.len() {
            return Err(FerryError::Protocol(
                "trailing bytes after publickey payload".to_string(),
            ));
        }

        Ok(Self {
            algorithm,
            public_key,
            is_query,
            signature,
        })
    }

    /// Builds the publickey method payload with a signature attached.
    pub fn payload_with_signature(
        algorithm: &str,
        public_key_blob: &[u8],
        signature: &SshSignature,
    ) -> Vec<u8> {
        let mut buf = BytesMut::new();
        buf.put_u8(1);
        put_str(&mut buf, algorithm);
        put_bytes(&mut buf, public_key_blob);
        put_bytes(&mut buf, &signature.to_bytes());
        buf.to_vec()
    }
}

/// SSH_MSG_USERAUTH_FAILURE message (RFC 4252 Section 5.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    /// Authentications that can continue.
    methods_can_continue: Vec<String>,
    /// Partial success flag.
    partial_success: bool,
}

impl AuthFailure {
    /// Creates a failure naming the methods that can continue.
    pub fn new(methods: Vec<String>) -> Self {
        Self {
            methods_can_continue: methods,
            partial_success: false,
        }
    }

    /// Returns the methods that can continue.
    pub fn methods_can_continue(&self) -> &[String] {
        &self.methods_can_continue
    }

    /// Returns whether partial success was achieved.
    pub fn partial_success(&self) -> bool {
        self.partial_success
    }

    /// Serializes to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();

        buf.put_u8(MessageType::UserauthFailure as u8);
        put_str(&mut buf, &self.methods_can_continue.join(","));
        buf.put_u8(if self.partial_success { 1 } else { 0 });

        buf.to_vec()
    }

    /// Parses from bytes.
    pub fn from_bytes(data: &[u8]) -> FerryResult<Self> {
        if data.is_empty() || data[0] != MessageType::UserauthFailure as u8 {
            return Err(FerryError::Protocol(
                "invalid USERAUTH_FAILURE message".to_string(),
            ));
        }

        let mut offset = 1;
        let methods_str = read_string(data, &mut offset)?;
        let methods_can_continue: Vec<String> = if methods_str.is_empty() {
            vec![]
        } else {
            methods_str.split(',').map(String::from).collect()
        };

        if offset >= data.len() {
            return Err(FerryError::Protocol(
                "USERAUTH_FAILURE truncated (missing partial success flag)".to_string(),
            ));
        }
        let partial_success = data[offset] != 0;

        Ok(Self {
            methods_can_continue,
            partial_success,
        })
    }
}

/// SSH_MSG_USERAUTH_SUCCESS message (RFC 4252 Section 5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthSuccess;

impl AuthSuccess {
    /// Serializes to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        vec![MessageType::UserauthSuccess as u8]
    }

    /// Parses from bytes.
    pub fn from_bytes(data: &[u8]) -> FerryResult<Self> {
        if data.is_empty() || data[0] != MessageType::UserauthSuccess as u8 {
            return Err(FerryError::Protocol(
                "invalid USERAUTH_SUCCESS message".to_string(),
            ));
        }
        Ok(Self)
    }
}

/// SSH_MSG_USERAUTH_BANNER message (RFC 4252 Section 5.4).
///
/// Forwarded downstream verbatim during bridging; the codec exists for tests
/// and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthBanner {
    message: String,
    language_tag: String,
}

impl AuthBanner {
    /// Creates a new banner message.
    pub fn new(message: String) -> Self {
        Self {
            message,
            language_tag: String::new(),
        }
    }

    /// Returns the banner message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Serializes to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();

        buf.put_u8(MessageType::UserauthBanner as u8);
        put_str(&mut buf, &self.message);
        put_str(&mut buf, &self.language_tag);

        buf.to_vec()
    }

    /// Parses from bytes.
    pub fn from_bytes(data: &[u8]) -> FerryResult<Self> {
        if data.is_empty() || data[0] != MessageType::UserauthBanner as u8 {
            return Err(FerryError::Protocol(
                "invalid USERAUTH_BANNER message".to_string(),
            ));
        }

        let mut offset = 1;
        let message = read_string(data, &mut offset)?;
        let language_tag = read_string(data, &mut offset)?;

        Ok(Self {
            message,
            language_tag,
        })
    }
}

/// SSH_MSG_USERAUTH_PK_OK message (RFC 4252 Section 7).
///
/// The reply to a publickey probe (`has_sig == 0`): the named key would be
/// acceptable for authentication. The proxy synthesizes this locally, with
/// no upstream traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPkOk {
    algorithm: String,
    public_key: Vec<u8>,
}

impl AuthPkOk {
    /// Creates a new PK_OK echoing the probed algorithm and key blob.
    pub fn new(algorithm: impl Into<String>, public_key: Vec<u8>) -> Self {
        Self {
            algorithm: algorithm.into(),
            public_key,
        }
    }

    /// Returns the algorithm name.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Returns the public key blob.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Serializes to bytes.
    ///
    /// Format:
    /// ```text
    /// byte      SSH_MSG_USERAUTH_PK_OK (60)
    /// string    public key algorithm name
    /// string    public key blob
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();

        buf.put_u8(MessageType::UserauthPkOk as u8);
        put_str(&mut buf, &self.algorithm);
        put_bytes(&mut buf, &self.public_key);

        buf.to_vec()
    }

    /// Parses from bytes.
    pub fn from_bytes(data: &[u8]) -> FerryResult<Self> {
        if data.is_empty() || data[0] != MessageType::UserauthPkOk as u8 {
            return Err(FerryError::Protocol(
                "invalid USERAUTH_PK_OK message".to_string(),
            ));
        }

        let mut offset = 1;
        let algorithm = read_string(data, &mut offset)?;
        let public_key = read_bytes(data, &mut offset)?;

        Ok(Self {
            algorithm,
            public_key,
        })
    }
}

/// SSH_MSG_SERVICE_REQUEST message (RFC 4253 Section 10).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    service: String,
}

impl ServiceRequest {
    /// Creates a request for `service`.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Returns the requested service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Serializes to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        buf.put_u8(MessageType::ServiceRequest as u8);
        put_str(&mut buf, &self.service);
        buf.to_vec()
    }

    /// Parses from bytes.
    pub fn from_bytes(data: &[u8]) -> FerryResult<Self> {
        if data.is_empty() || data[0] != MessageType::ServiceRequest as u8 {
            return Err(FerryError::Protocol(
                "invalid SERVICE_REQUEST message".to_string(),
            ));
        }

        let mut offset = 1;
        let service = read_string(data, &mut offset)?;
        Ok(Self { service })
    }
}

/// SSH_MSG_SERVICE_ACCEPT message (RFC 4253 Section 10).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccept {
    service: String,
}

impl ServiceAccept {
    /// Creates an accept for `service`.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Returns the accepted service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Serializes to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        buf.put_u8(MessageType::ServiceAccept as u8);
        put_str(&mut buf, &self.service);
        buf.to_vec()
    }

    /// Parses from bytes.
    pub fn from_bytes(data: &[u8]) -> FerryResult<Self> {
        if data.is_empty() || data[0] != MessageType::ServiceAccept as u8 {
            return Err(FerryError::Protocol(
                "invalid SERVICE_ACCEPT message".to_string(),
            ));
        }

        let mut offset = 1;
        let service = read_string(data, &mut offset)?;
        Ok(Self { service })
    }
}

/// Constructs the data covered by a publickey authentication signature
/// (RFC 4252 Section 7).
///
/// Both sides of the bridge go through this one function: the downstream
/// verifier binds to the downstream session ID, the re-signer binds to the
/// upstream session ID. The two transports have distinct session IDs, so the
/// same logical authentication always yields two different signed blobs.
///
/// # Format
///
/// ```text
/// string    session identifier
/// byte      SSH_MSG_USERAUTH_REQUEST (50)
/// string    user name
/// string    service name
/// string    "publickey"
/// boolean   TRUE (has signature)
/// string    public key algorithm name
/// string    public key blob
/// ```
pub fn construct_signature_data(
    session_id: &[u8],
    user: &str,
    service: &str,
    algorithm: &str,
    public_key_blob: &[u8],
) -> Vec<u8> {
    let mut buf = BytesMut::new();

    put_bytes(&mut buf, session_id);
    buf.put_u8(MessageType::UserauthRequest as u8);
    put_str(&mut buf, user);
    put_str(&mut buf, service);
    put_str(&mut buf, "publickey");
    buf.put_u8(1);
    put_str(&mut buf, algorithm);
    put_bytes(&mut buf, public_key_blob);

    buf.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pubkey::blob_for_tests;

    #[test]
    fn test_auth_request_round_trip_preserves_bytes() {
        let req = UserAuthRequest {
            user: "alice".to_string(),
            service: SERVICE_CONNECTION.to_string(),
            method: "password".to_string(),
            payload: {
                let mut buf = BytesMut::new();
                buf.put_u8(0);
                put_str(&mut buf, "hunter2");
                buf.to_vec()
            },
        };

        let bytes = req.to_bytes();
        let parsed = UserAuthRequest::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, req);
        assert_eq!(parsed.to_bytes(), bytes);
    }

    #[test]
    fn test_auth_request_unknown_method_payload_opaque() {
        let req = UserAuthRequest {
            user: "bob".to_string(),
            service: SERVICE_CONNECTION.to_string(),
            method: "hostbased".to_string(),
            payload: vec![0xde, 0xad, 0xbe, 0xef],
        };

        let parsed = UserAuthRequest::from_bytes(&req.to_bytes()).unwrap();
        assert_eq!(parsed.payload, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_auth_request_rejects_wrong_type() {
        let mut bytes = UserAuthRequest::none("alice").to_bytes();
        bytes[0] = 90;
        assert!(UserAuthRequest::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_none_auth_request() {
        let req = UserAuthRequest::none("carol");
        assert_eq!(req.method, "none");
        assert_eq!(req.service, SERVICE_CONNECTION);
        assert!(req.payload.is_empty());
    }

    #[test]
    fn test_publickey_query_parse() {
        let blob = blob_for_tests();
        let mut payload = BytesMut::new();
        payload.put_u8(0);
        put_str(&mut payload, "ssh-ed25519");
        put_bytes(&mut payload, &blob);

        let req = UserAuthRequest {
            user: "alice".to_string(),
            service: SERVICE_CONNECTION.to_string(),
            method: "publickey".to_string(),
            payload: payload.to_vec(),
        };

        let parsed = PublicKeyRequest::parse(&req).unwrap();
        assert!(parsed.is_query);
        assert!(parsed.signature.is_none());
        assert_eq!(parsed.algorithm, "ssh-ed25519");
        assert_eq!(parsed.public_key.marshal(), blob);
    }

    #[test]
    fn test_publickey_parse_rejects_unknown_algorithm() {
        let blob = blob_for_tests();
        let mut payload = BytesMut::new();
        payload.put_u8(0);
        put_str(&mut payload, "ssh-dss");
        put_bytes(&mut payload, &blob);

        let req = UserAuthRequest {
            user: "alice".to_string(),
            service: SERVICE_CONNECTION.to_string(),
            method: "publickey".to_string(),
            payload: payload.to_vec(),
        };

        assert!(PublicKeyRequest::parse(&req).is_err());
    }

    #[test]
    fn test_publickey_parse_rejects_trailing_bytes() {
        let blob = blob_for_tests();
        let sig = SshSignature::new("ssh-ed25519", vec![0u8; 64]);
        let mut payload = BytesMut::new();
        payload.put_u8(1);
        put_str(&mut payload, "ssh-ed25519");
        put_bytes(&mut payload, &blob);
        put_bytes(&mut payload, &sig.to_bytes());
        payload.put_u8(0xff);

        let req = UserAuthRequest {
            user: "alice".to_string(),
            service: SERVICE_CONNECTION.to_string(),
            method: "publickey".to_string(),
            payload: payload.to_vec(),
        };

        assert!(PublicKeyRequest::parse(&req).is_err());
    }

    #[test]
    fn test_auth_failure_round_trip() {
        let failure = AuthFailure::new(vec!["publickey".to_string()]);
        let parsed = AuthFailure::from_bytes(&failure.to_bytes()).unwrap();
        assert_eq!(parsed.methods_can_continue(), &["publickey".to_string()]);
        assert!(!parsed.partial_success());
    }

    #[test]
    fn test_pk_ok_round_trip() {
        let pk_ok = AuthPkOk::new("ssh-ed25519", vec![1, 2, 3, 4]);
        let bytes = pk_ok.to_bytes();
        assert_eq!(bytes[0], 60);

        let parsed = AuthPkOk::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.algorithm(), "ssh-ed25519");
        assert_eq!(parsed.public_key(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_service_messages() {
        let req = ServiceRequest::new(SERVICE_USERAUTH);
        let parsed = ServiceRequest::from_bytes(&req.to_bytes()).unwrap();
        assert_eq!(parsed.service(), "ssh-userauth");

        let accept = ServiceAccept::new(SERVICE_USERAUTH);
        let parsed = ServiceAccept::from_bytes(&accept.to_bytes()).unwrap();
        assert_eq!(parsed.service(), "ssh-userauth");
    }

    #[test]
    fn test_banner_round_trip() {
        let banner = AuthBanner::new("maintenance at midnight".to_string());
        let parsed = AuthBanner::from_bytes(&banner.to_bytes()).unwrap();
        assert_eq!(parsed.message(), banner.message());
    }

    #[test]
    fn test_construct_signature_data_layout() {
        let session_id = vec![9u8; 16];
        let data = construct_signature_data(
            &session_id,
            "alice",
            SERVICE_CONNECTION,
            "ssh-ed25519",
            &[5, 6, 7, 8],
        );

        let sid_len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        assert_eq!(sid_len, session_id.len());
        assert_eq!(&data[4..4 + sid_len], &session_id[..]);
        assert_eq!(data[4 + sid_len], 50);
    }

    #[test]
    fn test_signature_data_differs_per_session_id() {
        let a = construct_signature_data(b"session-a", "alice", SERVICE_CONNECTION, "x", b"k");
        let b = construct_signature_data(b"session-b", "alice", SERVICE_CONNECTION, "x", b"k");
        assert_ne!(a, b);
    }
}

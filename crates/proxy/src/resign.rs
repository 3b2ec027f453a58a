//! Re-signing of publickey authentication for the upstream transport.
//!
//! The downstream signature binds the downstream session ID and is useless
//! toward the upstream; after verifying it, the bridge produces a fresh
//! request signed with the proxy's own key material. The upstream session ID
//! is an explicit parameter so the two bindings can never be swapped
//! silently.

use crate::auth::{construct_signature_data, PublicKeyRequest, UserAuthRequest, SERVICE_CONNECTION};
use crate::privatekey::PrivateKey;
use ferry_platform::FerryResult;

/// Builds a publickey auth request for `user`, signed by `signer` and bound
/// to `upstream_session_id`.
///
/// # Errors
///
/// Returns [`ferry_platform::FerryError::Crypto`] when signing fails; the
/// bridge treats that as an authentication failure for the current attempt.
pub fn resign_request(
    user: &str,
    signer: &PrivateKey,
    upstream_session_id: &[u8],
) -> FerryResult<UserAuthRequest> {
    let public_key = signer.public_key();
    let blob = public_key.marshal();
    let algorithm = signer.algorithm();

    let data =
        construct_signature_data(upstream_session_id, user, SERVICE_CONNECTION, algorithm, &blob);
    let signature = signer.sign(&data)?;

    Ok(UserAuthRequest {
        user: user.to_string(),
        service: SERVICE_CONNECTION.to_string(),
        method: "publickey".to_string(),
        payload: PublicKeyRequest::payload_with_signature(algorithm, &blob, &signature),
    })
}

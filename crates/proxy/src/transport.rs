//! The external-transport seam.
//!
//! The SSH transport layer (version exchange, key exchange, cipher framing)
//! is not part of this crate. A transport library plugs in by implementing
//! [`PacketConn`] for its already-handshaken connections: the server-side
//! handshake stops after accepting the `ssh-userauth` service request, the
//! client-side handshake stops before sending one.
//!
//! Packets cross this trait decrypted and deframed: the first byte is the
//! SSH message type.

use crate::auth::{
    ServiceAccept, ServiceRequest, UserAuthRequest, SERVICE_CONNECTION, SERVICE_USERAUTH,
};
use crate::message::MessageType;
use async_trait::async_trait;
use ferry_platform::{FerryError, FerryResult};

/// A packet-oriented bidirectional SSH transport.
///
/// Methods take `&self` because the forwarding phase reads a transport from
/// one task while another writes it; implementations use interior
/// mutability.
#[async_trait]
pub trait PacketConn: Send + Sync {
    /// Reads the next packet payload.
    async fn read_packet(&self) -> FerryResult<Vec<u8>>;

    /// Writes one packet payload.
    async fn write_packet(&self, packet: &[u8]) -> FerryResult<()>;

    /// Returns the exchange hash of this transport's first key exchange.
    ///
    /// Unique per transport: the two sides of a proxy connection never share
    /// a session ID.
    fn session_id(&self) -> Vec<u8>;

    /// Closes the transport. Idempotent.
    async fn close(&self);
}

/// Requests the `ssh-userauth` service on an upstream transport and consumes
/// the accept reply.
pub async fn request_userauth_service(conn: &dyn PacketConn) -> FerryResult<()> {
    conn.write_packet(&ServiceRequest::new(SERVICE_USERAUTH).to_bytes())
        .await?;

    let packet = conn.read_packet().await?;
    let accept = ServiceAccept::from_bytes(&packet)?;
    if accept.service() != SERVICE_USERAUTH {
        return Err(FerryError::Protocol(format!(
            "unexpected service accepted: {:?}",
            accept.service()
        )));
    }

    Ok(())
}

/// Reads one user-auth request from a downstream transport.
///
/// The packet must be a `USERAUTH_REQUEST` naming the `ssh-connection`
/// service; anything else is a protocol violation.
pub async fn read_auth_request(conn: &dyn PacketConn) -> FerryResult<UserAuthRequest> {
    let packet = conn.read_packet().await?;

    if packet.first() != Some(&(MessageType::UserauthRequest as u8)) {
        return Err(FerryError::Protocol(format!(
            "expected SSH_MSG_USERAUTH_REQUEST, got message type {:?}",
            packet.first()
        )));
    }

    let request = UserAuthRequest::from_bytes(&packet)?;
    if request.service != SERVICE_CONNECTION {
        return Err(FerryError::Protocol(format!(
            "client attempted to negotiate for unknown service: {}",
            request.service
        )));
    }

    Ok(request)
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedConn;
    use super::*;

    #[tokio::test]
    async fn test_request_userauth_service() {
        let conn = ScriptedConn::new(
            b"sid",
            vec![ServiceAccept::new(SERVICE_USERAUTH).to_bytes()],
        );

        request_userauth_service(&conn).await.unwrap();

        let written = conn.written().await;
        assert_eq!(written.len(), 1);
        let request = ServiceRequest::from_bytes(&written[0]).unwrap();
        assert_eq!(request.service(), SERVICE_USERAUTH);
    }

    #[tokio::test]
    async fn test_request_userauth_service_missing_accept() {
        let conn = ScriptedConn::new(b"sid", vec![]);
        assert!(request_userauth_service(&conn).await.is_err());
    }

    #[tokio::test]
    async fn test_read_auth_request() {
        let conn = ScriptedConn::new(b"sid", vec![UserAuthRequest::none("alice").to_bytes()]);

        let request = read_auth_request(&conn).await.unwrap();
        assert_eq!(request.user, "alice");
        assert_eq!(request.method, "none");
    }

    #[tokio::test]
    async fn test_read_auth_request_rejects_wrong_type() {
        let conn = ScriptedConn::new(b"sid", vec![vec![90, 0, 0, 0, 0]]);

        let err = read_auth_request(&conn).await.unwrap_err();
        assert!(matches!(err, FerryError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_read_auth_request_rejects_wrong_service() {
        let mut request = UserAuthRequest::none("alice");
        request.service = "ssh-shellservice".to_string();
        let conn = ScriptedConn::new(b"sid", vec![request.to_bytes()]);

        assert!(read_auth_request(&conn).await.is_err());
    }
}

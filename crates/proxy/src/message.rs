//! SSH protocol message types observed by the proxy (RFC 4253, RFC 4252).
//!
//! The proxy never interprets connection-layer traffic; only the transport
//! generic and user-authentication message numbers are named here. Anything
//! else is either forwarded opaquely or a protocol violation, depending on
//! the bridge phase.

/// SSH message types the proxy dispatches on.
///
/// Numeric identifiers are the wire values from RFC 4253 Section 12 and
/// RFC 4252 Section 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    // Transport layer generic (1-19)
    /// Disconnect message - terminates the connection.
    Disconnect = 1,
    /// Ignore message - can be used for padding or keep-alive.
    Ignore = 2,
    /// Unimplemented message - response to unknown message type.
    Unimplemented = 3,
    /// Debug message - debugging information.
    Debug = 4,
    /// Service request - request a service (e.g., "ssh-userauth").
    ServiceRequest = 5,
    /// Service accept - service request accepted.
    ServiceAccept = 6,

    // User authentication generic (50-79)
    /// User authentication request.
    UserauthRequest = 50,
    /// User authentication failure.
    UserauthFailure = 51,
    /// User authentication success.
    UserauthSuccess = 52,
    /// User authentication banner.
    UserauthBanner = 53,
    /// Public key OK (server accepts public key for authentication).
    UserauthPkOk = 60,
}

impl MessageType {
    /// Converts a byte to a message type.
    ///
    /// Returns `None` for any number the proxy does not dispatch on; those
    /// packets are handled opaquely.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(MessageType::Disconnect),
            2 => Some(MessageType::Ignore),
            3 => Some(MessageType::Unimplemented),
            4 => Some(MessageType::Debug),
            5 => Some(MessageType::ServiceRequest),
            6 => Some(MessageType::ServiceAccept),
            50 => Some(MessageType::UserauthRequest),
            51 => Some(MessageType::UserauthFailure),
            52 => Some(MessageType::UserauthSuccess),
            53 => Some(MessageType::UserauthBanner),
            60 => Some(MessageType::UserauthPkOk),
            _ => None,
        }
    }

    /// Returns the message type name.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ferry_proxy::message::MessageType;
    ///
    /// assert_eq!(MessageType::UserauthRequest.name(), "SSH_MSG_USERAUTH_REQUEST");
    /// ```
    pub fn name(&self) -> &'static str {
        match self {
            MessageType::Disconnect => "SSH_MSG_DISCONNECT",
            MessageType::Ignore => "SSH_MSG_IGNORE",
            MessageType::Unimplemented => "SSH_MSG_UNIMPLEMENTED",
            MessageType::Debug => "SSH_MSG_DEBUG",
            MessageType::ServiceRequest => "SSH_MSG_SERVICE_REQUEST",
            MessageType::ServiceAccept => "SSH_MSG_SERVICE_ACCEPT",
            MessageType::UserauthRequest => "SSH_MSG_USERAUTH_REQUEST",
            MessageType::UserauthFailure => "SSH_MSG_USERAUTH_FAILURE",
            MessageType::UserauthSuccess => "SSH_MSG_USERAUTH_SUCCESS",
            MessageType::UserauthBanner => "SSH_MSG_USERAUTH_BANNER",
            MessageType::UserauthPkOk => "SSH_MSG_USERAUTH_PK_OK",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name(), *self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_conversion() {
        assert_eq!(MessageType::from_u8(50), Some(MessageType::UserauthRequest));
        assert_eq!(MessageType::from_u8(60), Some(MessageType::UserauthPkOk));
        assert_eq!(MessageType::from_u8(90), None);
    }

    #[test]
    fn test_message_type_values() {
        assert_eq!(MessageType::ServiceRequest as u8, 5);
        assert_eq!(MessageType::UserauthFailure as u8, 51);
        assert_eq!(MessageType::UserauthSuccess as u8, 52);
    }

    #[test]
    fn test_message_type_display() {
        let msg = MessageType::UserauthBanner;
        assert_eq!(format!("{}", msg), "SSH_MSG_USERAUTH_BANNER(53)");
    }
}

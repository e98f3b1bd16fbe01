/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Error types for the GateFix client engine.
//!
//! Every failure surfaced to a caller maps onto exactly one variant here, so
//! callers can tell a rejected request apart from a session precondition or a
//! transport fault.

use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Top-level error type for all GateFix operations.
#[derive(Debug, Error)]
pub enum FixError {
    /// Error during message decoding.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error during message encoding.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Error in session layer operations.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// A request builder rejected its input.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O error from underlying transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FixError {
    /// Returns the session error, if this is one.
    #[must_use]
    pub const fn as_session(&self) -> Option<&SessionError> {
        match self {
            Self::Session(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the validation error, if this is one.
    #[must_use]
    pub const fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors that occur during FIX message decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Message buffer is incomplete, need more data.
    #[error("incomplete message, need more data")]
    Incomplete,

    /// Invalid BeginString field (tag 8).
    #[error("invalid begin string: expected 8=FIX.x.y")]
    InvalidBeginString,

    /// Missing BodyLength field (tag 9).
    #[error("missing body length field (tag 9)")]
    MissingBodyLength,

    /// Invalid BodyLength value.
    #[error("invalid body length value")]
    InvalidBodyLength,

    /// Missing MsgType field (tag 35).
    #[error("missing msg type field (tag 35)")]
    MissingMsgType,

    /// Checksum mismatch between calculated and declared values.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Calculated checksum value.
        calculated: u8,
        /// Declared checksum value in message.
        declared: u8,
    },

    /// Invalid tag format (not a valid integer).
    #[error("invalid tag format: {0}")]
    InvalidTag(String),

    /// Invalid field value for the expected type.
    #[error("invalid field value for tag {tag}: {reason}")]
    InvalidFieldValue {
        /// The tag number of the field.
        tag: u32,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// Repeating group count mismatch.
    #[error("group count mismatch for tag {count_tag}: expected {expected}, found {actual}")]
    GroupCountMismatch {
        /// The tag containing the group count.
        count_tag: u32,
        /// Expected number of group entries.
        expected: usize,
        /// Actual number of group entries found.
        actual: usize,
    },

    /// Invalid UTF-8 in string field.
    #[error("invalid utf-8 in field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Message exceeds maximum allowed size.
    #[error("message too large: {size} bytes exceeds maximum {max_size}")]
    MessageTooLarge {
        /// Actual message size in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        max_size: usize,
    },
}

/// Errors that occur during FIX message encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Missing required header field during encoding.
    #[error("missing required field: tag {tag}")]
    MissingRequiredField {
        /// The tag number of the missing field.
        tag: u32,
    },

    /// Field value cannot be written to the wire.
    #[error("invalid field value for tag {tag}: {reason}")]
    InvalidFieldValue {
        /// The tag number of the field.
        tag: u32,
        /// Description of why the value is invalid.
        reason: String,
    },
}

/// A request builder's required-field invariant was violated.
///
/// Raised before any wire interaction; the caller fixes the input and
/// builds again.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was never set.
    #[error("missing required field: {field}")]
    MissingField {
        /// Domain name of the missing field.
        field: &'static str,
    },

    /// Order quantity is zero or negative.
    #[error("order quantity must be positive, got {quantity}")]
    NonPositiveQuantity {
        /// The rejected quantity.
        quantity: String,
    },

    /// A LIMIT order was built without a price.
    #[error("must specify price for LIMIT order")]
    LimitPriceRequired,

    /// A MARKET order carried a price.
    #[error("price {price} is not allowed on a MARKET order")]
    MarketPriceNotAllowed {
        /// The rejected price.
        price: String,
    },

    /// A market data request named no symbols.
    #[error("market data request must name at least one symbol")]
    EmptySymbols,
}

/// Errors in FIX session layer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// `start` was called while the session was not disconnected.
    #[error("session is already started (state {state})")]
    AlreadyStarted {
        /// State observed when the call was made.
        state: String,
    },

    /// An operation needing a logged-in session was called too early or late.
    #[error("session is not logged in (state {state})")]
    NotLoggedIn {
        /// State observed when the call was made.
        state: String,
    },

    /// Logon did not complete; terminal for that `start` call.
    #[error("login failed: {reason}")]
    LoginFailed {
        /// Why the logon did not complete.
        reason: String,
    },

    /// Logon was rejected by counterparty.
    #[error("logon rejected: {reason}")]
    LogonRejected {
        /// Reason for rejection.
        reason: String,
    },

    /// Heartbeat timeout - no response to TestRequest.
    #[error("heartbeat timeout after {elapsed_ms} milliseconds")]
    HeartbeatTimeout {
        /// Elapsed time in milliseconds since last message.
        elapsed_ms: u64,
    },

    /// No live connection is available to carry the message.
    #[error("transport is not connected")]
    NotConnected,

    /// The client order id counter reached `u64::MAX`.
    #[error("client order ids exhausted")]
    IdsExhausted,

    /// Session configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::ChecksumMismatch {
            calculated: 100,
            declared: 200,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: calculated 100, declared 200"
        );
    }

    #[test]
    fn test_fix_error_from_validation() {
        let fix_err: FixError = ValidationError::LimitPriceRequired.into();
        assert_eq!(
            fix_err.as_validation(),
            Some(&ValidationError::LimitPriceRequired)
        );
        assert!(fix_err.as_session().is_none());
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::NotLoggedIn {
            state: "Disconnected".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "session is not logged in (state Disconnected)"
        );

        let err = SessionError::LoginFailed {
            reason: "timed out".to_string(),
        };
        assert_eq!(err.to_string(), "login failed: timed out");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::MissingField { field: "symbol" };
        assert_eq!(err.to_string(), "missing required field: symbol");
    }
}

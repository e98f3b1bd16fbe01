/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Tokio codec for FIX message framing.
//!
//! The decoder locates one complete frame using BeginString and BodyLength,
//! then hands it to the tag=value decoder. The encoder serializes a
//! [`Message`] with the tag=value encoder.

use bytes::{BufMut, BytesMut};
use gatefix_core::error::{DecodeError, FixError};
use gatefix_core::message::Message;
use gatefix_tagvalue::SOH;
use memchr::memchr;
use tokio_util::codec::{Decoder, Encoder};

/// Length of the `10=XXX<SOH>` trailer.
const TRAILER_LEN: usize = 7;

/// Tokio codec for FIX message framing.
#[derive(Debug, Clone)]
pub struct FixCodec {
    max_message_size: usize,
    validate_checksum: bool,
}

impl FixCodec {
    /// Creates a new codec with a 1 MiB frame limit and checksum validation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_message_size: 1024 * 1024,
            validate_checksum: true,
        }
    }

    /// Sets the maximum message size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Sets whether to validate checksums.
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }

    /// Returns the length of the first complete frame in `src`, if any.
    fn frame_len(&self, src: &[u8]) -> Result<Option<usize>, DecodeError> {
        if src.len() < 2 {
            return Ok(None);
        }
        if &src[..2] != b"8=" {
            return Err(DecodeError::InvalidBeginString);
        }
        let Some(first_soh) = memchr(SOH, src) else {
            return Ok(None);
        };

        let body_len_start = first_soh + 1;
        if src.len() < body_len_start + 2 {
            return Ok(None);
        }
        if &src[body_len_start..body_len_start + 2] != b"9=" {
            return Err(DecodeError::MissingBodyLength);
        }
        let Some(body_len_soh) = memchr(SOH, &src[body_len_start..]).map(|p| body_len_start + p)
        else {
            return Ok(None);
        };

        let body_length: usize = std::str::from_utf8(&src[body_len_start + 2..body_len_soh])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(DecodeError::InvalidBodyLength)?;

        let total = body_len_soh + 1 + body_length + TRAILER_LEN;
        if total > self.max_message_size {
            return Err(DecodeError::MessageTooLarge {
                size: total,
                max_size: self.max_message_size,
            });
        }
        Ok((src.len() >= total).then_some(total))
    }
}

impl Default for FixCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FixCodec {
    type Item = Message;
    type Error = FixError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(total) = self.frame_len(src)? else {
            return Ok(None);
        };
        let frame = src.split_to(total);
        let message = gatefix_tagvalue::Decoder::new(&frame)
            .with_checksum_validation(self.validate_checksum)
            .decode()?;
        Ok(Some(message))
    }
}

impl Encoder<&Message> for FixCodec {
    type Error = FixError;

    fn encode(&mut self, item: &Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let bytes = gatefix_tagvalue::Encoder::encode(item)?;
        dst.reserve(bytes.len());
        dst.put_slice(&bytes);
        Ok(())
    }
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! FIX message encoder.
//!
//! Serializes a [`Message`] into tag=value bytes. BeginString, BodyLength and
//! CheckSum are computed here; callers never set tags 9 or 10 themselves.

use crate::SOH;
use crate::checksum::{calculate_checksum, format_checksum};
use bytes::{BufMut, BytesMut};
use gatefix_core::error::EncodeError;
use gatefix_core::field::tags;
use gatefix_core::message::{FieldMap, Message};

/// FIX message encoder.
///
/// Fields are appended to a body buffer; [`Encoder::finish`] prepends the
/// BeginString and BodyLength fields and appends the checksum.
#[derive(Debug)]
pub struct Encoder {
    body: BytesMut,
    begin_string: String,
}

impl Encoder {
    /// Creates a new encoder with the specified BeginString.
    ///
    /// # Arguments
    /// * `begin_string` - The FIX version string (e.g., "FIX.4.4")
    #[must_use]
    pub fn new(begin_string: &str) -> Self {
        Self {
            body: BytesMut::with_capacity(256),
            begin_string: begin_string.to_string(),
        }
    }

    /// Encodes a complete message.
    ///
    /// MsgType is written first, then the remaining header fields, then body
    /// fields and finally body groups with their count field in front.
    ///
    /// # Errors
    /// Returns `EncodeError::MissingRequiredField` when BeginString or MsgType
    /// is absent, and `EncodeError::InvalidFieldValue` when a value contains
    /// the SOH delimiter.
    pub fn encode(message: &Message) -> Result<BytesMut, EncodeError> {
        let header = message.header();
        let begin_string = header
            .get(tags::BEGIN_STRING)
            .ok_or(EncodeError::MissingRequiredField {
                tag: tags::BEGIN_STRING,
            })?;
        let msg_type = header
            .get(tags::MSG_TYPE)
            .ok_or(EncodeError::MissingRequiredField {
                tag: tags::MSG_TYPE,
            })?;

        let mut encoder = Self::new(begin_string);
        encoder.put_checked(tags::MSG_TYPE, msg_type)?;
        encoder.put_field_map(header)?;
        encoder.put_field_map(message.body())?;
        Ok(encoder.finish())
    }

    /// Appends every field and group of `map`, skipping framing tags.
    ///
    /// # Errors
    /// Returns `EncodeError::InvalidFieldValue` when a value contains SOH.
    pub fn put_field_map(&mut self, map: &FieldMap) -> Result<(), EncodeError> {
        for (tag, value) in map.fields() {
            if matches!(
                tag,
                tags::BEGIN_STRING | tags::BODY_LENGTH | tags::MSG_TYPE | tags::CHECKSUM
            ) {
                continue;
            }
            self.put_checked(tag, value)?;
        }
        for group in map.groups() {
            self.put_uint(group.count_tag(), group.len() as u64);
            for entry in group.entries() {
                self.put_field_map(entry)?;
            }
        }
        Ok(())
    }

    fn put_checked(&mut self, tag: u32, value: &str) -> Result<(), EncodeError> {
        if value.as_bytes().contains(&SOH) {
            return Err(EncodeError::InvalidFieldValue {
                tag,
                reason: "value contains the SOH delimiter".to_string(),
            });
        }
        self.put_raw(tag, value.as_bytes());
        Ok(())
    }

    /// Appends a field with a string value.
    #[inline]
    pub fn put_str(&mut self, tag: u32, value: &str) {
        self.put_raw(tag, value.as_bytes());
    }

    /// Appends a field with an unsigned integer value.
    #[inline]
    pub fn put_uint(&mut self, tag: u32, value: u64) {
        let mut buf = itoa::Buffer::new();
        let s = buf.format(value);
        self.put_raw(tag, s.as_bytes());
    }

    /// Appends a field with raw bytes.
    #[inline]
    pub fn put_raw(&mut self, tag: u32, value: &[u8]) {
        let mut tag_buf = itoa::Buffer::new();
        self.body.put_slice(tag_buf.format(tag).as_bytes());
        self.body.put_u8(b'=');
        self.body.put_slice(value);
        self.body.put_u8(SOH);
    }

    /// Finalizes the message and returns the complete encoded bytes.
    #[must_use]
    pub fn finish(self) -> BytesMut {
        let body_len = self.body.len();
        let mut len_buf = itoa::Buffer::new();
        let len_str = len_buf.format(body_len);

        let mut message =
            BytesMut::with_capacity(self.begin_string.len() + len_str.len() + body_len + 16);
        message.put_slice(b"8=");
        message.put_slice(self.begin_string.as_bytes());
        message.put_u8(SOH);
        message.put_slice(b"9=");
        message.put_slice(len_str.as_bytes());
        message.put_u8(SOH);
        message.put_slice(&self.body);

        let checksum = format_checksum(calculate_checksum(&message));
        message.put_slice(b"10=");
        message.put_slice(&checksum);
        message.put_u8(SOH);

        message
    }

    /// Returns the current body length.
    #[inline]
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}

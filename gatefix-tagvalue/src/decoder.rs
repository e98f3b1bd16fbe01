/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! FIX message decoder.
//!
//! Tokenizes a framed buffer into borrowed [`FieldRef`]s, validates framing
//! and checksum, then assembles an owned [`Message`] with header fields
//! separated from the body and repeating groups rebuilt from the layouts
//! registered in `gatefix-core`.

use crate::SOH;
use crate::checksum::{calculate_checksum, parse_checksum};
use gatefix_core::error::DecodeError;
use gatefix_core::field::{FieldRef, tags};
use gatefix_core::message::{FieldMap, GroupLayout, Message, group_layout, is_header_tag};
use memchr::memchr;
use smallvec::SmallVec;

/// Equals sign delimiter between tag and value.
pub const EQUALS: u8 = b'=';

/// FIX message decoder over a single framed message.
#[derive(Debug)]
pub struct Decoder<'a> {
    input: &'a [u8],
    offset: usize,
    validate_checksum: bool,
}

impl<'a> Decoder<'a> {
    /// Creates a new decoder for the given input buffer.
    #[inline]
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            validate_checksum: true,
        }
    }

    /// Sets whether to validate checksums during decoding.
    #[inline]
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }

    /// Decodes one complete message from the buffer.
    ///
    /// # Errors
    /// Returns `DecodeError` if the framing is malformed, the checksum does
    /// not match, a value is not UTF-8, or a group count disagrees with the
    /// entries present.
    pub fn decode(&mut self) -> Result<Message, DecodeError> {
        let start_offset = self.offset;

        let begin_string = self.next_field().ok_or(DecodeError::Incomplete)?;
        if begin_string.tag != tags::BEGIN_STRING || !begin_string.value.starts_with(b"FIX") {
            return Err(DecodeError::InvalidBeginString);
        }

        let body_length = self.next_field().ok_or(DecodeError::MissingBodyLength)?;
        if body_length.tag != tags::BODY_LENGTH {
            return Err(DecodeError::MissingBodyLength);
        }
        let body_length: usize = body_length
            .as_str()?
            .parse()
            .map_err(|_| DecodeError::InvalidBodyLength)?;
        let body_start = self.offset;

        let msg_type = self.next_field().ok_or(DecodeError::MissingMsgType)?;
        if msg_type.tag != tags::MSG_TYPE {
            return Err(DecodeError::MissingMsgType);
        }

        let mut fields: SmallVec<[FieldRef<'a>; 32]> = SmallVec::new();
        let (checksum_start, checksum_field) = loop {
            let field_start = self.offset;
            let field = self.next_field().ok_or(DecodeError::Incomplete)?;
            if field.tag == tags::CHECKSUM {
                break (field_start, field);
            }
            fields.push(field);
        };

        if checksum_start - body_start != body_length {
            return Err(DecodeError::InvalidBodyLength);
        }

        if self.validate_checksum {
            let declared = parse_checksum(checksum_field.value).ok_or_else(|| {
                DecodeError::InvalidFieldValue {
                    tag: tags::CHECKSUM,
                    reason: "invalid checksum format".to_string(),
                }
            })?;
            let calculated = calculate_checksum(&self.input[start_offset..checksum_start]);
            if calculated != declared {
                return Err(DecodeError::ChecksumMismatch {
                    calculated,
                    declared,
                });
            }
        }

        let mut header = FieldMap::new();
        header.set(tags::BEGIN_STRING, begin_string.as_str()?);
        header.set(tags::MSG_TYPE, msg_type.as_str()?);
        let mut body = FieldMap::new();

        let mut pos = 0;
        while pos < fields.len() {
            let field = fields[pos];
            pos += 1;
            if is_header_tag(field.tag) {
                header.set(field.tag, field.as_str()?);
            } else if let Some(layout) = group_layout(field.tag) {
                let expected: usize = field.parse()?;
                let entries = read_group(&fields, &mut pos, layout, expected)?;
                if entries.len() != expected {
                    return Err(DecodeError::GroupCountMismatch {
                        count_tag: layout.count_tag,
                        expected,
                        actual: entries.len(),
                    });
                }
                for entry in entries {
                    body.add_group_entry(layout.count_tag, entry);
                }
            } else {
                body.set(field.tag, field.as_str()?);
            }
        }

        Ok(Message::from_parts(header, body))
    }

    /// Parses the next field from the buffer.
    ///
    /// # Returns
    /// The next field, or `None` if the buffer holds no complete field.
    #[inline]
    pub fn next_field(&mut self) -> Option<FieldRef<'a>> {
        let remaining = self.input.get(self.offset..)?;
        let eq_pos = memchr(EQUALS, remaining)?;
        let tag = parse_tag(&remaining[..eq_pos])?;

        let value_start = eq_pos + 1;
        let soh_pos = memchr(SOH, &remaining[value_start..])?;
        let value = &remaining[value_start..value_start + soh_pos];

        self.offset += value_start + soh_pos + 1;
        Some(FieldRef::new(tag, value))
    }

    /// Returns the current offset in the buffer.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

/// Collects up to `expected` entries of one group starting at `pos`.
///
/// An entry opens on the delimiter tag. Every entry but the last runs until
/// the next delimiter. The last entry also ends on a header tag, another
/// group's count tag, or a tag it already holds, since anything after it
/// belongs to the enclosing body.
fn read_group(
    fields: &[FieldRef<'_>],
    pos: &mut usize,
    layout: &GroupLayout,
    expected: usize,
) -> Result<Vec<FieldMap>, DecodeError> {
    let mut entries = Vec::new();
    while let Some(field) = fields.get(*pos) {
        if field.tag != layout.delimiter {
            break;
        }
        let last = entries.len() + 1 >= expected;
        let mut entry = FieldMap::new();
        entry.set(field.tag, field.as_str()?);
        *pos += 1;
        while let Some(member) = fields.get(*pos) {
            if member.tag == layout.delimiter || is_header_tag(member.tag) {
                break;
            }
            if last
                && !layout.contains(member.tag)
                && (group_layout(member.tag).is_some() || entry.has(member.tag))
            {
                break;
            }
            entry.set(member.tag, member.as_str()?);
            *pos += 1;
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// Parses a tag number from ASCII digits.
#[inline]
fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }
    bytes.iter().try_fold(0u32, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u32::from(b - b'0'))
    })
}

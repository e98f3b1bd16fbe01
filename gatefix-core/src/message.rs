/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Generic FIX message container.
//!
//! This module provides:
//! - [`MsgType`]: Enumeration of the FIX message types this client handles
//! - [`FieldMap`]: Ordered tag/value fields plus repeating groups
//! - [`Message`]: Header/body pair exchanged with the counterparty
//! - [`GroupLayout`]: Static description of the repeating groups the decoder understands
//!
//! The container performs no domain validation. Values are stored as the
//! strings that travel on the wire and are coerced only on request.

use crate::error::DecodeError;
use crate::field::tags;
use crate::types::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// FIX message types used by the client.
///
/// Anything not listed is kept verbatim as `Custom(String)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MsgType {
    /// Heartbeat (0) - Session level.
    Heartbeat,
    /// Test Request (1) - Session level.
    TestRequest,
    /// Resend Request (2) - Session level.
    ResendRequest,
    /// Reject (3) - Session level.
    Reject,
    /// Sequence Reset (4) - Session level.
    SequenceReset,
    /// Logout (5) - Session level.
    Logout,
    /// Execution Report (8).
    ExecutionReport,
    /// Order Cancel Reject (9).
    OrderCancelReject,
    /// Logon (A) - Session level.
    Logon,
    /// News (B).
    News,
    /// New Order Single (D).
    NewOrderSingle,
    /// Order Cancel Request (F).
    OrderCancelRequest,
    /// Order Cancel/Replace Request (G).
    OrderCancelReplaceRequest,
    /// Order Status Request (H).
    OrderStatusRequest,
    /// Market Data Request (V).
    MarketDataRequest,
    /// Market Data Snapshot/Full Refresh (W).
    MarketDataSnapshotFullRefresh,
    /// Market Data Incremental Refresh (X).
    MarketDataIncrementalRefresh,
    /// Market Data Request Reject (Y).
    MarketDataRequestReject,
    /// Business Message Reject (j).
    BusinessMessageReject,
    /// Any other message type, kept as its wire value.
    Custom(String),
}

impl FromStr for MsgType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0" => Self::Heartbeat,
            "1" => Self::TestRequest,
            "2" => Self::ResendRequest,
            "3" => Self::Reject,
            "4" => Self::SequenceReset,
            "5" => Self::Logout,
            "8" => Self::ExecutionReport,
            "9" => Self::OrderCancelReject,
            "A" => Self::Logon,
            "B" => Self::News,
            "D" => Self::NewOrderSingle,
            "F" => Self::OrderCancelRequest,
            "G" => Self::OrderCancelReplaceRequest,
            "H" => Self::OrderStatusRequest,
            "V" => Self::MarketDataRequest,
            "W" => Self::MarketDataSnapshotFullRefresh,
            "X" => Self::MarketDataIncrementalRefresh,
            "Y" => Self::MarketDataRequestReject,
            "j" => Self::BusinessMessageReject,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl MsgType {
    /// Returns the wire value of this message type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heartbeat => "0",
            Self::TestRequest => "1",
            Self::ResendRequest => "2",
            Self::Reject => "3",
            Self::SequenceReset => "4",
            Self::Logout => "5",
            Self::ExecutionReport => "8",
            Self::OrderCancelReject => "9",
            Self::Logon => "A",
            Self::News => "B",
            Self::NewOrderSingle => "D",
            Self::OrderCancelRequest => "F",
            Self::OrderCancelReplaceRequest => "G",
            Self::OrderStatusRequest => "H",
            Self::MarketDataRequest => "V",
            Self::MarketDataSnapshotFullRefresh => "W",
            Self::MarketDataIncrementalRefresh => "X",
            Self::MarketDataRequestReject => "Y",
            Self::BusinessMessageReject => "j",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Returns a readable name, falling back to the wire value.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Heartbeat => "Heartbeat",
            Self::TestRequest => "TestRequest",
            Self::ResendRequest => "ResendRequest",
            Self::Reject => "Reject",
            Self::SequenceReset => "SequenceReset",
            Self::Logout => "Logout",
            Self::ExecutionReport => "ExecutionReport",
            Self::OrderCancelReject => "OrderCancelReject",
            Self::Logon => "Logon",
            Self::News => "News",
            Self::NewOrderSingle => "NewOrderSingle",
            Self::OrderCancelRequest => "OrderCancelRequest",
            Self::OrderCancelReplaceRequest => "OrderCancelReplaceRequest",
            Self::OrderStatusRequest => "OrderStatusRequest",
            Self::MarketDataRequest => "MarketDataRequest",
            Self::MarketDataSnapshotFullRefresh => "MarketDataSnapshotFullRefresh",
            Self::MarketDataIncrementalRefresh => "MarketDataIncrementalRefresh",
            Self::MarketDataRequestReject => "MarketDataRequestReject",
            Self::BusinessMessageReject => "BusinessMessageReject",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Returns true if this is an administrative (session level) message.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::Heartbeat
                | Self::TestRequest
                | Self::ResendRequest
                | Self::Reject
                | Self::SequenceReset
                | Self::Logout
                | Self::Logon
        )
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns true if `tag` belongs to the standard message header.
#[must_use]
pub const fn is_header_tag(tag: u32) -> bool {
    matches!(
        tag,
        8 | 9 | 35 | 34 | 43 | 49 | 50 | 52 | 56 | 57 | 90 | 91 | 97 | 115 | 116 | 122 | 128
            | 129 | 142 | 143 | 144 | 145 | 212 | 213 | 347 | 369 | 627
    )
}

/// Static description of a repeating group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLayout {
    /// Tag carrying the number of entries (NoXXX).
    pub count_tag: u32,
    /// First tag of every entry.
    pub delimiter: u32,
    /// Every tag that may appear inside an entry, delimiter included.
    pub members: &'static [u32],
}

impl GroupLayout {
    /// Returns true if `tag` may appear inside an entry of this group.
    #[inline]
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.members.contains(&tag)
    }
}

/// Repeating groups the decoder knows how to rebuild.
pub const GROUP_LAYOUTS: &[GroupLayout] = &[
    GroupLayout {
        count_tag: tags::NO_MD_ENTRY_TYPES,
        delimiter: tags::MD_ENTRY_TYPE,
        members: &[tags::MD_ENTRY_TYPE],
    },
    GroupLayout {
        count_tag: tags::NO_RELATED_SYM,
        delimiter: tags::SYMBOL,
        members: &[tags::SYMBOL, 22, 48, 65, 107, tags::SECURITY_TYPE, 207, 460],
    },
    GroupLayout {
        count_tag: tags::NO_MD_ENTRIES,
        delimiter: tags::MD_ENTRY_TYPE,
        members: &[
            tags::MD_ENTRY_TYPE,
            tags::MD_ENTRY_PX,
            tags::MD_ENTRY_SIZE,
            tags::MD_ENTRY_DATE,
            tags::MD_ENTRY_TIME,
            274,
            275,
            276,
            277,
            tags::MD_ENTRY_ID,
            279,
            280,
            282,
            283,
            284,
            286,
            290,
            299,
            tags::NUMBER_OF_ORDERS,
            15,
            tags::TEXT,
        ],
    },
];

/// Looks up the layout of the group introduced by `count_tag`.
#[must_use]
pub fn group_layout(count_tag: u32) -> Option<&'static GroupLayout> {
    GROUP_LAYOUTS.iter().find(|layout| layout.count_tag == count_tag)
}

/// One repeating group: the count tag and its ordered entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    count_tag: u32,
    entries: Vec<FieldMap>,
}

impl Group {
    /// Returns the tag carrying the entry count.
    #[inline]
    #[must_use]
    pub const fn count_tag(&self) -> u32 {
        self.count_tag
    }

    /// Returns the entries in wire order.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[FieldMap] {
        &self.entries
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the group has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered set of tag/value fields with attached repeating groups.
///
/// Setting a tag that is already present replaces the value in place, so
/// the last writer wins and the original position is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: Vec<(u32, String)>,
    groups: Vec<Group>,
}

impl FieldMap {
    /// Creates an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `tag`, or `None` when absent.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&str> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if `tag` is present.
    #[must_use]
    pub fn has(&self, tag: u32) -> bool {
        self.fields.iter().any(|(t, _)| *t == tag)
    }

    /// Sets `tag` to `value`, replacing any earlier value.
    pub fn set(&mut self, tag: u32, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(t, _)| *t == tag) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((tag, value)),
        }
    }

    /// Sets a single-character field.
    pub fn set_char(&mut self, tag: u32, value: char) {
        self.set(tag, value.to_string());
    }

    /// Sets an integer field.
    pub fn set_int(&mut self, tag: u32, value: i64) {
        self.set(tag, value.to_string());
    }

    /// Sets a decimal field using its natural scale.
    pub fn set_decimal(&mut self, tag: u32, value: Decimal) {
        self.set(tag, value.to_string());
    }

    /// Sets a boolean field (FIX uses 'Y'/'N').
    pub fn set_bool(&mut self, tag: u32, value: bool) {
        self.set(tag, if value { "Y" } else { "N" });
    }

    /// Sets a UTCTimestamp field with millisecond precision.
    pub fn set_timestamp(&mut self, tag: u32, value: Timestamp) {
        self.set(tag, value.format_millis().as_str());
    }

    /// Removes `tag`, returning its previous value.
    pub fn remove(&mut self, tag: u32) -> Option<String> {
        let pos = self.fields.iter().position(|(t, _)| *t == tag)?;
        Some(self.fields.remove(pos).1)
    }

    /// Parses the value of `tag` as `T`.
    ///
    /// # Returns
    /// `Ok(None)` when the field is absent.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidFieldValue` if the value does not parse.
    pub fn get_parsed<T: FromStr>(&self, tag: u32) -> Result<Option<T>, DecodeError> {
        match self.get(tag) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| DecodeError::InvalidFieldValue {
                    tag,
                    reason: format!(
                        "failed to parse '{}' as {}",
                        raw,
                        std::any::type_name::<T>()
                    ),
                }),
        }
    }

    /// Returns an iterator over the plain fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (u32, &str)> {
        self.fields.iter().map(|(t, v)| (*t, v.as_str()))
    }

    /// Returns the number of plain fields (groups excluded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are neither fields nor groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.groups.is_empty()
    }

    /// Appends one entry to the group introduced by `count_tag`.
    pub fn add_group_entry(&mut self, count_tag: u32, entry: FieldMap) {
        match self.groups.iter_mut().find(|g| g.count_tag == count_tag) {
            Some(group) => group.entries.push(entry),
            None => self.groups.push(Group {
                count_tag,
                entries: vec![entry],
            }),
        }
    }

    /// Returns the entries of the group introduced by `count_tag`.
    ///
    /// An absent group reads as an empty slice.
    #[must_use]
    pub fn group(&self, count_tag: u32) -> &[FieldMap] {
        self.groups
            .iter()
            .find(|g| g.count_tag == count_tag)
            .map(|g| g.entries.as_slice())
            .unwrap_or_default()
    }

    /// Returns an iterator over all groups in insertion order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    fn write_redacted(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (tag, value) in &self.fields {
            if *tag == tags::PASSWORD {
                write!(f, "{}=***|", tag)?;
            } else {
                write!(f, "{}={}|", tag, value)?;
            }
        }
        for group in &self.groups {
            write!(f, "{}={}|", group.count_tag, group.entries.len())?;
            for entry in &group.entries {
                entry.write_redacted(f)?;
            }
        }
        Ok(())
    }
}

/// A FIX message split into header and body.
///
/// Header carries routing and session fields (BeginString, MsgType, comp ids,
/// sequence number); the body carries business fields and groups. Body
/// accessors are mirrored on the message itself for convenience.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    header: FieldMap,
    body: FieldMap,
}

impl Message {
    /// Creates a message with BeginString and MsgType set in the header.
    #[must_use]
    pub fn new(begin_string: &str, msg_type: &MsgType) -> Self {
        let mut header = FieldMap::new();
        header.set(tags::BEGIN_STRING, begin_string);
        header.set(tags::MSG_TYPE, msg_type.as_str());
        Self {
            header,
            body: FieldMap::new(),
        }
    }

    /// Creates a message from already separated header and body.
    #[must_use]
    pub fn from_parts(header: FieldMap, body: FieldMap) -> Self {
        Self { header, body }
    }

    /// Returns the header fields.
    #[inline]
    #[must_use]
    pub fn header(&self) -> &FieldMap {
        &self.header
    }

    /// Returns the header fields for modification.
    #[inline]
    pub fn header_mut(&mut self) -> &mut FieldMap {
        &mut self.header
    }

    /// Returns the body fields.
    #[inline]
    #[must_use]
    pub fn body(&self) -> &FieldMap {
        &self.body
    }

    /// Returns the body fields for modification.
    #[inline]
    pub fn body_mut(&mut self) -> &mut FieldMap {
        &mut self.body
    }

    /// Returns the message type read from the header, if present.
    #[must_use]
    pub fn msg_type(&self) -> Option<MsgType> {
        self.header
            .get(tags::MSG_TYPE)
            .and_then(|raw| raw.parse().ok())
    }

    /// Returns the BeginString read from the header, if present.
    #[must_use]
    pub fn begin_string(&self) -> Option<&str> {
        self.header.get(tags::BEGIN_STRING)
    }

    /// Returns true if the message is a session-level message.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.msg_type().is_some_and(|t| t.is_admin())
    }

    /// Returns the body value of `tag`.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&str> {
        self.body.get(tag)
    }

    /// Returns true if the body contains `tag`.
    #[must_use]
    pub fn has(&self, tag: u32) -> bool {
        self.body.has(tag)
    }

    /// Sets a body field.
    pub fn set(&mut self, tag: u32, value: impl Into<String>) {
        self.body.set(tag, value);
    }

    /// Removes a body field.
    pub fn remove(&mut self, tag: u32) -> Option<String> {
        self.body.remove(tag)
    }

    /// Appends an entry to a body group.
    pub fn add_group_entry(&mut self, count_tag: u32, entry: FieldMap) {
        self.body.add_group_entry(count_tag, entry);
    }

    /// Returns the entries of a body group.
    #[must_use]
    pub fn group(&self, count_tag: u32) -> &[FieldMap] {
        self.body.group(count_tag)
    }
}

/// Pipe-delimited rendering for logs. The Password field is masked.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.header.write_redacted(f)?;
        self.body.write_redacted(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msg_type_from_str() {
        assert_eq!("0".parse::<MsgType>().unwrap(), MsgType::Heartbeat);
        assert_eq!("A".parse::<MsgType>().unwrap(), MsgType::Logon);
        assert_eq!("D".parse::<MsgType>().unwrap(), MsgType::NewOrderSingle);
        assert_eq!("W".parse::<MsgType>().unwrap(), MsgType::MarketDataSnapshotFullRefresh);
    }

    #[test]
    fn test_msg_type_custom() {
        let custom: MsgType = "XX".parse().unwrap();
        assert!(matches!(custom, MsgType::Custom(_)));
        assert_eq!(custom.as_str(), "XX");
        assert_eq!(custom.name(), "XX");
    }

    #[test]
    fn test_msg_type_is_admin() {
        assert!(MsgType::Heartbeat.is_admin());
        assert!(MsgType::Logon.is_admin());
        assert!(!MsgType::NewOrderSingle.is_admin());
        assert!(!MsgType::News.is_admin());
    }

    #[test]
    fn test_field_map_set_replaces_in_place() {
        let mut map = FieldMap::new();
        map.set(tags::SYMBOL, "BTCUSD");
        map.set(tags::SIDE, "1");
        map.set(tags::SYMBOL, "ETHUSD");

        let fields: Vec<_> = map.fields().collect();
        assert_eq!(fields, vec![(55, "ETHUSD"), (54, "1")]);
    }

    #[test]
    fn test_field_map_absent_and_remove() {
        let mut map = FieldMap::new();
        assert_eq!(map.get(tags::PRICE), None);
        assert!(!map.has(tags::PRICE));

        map.set_decimal(tags::PRICE, Decimal::new(400005, 1));
        assert_eq!(map.get(tags::PRICE), Some("40000.5"));
        assert_eq!(map.remove(tags::PRICE).as_deref(), Some("40000.5"));
        assert!(!map.has(tags::PRICE));
    }

    #[test]
    fn test_field_map_get_parsed() {
        let mut map = FieldMap::new();
        map.set(tags::ORDER_QTY, "1.5");
        map.set(tags::TEXT, "not a number");

        assert_eq!(
            map.get_parsed::<Decimal>(tags::ORDER_QTY).unwrap(),
            Some(Decimal::new(15, 1))
        );
        assert_eq!(map.get_parsed::<Decimal>(tags::PRICE).unwrap(), None);
        assert!(map.get_parsed::<Decimal>(tags::TEXT).is_err());
    }

    #[test]
    fn test_field_map_groups_keep_order() {
        let mut map = FieldMap::new();
        for symbol in ["BTCUSD", "ETHUSD"] {
            let mut entry = FieldMap::new();
            entry.set(tags::SYMBOL, symbol);
            map.add_group_entry(tags::NO_RELATED_SYM, entry);
        }

        let symbols: Vec<_> = map
            .group(tags::NO_RELATED_SYM)
            .iter()
            .filter_map(|e| e.get(tags::SYMBOL))
            .collect();
        assert_eq!(symbols, vec!["BTCUSD", "ETHUSD"]);
        assert!(map.group(tags::NO_MD_ENTRIES).is_empty());
    }

    #[test]
    fn test_message_header_body_split() {
        let mut msg = Message::new("FIX.4.4", &MsgType::NewOrderSingle);
        msg.set(tags::CL_ORD_ID, "1");

        assert_eq!(msg.begin_string(), Some("FIX.4.4"));
        assert_eq!(msg.msg_type(), Some(MsgType::NewOrderSingle));
        assert!(msg.header().has(tags::MSG_TYPE));
        assert!(!msg.body().has(tags::MSG_TYPE));
        assert_eq!(msg.get(tags::CL_ORD_ID), Some("1"));
        assert!(!msg.is_admin());
    }

    #[test]
    fn test_message_display_masks_password() {
        let mut msg = Message::new("FIX.4.4", &MsgType::Logon);
        msg.set(tags::PASSWORD, "secret");

        let rendered = msg.to_string();
        assert!(rendered.contains("554=***|"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_group_layout_lookup() {
        let layout = group_layout(tags::NO_MD_ENTRIES).unwrap();
        assert_eq!(layout.delimiter, tags::MD_ENTRY_TYPE);
        assert!(layout.contains(tags::MD_ENTRY_PX));
        assert!(group_layout(tags::SYMBOL).is_none());
        assert!(is_header_tag(tags::SENDER_COMP_ID));
        assert!(!is_header_tag(tags::SYMBOL));
    }
}

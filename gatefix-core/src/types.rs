/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Core value types shared by every GateFix crate.
//!
//! This module provides:
//! - [`SeqNum`]: Message sequence number
//! - [`Timestamp`]: UTC timestamp rendered in FIX format
//! - [`CompId`]: Component identifier (SenderCompID, TargetCompID)
//! - Wire enumerations: [`Side`], [`OrdType`], [`TimeInForce`], [`ExecType`],
//!   [`OrdStatus`], [`MdEntryType`]
//! - [`WireEnum`]: A decoded enumeration that keeps unknown codes verbatim

use arrayvec::ArrayString;
use chrono::{DateTime, Utc};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for CompID strings in bytes.
pub const COMP_ID_MAX_LEN: usize = 32;

/// BeginString used by every message this client sends.
pub const BEGIN_STRING_FIX44: &str = "FIX.4.4";

/// FIX message sequence number.
///
/// Sequence numbers start at 1 and increment for each message sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SeqNum(u64);

impl SeqNum {
    /// Creates a new sequence number.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw sequence number value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the next sequence number.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Default for SeqNum {
    fn default() -> Self {
        Self(1)
    }
}

impl From<u64> for SeqNum {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// UTC timestamp with nanosecond resolution.
///
/// Rendered on the wire as `YYYYMMDD-HH:MM:SS.sss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    nanos_since_epoch: u64,
}

impl Timestamp {
    /// Creates a timestamp from nanoseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self {
            nanos_since_epoch: nanos,
        }
    }

    /// Creates a timestamp from milliseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            nanos_since_epoch: millis * 1_000_000,
        }
    }

    /// Returns the current UTC timestamp.
    #[inline]
    #[must_use]
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// Returns nanoseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos_since_epoch
    }

    /// Returns milliseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.nanos_since_epoch / 1_000_000
    }

    /// Converts to a chrono `DateTime<Utc>`.
    #[must_use]
    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.nanos_since_epoch as i64)
    }

    /// Formats the timestamp with millisecond precision.
    ///
    /// Format: `YYYYMMDD-HH:MM:SS.sss`
    #[must_use]
    pub fn format_millis(self) -> ArrayString<21> {
        let dt = self.to_datetime();
        let mut buf = ArrayString::new();
        let _ = std::fmt::write(
            &mut buf,
            format_args!("{}", dt.format("%Y%m%d-%H:%M:%S%.3f")),
        );
        buf
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            nanos_since_epoch: dt.timestamp_nanos_opt().unwrap_or(0).max(0) as u64,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_millis())
    }
}

/// Component identifier for FIX sessions.
///
/// Used for SenderCompID (tag 49) and TargetCompID (tag 56).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct CompId(ArrayString<COMP_ID_MAX_LEN>);

impl CompId {
    /// Creates a new CompId from a string slice.
    ///
    /// # Returns
    /// `None` if the string is empty or longer than [`COMP_ID_MAX_LEN`].
    #[must_use]
    pub fn new(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        ArrayString::from(s).ok().map(Self)
    }

    /// Returns the CompId as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for CompId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CompId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CompId {
    type Err = arrayvec::CapacityError<()>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or(arrayvec::CapacityError::new(()))
    }
}

/// A single-character FIX enumeration with a readable name.
pub trait WireCode: Sized + Copy {
    /// Returns the wire character.
    fn code(self) -> char;

    /// Parses a wire value; only single-byte values can match.
    fn from_code(code: &str) -> Option<Self>;

    /// Returns the upper-case readable name used in logs and events.
    fn name(self) -> &'static str;
}

#[inline]
fn single_byte(code: &str) -> Option<u8> {
    match code.as_bytes() {
        [b] => Some(*b),
        _ => None,
    }
}

macro_rules! wire_code {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl WireCode for $ty {
            #[inline]
            fn code(self) -> char {
                self as u8 as char
            }

            fn from_code(code: &str) -> Option<Self> {
                single_byte(code).and_then(<$ty as FromPrimitive>::from_u8)
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

/// Order side (tag 54).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy.
    Buy = b'1',
    /// Sell.
    Sell = b'2',
}

wire_code!(Side { Buy => "BUY", Sell => "SELL" });

/// Order type (tag 40).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrdType {
    /// Executes at the best available price.
    Market = b'1',
    /// Executes at the given price or better.
    Limit = b'2',
}

wire_code!(OrdType { Market => "MARKET", Limit => "LIMIT" });

/// Time in force (tag 59).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    FromPrimitive,
    ToPrimitive,
)]
#[repr(u8)]
pub enum TimeInForce {
    /// Good for the trading day.
    #[default]
    Day = b'0',
    /// Good till cancel.
    GoodTillCancel = b'1',
    /// Immediate or cancel.
    ImmediateOrCancel = b'3',
    /// Fill or kill.
    FillOrKill = b'4',
}

wire_code!(TimeInForce {
    Day => "DAY",
    GoodTillCancel => "GTC",
    ImmediateOrCancel => "IOC",
    FillOrKill => "FOK",
});

/// Execution type (tag 150).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
pub enum ExecType {
    /// Order accepted.
    New = b'0',
    /// Legacy partial fill.
    PartialFill = b'1',
    /// Legacy fill.
    Fill = b'2',
    /// Order canceled.
    Canceled = b'4',
    /// Order replaced.
    Replaced = b'5',
    /// Order rejected.
    Rejected = b'8',
    /// Awaiting acceptance.
    PendingNew = b'A',
    /// Order expired.
    Expired = b'C',
    /// Trade; reported as FILLED.
    Trade = b'F',
}

wire_code!(ExecType {
    New => "NEW",
    PartialFill => "PARTIAL_FILL",
    Fill => "FILL",
    Canceled => "CANCELED",
    Replaced => "REPLACED",
    Rejected => "REJECTED",
    PendingNew => "PENDING_NEW",
    Expired => "EXPIRED",
    Trade => "FILLED",
});

/// Order status (tag 39).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
pub enum OrdStatus {
    /// Order accepted.
    New = b'0',
    /// Partially filled.
    PartiallyFilled = b'1',
    /// Completely filled.
    Filled = b'2',
    /// Canceled.
    Canceled = b'4',
    /// Replaced.
    Replaced = b'5',
    /// Cancel pending.
    PendingCancel = b'6',
    /// Rejected.
    Rejected = b'8',
    /// Awaiting acceptance.
    PendingNew = b'A',
    /// Expired.
    Expired = b'C',
}

wire_code!(OrdStatus {
    New => "NEW",
    PartiallyFilled => "PARTIALLY_FILLED",
    Filled => "FILLED",
    Canceled => "CANCELED",
    Replaced => "REPLACED",
    PendingCancel => "PENDING_CANCEL",
    Rejected => "REJECTED",
    PendingNew => "PENDING_NEW",
    Expired => "EXPIRED",
});

/// Market data entry type (tag 269).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
pub enum MdEntryType {
    /// Bid side of the book.
    Bid = b'0',
    /// Offer side of the book.
    Offer = b'1',
    /// Last trade.
    Trade = b'2',
}

wire_code!(MdEntryType { Bid => "BID", Offer => "OFFER", Trade => "TRADE" });

/// A decoded enumeration value.
///
/// Codes outside the known table are preserved verbatim instead of being
/// dropped, so the caller still sees what the counterparty sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireEnum<T> {
    /// A code from the known table.
    Known(T),
    /// Any other code, as received.
    Raw(String),
}

impl<T: WireCode> WireEnum<T> {
    /// Decodes a wire value.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match T::from_code(raw) {
            Some(known) => Self::Known(known),
            None => Self::Raw(raw.to_string()),
        }
    }

    /// Returns the known value, if any.
    #[must_use]
    pub fn known(&self) -> Option<T> {
        match self {
            Self::Known(value) => Some(*value),
            Self::Raw(_) => None,
        }
    }

    /// Returns the readable name, or the raw code when unknown.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Known(value) => value.name(),
            Self::Raw(raw) => raw.as_str(),
        }
    }
}

impl<T: WireCode> fmt::Display for WireEnum<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_num_operations() {
        let seq = SeqNum::new(5);
        assert_eq!(seq.value(), 5);
        assert_eq!(seq.next().value(), 6);
        assert_eq!(SeqNum::default().value(), 1);
    }

    #[test]
    fn test_timestamp_format() {
        let ts = Timestamp::from_millis(1_500);
        assert_eq!(ts.format_millis().as_str(), "19700101-00:00:01.500");
        assert_eq!(ts.as_millis(), 1_500);
    }

    #[test]
    fn test_comp_id() {
        let id = CompId::new("SENDER").unwrap();
        assert_eq!(id.as_str(), "SENDER");
        assert!(CompId::new("").is_none());
        assert!(CompId::new(&"A".repeat(COMP_ID_MAX_LEN + 1)).is_none());
    }

    #[test]
    fn test_side_codes() {
        assert_eq!(Side::from_code("1"), Some(Side::Buy));
        assert_eq!(Side::from_code("2"), Some(Side::Sell));
        assert_eq!(Side::from_code("12"), None);
        assert_eq!(Side::Sell.code(), '2');
        assert_eq!(Side::Buy.to_string(), "BUY");
    }

    #[test]
    fn test_exec_type_trade_reads_filled() {
        assert_eq!(ExecType::from_code("F"), Some(ExecType::Trade));
        assert_eq!(ExecType::Trade.name(), "FILLED");
        assert_eq!(ExecType::from_code("3"), None);
    }

    #[test]
    fn test_ord_status_table() {
        let expected = [
            ("0", "NEW"),
            ("1", "PARTIALLY_FILLED"),
            ("2", "FILLED"),
            ("4", "CANCELED"),
            ("5", "REPLACED"),
            ("6", "PENDING_CANCEL"),
            ("8", "REJECTED"),
            ("A", "PENDING_NEW"),
            ("C", "EXPIRED"),
        ];
        for (code, name) in expected {
            let status = OrdStatus::from_code(code).unwrap();
            assert_eq!(status.name(), name);
            assert_eq!(status.code().to_string(), code);
        }
    }

    #[test]
    fn test_time_in_force_default_is_day() {
        assert_eq!(TimeInForce::default(), TimeInForce::Day);
        assert_eq!(TimeInForce::Day.code(), '0');
    }

    #[test]
    fn test_wire_enum_keeps_unknown_codes() {
        let known: WireEnum<OrdType> = WireEnum::from_wire("2");
        assert_eq!(known, WireEnum::Known(OrdType::Limit));
        assert_eq!(known.name(), "LIMIT");

        let raw: WireEnum<OrdType> = WireEnum::from_wire("P");
        assert_eq!(raw, WireEnum::Raw("P".to_string()));
        assert_eq!(raw.known(), None);
        assert_eq!(raw.to_string(), "P");
    }
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Field tags and zero-copy field references.
//!
//! This module provides:
//! - [`tags`]: Standard FIX 4.4 tag numbers used by the client
//! - [`FieldRef`]: Zero-copy reference to a field within a wire buffer

use crate::error::DecodeError;
use std::str::FromStr;

/// Standard FIX 4.4 field tag numbers.
///
/// The numbering must match the counterparty's dictionary, so these are the
/// standard values and never renumbered.
pub mod tags {
    /// Account (1).
    pub const ACCOUNT: u32 = 1;
    /// AvgPx (6).
    pub const AVG_PX: u32 = 6;
    /// BeginString (8).
    pub const BEGIN_STRING: u32 = 8;
    /// BodyLength (9).
    pub const BODY_LENGTH: u32 = 9;
    /// CheckSum (10).
    pub const CHECKSUM: u32 = 10;
    /// ClOrdID (11).
    pub const CL_ORD_ID: u32 = 11;
    /// CumQty (14).
    pub const CUM_QTY: u32 = 14;
    /// ExecID (17).
    pub const EXEC_ID: u32 = 17;
    /// MsgSeqNum (34).
    pub const MSG_SEQ_NUM: u32 = 34;
    /// MsgType (35).
    pub const MSG_TYPE: u32 = 35;
    /// NewSeqNo (36).
    pub const NEW_SEQ_NO: u32 = 36;
    /// OrderID (37).
    pub const ORDER_ID: u32 = 37;
    /// OrderQty (38).
    pub const ORDER_QTY: u32 = 38;
    /// OrdStatus (39).
    pub const ORD_STATUS: u32 = 39;
    /// OrdType (40).
    pub const ORD_TYPE: u32 = 40;
    /// PossDupFlag (43).
    pub const POSS_DUP_FLAG: u32 = 43;
    /// Price (44).
    pub const PRICE: u32 = 44;
    /// RefSeqNum (45).
    pub const REF_SEQ_NUM: u32 = 45;
    /// SenderCompID (49).
    pub const SENDER_COMP_ID: u32 = 49;
    /// SenderSubID (50).
    pub const SENDER_SUB_ID: u32 = 50;
    /// SendingTime (52).
    pub const SENDING_TIME: u32 = 52;
    /// Side (54).
    pub const SIDE: u32 = 54;
    /// Symbol (55).
    pub const SYMBOL: u32 = 55;
    /// TargetCompID (56).
    pub const TARGET_COMP_ID: u32 = 56;
    /// TargetSubID (57).
    pub const TARGET_SUB_ID: u32 = 57;
    /// Text (58).
    pub const TEXT: u32 = 58;
    /// TimeInForce (59).
    pub const TIME_IN_FORCE: u32 = 59;
    /// TransactTime (60).
    pub const TRANSACT_TIME: u32 = 60;
    /// ExecBroker (76).
    pub const EXEC_BROKER: u32 = 76;
    /// EncryptMethod (98).
    pub const ENCRYPT_METHOD: u32 = 98;
    /// ExDestination (100).
    pub const EX_DESTINATION: u32 = 100;
    /// HeartBtInt (108).
    pub const HEART_BT_INT: u32 = 108;
    /// TestReqID (112).
    pub const TEST_REQ_ID: u32 = 112;
    /// OrigSendingTime (122).
    pub const ORIG_SENDING_TIME: u32 = 122;
    /// GapFillFlag (123).
    pub const GAP_FILL_FLAG: u32 = 123;
    /// ResetSeqNumFlag (141).
    pub const RESET_SEQ_NUM_FLAG: u32 = 141;
    /// NoRelatedSym (146).
    pub const NO_RELATED_SYM: u32 = 146;
    /// Headline (148).
    pub const HEADLINE: u32 = 148;
    /// ExecType (150).
    pub const EXEC_TYPE: u32 = 150;
    /// LeavesQty (151).
    pub const LEAVES_QTY: u32 = 151;
    /// SecurityType (167).
    pub const SECURITY_TYPE: u32 = 167;
    /// MDReqID (262).
    pub const MD_REQ_ID: u32 = 262;
    /// SubscriptionRequestType (263).
    pub const SUBSCRIPTION_REQUEST_TYPE: u32 = 263;
    /// MarketDepth (264).
    pub const MARKET_DEPTH: u32 = 264;
    /// MDUpdateType (265).
    pub const MD_UPDATE_TYPE: u32 = 265;
    /// NoMDEntryTypes (267).
    pub const NO_MD_ENTRY_TYPES: u32 = 267;
    /// NoMDEntries (268).
    pub const NO_MD_ENTRIES: u32 = 268;
    /// MDEntryType (269).
    pub const MD_ENTRY_TYPE: u32 = 269;
    /// MDEntryPx (270).
    pub const MD_ENTRY_PX: u32 = 270;
    /// MDEntrySize (271).
    pub const MD_ENTRY_SIZE: u32 = 271;
    /// MDEntryDate (272).
    pub const MD_ENTRY_DATE: u32 = 272;
    /// MDEntryTime (273).
    pub const MD_ENTRY_TIME: u32 = 273;
    /// MDReqRejReason (281).
    pub const MD_REQ_REJ_REASON: u32 = 281;
    /// MDEntryID (278).
    pub const MD_ENTRY_ID: u32 = 278;
    /// NumberOfOrders (346).
    pub const NUMBER_OF_ORDERS: u32 = 346;
    /// SessionRejectReason (373).
    pub const SESSION_REJECT_REASON: u32 = 373;
    /// Password (554).
    pub const PASSWORD: u32 = 554;
}

/// Zero-copy reference to a field within a FIX message buffer.
///
/// Produced by the tag=value tokenizer; values borrow from the original
/// buffer until they are copied into an owned message.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    /// The field tag number.
    pub tag: u32,
    /// Reference to the field value bytes (without delimiters).
    pub value: &'a [u8],
}

impl<'a> FieldRef<'a> {
    /// Creates a new field reference.
    #[inline]
    #[must_use]
    pub const fn new(tag: u32, value: &'a [u8]) -> Self {
        Self { tag, value }
    }

    /// Returns the value as a string slice.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidUtf8` if the value is not valid UTF-8.
    pub fn as_str(&self) -> Result<&'a str, DecodeError> {
        std::str::from_utf8(self.value).map_err(DecodeError::from)
    }

    /// Parses the value as the specified type.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidFieldValue` if parsing fails.
    pub fn parse<T: FromStr>(&self) -> Result<T, DecodeError> {
        let s = self.as_str()?;
        s.parse().map_err(|_| DecodeError::InvalidFieldValue {
            tag: self.tag,
            reason: format!("failed to parse '{}' as {}", s, std::any::type_name::<T>()),
        })
    }

    /// Returns the length of the value in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.value.len()
    }

    /// Returns true if the value is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_ref_as_str() {
        let field = FieldRef::new(tags::CL_ORD_ID, b"ORDER123");
        assert_eq!(field.as_str().unwrap(), "ORDER123");
        assert_eq!(field.len(), 8);
    }

    #[test]
    fn test_field_ref_parse() {
        let field = FieldRef::new(tags::MSG_SEQ_NUM, b"12345");
        assert_eq!(field.parse::<u64>().unwrap(), 12345);

        let bad = FieldRef::new(tags::MSG_SEQ_NUM, b"12a");
        assert!(matches!(
            bad.parse::<u64>(),
            Err(DecodeError::InvalidFieldValue { tag: 34, .. })
        ));
    }

    #[test]
    fn test_field_ref_invalid_utf8() {
        let field = FieldRef::new(tags::TEXT, &[0xFF, 0xFE]);
        assert!(field.as_str().is_err());
    }
}

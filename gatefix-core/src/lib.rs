/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # GateFix Core
//!
//! Core types and error definitions for the GateFix client engine.
//!
//! This crate provides the building blocks used across all GateFix crates:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Field access**: standard FIX 4.4 tag numbers and zero-copy `FieldRef`
//! - **Messages**: the generic header/body `Message` with repeating groups
//! - **Core types**: `SeqNum`, `Timestamp`, `CompId` and the wire enumerations

pub mod error;
pub mod field;
pub mod message;
pub mod types;

pub use error::{
    DecodeError, EncodeError, FixError, Result, SessionError, ValidationError,
};
pub use field::{FieldRef, tags};
pub use message::{FieldMap, Group, GroupLayout, Message, MsgType, group_layout, is_header_tag};
pub use types::{
    BEGIN_STRING_FIX44, CompId, ExecType, MdEntryType, OrdStatus, OrdType, SeqNum, Side,
    TimeInForce, Timestamp, WireCode, WireEnum,
};

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # GateFix Tag-Value
//!
//! FIX tag=value encoding and decoding for the GateFix client engine.
//!
//! Messages travel as `tag=value` pairs separated by SOH (0x01), framed by
//! BeginString(8)/BodyLength(9) at the front and CheckSum(10) at the end.
//!
//! ## Features
//!
//! - **Borrowed tokenizing**: field values reference the input until the
//!   message is assembled
//! - **`memchr` delimiter search**
//! - **Repeating groups** for the layouts registered in `gatefix-core`

pub mod checksum;
pub mod decoder;
pub mod encoder;

pub use checksum::calculate_checksum;
pub use decoder::Decoder;
pub use encoder::Encoder;

/// SOH (Start of Header) delimiter used in FIX messages.
pub const SOH: u8 = 0x01;

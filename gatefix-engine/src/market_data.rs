/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Market data subscription requests (35=V).

use gatefix_core::error::ValidationError;
use gatefix_core::message::{FieldMap, Message, MsgType};
use gatefix_core::tags;
use gatefix_core::types::{BEGIN_STRING_FIX44, MdEntryType, WireCode};
use std::fmt;

/// Entry types requested for every subscription, in wire order.
pub const ENTRY_TYPES: [MdEntryType; 3] = [MdEntryType::Bid, MdEntryType::Offer, MdEntryType::Trade];

/// SubscriptionRequestType: snapshot plus updates.
pub const SUBSCRIBE_SNAPSHOT_AND_UPDATES: char = '1';

/// SecurityType: foreign exchange contract.
pub const SECURITY_TYPE_FX: &str = "FOR";

/// MarketDepth: full book.
pub const MARKET_DEPTH_FULL_BOOK: i64 = 0;

/// MDUpdateType: full refresh.
pub const UPDATE_TYPE_FULL_REFRESH: i64 = 0;

/// Snapshot-plus-updates subscription for a list of symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketDataRequest {
    md_req_id: Option<String>,
    symbols: Vec<String>,
}

impl MarketDataRequest {
    /// Creates a request with no symbols.
    #[must_use]
    pub fn new() -> Self {
        Self {
            md_req_id: None,
            symbols: Vec::new(),
        }
    }

    /// Creates a request for the given symbols, kept in order.
    #[must_use]
    pub fn for_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            md_req_id: None,
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends a symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbols.push(symbol.into());
        self
    }

    /// Sets the request id.
    #[must_use]
    pub fn with_md_req_id(mut self, id: impl Into<String>) -> Self {
        self.md_req_id = Some(id.into());
        self
    }

    /// Assigns the request id in place.
    pub fn set_md_req_id(&mut self, id: impl Into<String>) {
        self.md_req_id = Some(id.into());
    }

    /// Returns the request id.
    #[must_use]
    pub fn md_req_id(&self) -> Option<&str> {
        self.md_req_id.as_deref()
    }

    /// Returns the symbols.
    #[must_use]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Builds the MarketDataRequest message.
    ///
    /// # Errors
    /// Returns `ValidationError::MissingField` without a request id or with
    /// an empty symbol, and `ValidationError::EmptySymbols` without symbols.
    pub fn build(&self) -> Result<Message, ValidationError> {
        let id = self
            .md_req_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ValidationError::MissingField { field: "request id" })?;
        if self.symbols.is_empty() {
            return Err(ValidationError::EmptySymbols);
        }
        if self.symbols.iter().any(String::is_empty) {
            return Err(ValidationError::MissingField { field: "symbol" });
        }

        let mut message = Message::new(BEGIN_STRING_FIX44, &MsgType::MarketDataRequest);
        let body = message.body_mut();
        body.set(tags::MD_REQ_ID, id);
        body.set_char(tags::SUBSCRIPTION_REQUEST_TYPE, SUBSCRIBE_SNAPSHOT_AND_UPDATES);
        body.set(tags::SECURITY_TYPE, SECURITY_TYPE_FX);
        body.set_int(tags::MARKET_DEPTH, MARKET_DEPTH_FULL_BOOK);
        body.set_int(tags::MD_UPDATE_TYPE, UPDATE_TYPE_FULL_REFRESH);

        for entry_type in ENTRY_TYPES {
            let mut entry = FieldMap::new();
            entry.set_char(tags::MD_ENTRY_TYPE, entry_type.code());
            body.add_group_entry(tags::NO_MD_ENTRY_TYPES, entry);
        }
        for symbol in &self.symbols {
            let mut entry = FieldMap::new();
            entry.set(tags::SYMBOL, symbol.as_str());
            body.add_group_entry(tags::NO_RELATED_SYM, entry);
        }
        Ok(message)
    }
}

impl fmt::Display for MarketDataRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MarketDataRequest: ID={}, Symbols=[{}]",
            self.md_req_id.as_deref().unwrap_or("None"),
            self.symbols.join(", ")
        )
    }
}

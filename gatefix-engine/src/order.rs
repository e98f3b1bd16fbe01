/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! New order single requests.
//!
//! This module provides:
//! - [`OrderRequest`]: A buy or sell order, validated when built into a
//!   NewOrderSingle (35=D) message

use gatefix_core::error::ValidationError;
use gatefix_core::message::{Message, MsgType, is_header_tag};
use gatefix_core::tags;
use gatefix_core::types::{BEGIN_STRING_FIX44, OrdType, Side, TimeInForce, Timestamp, WireCode};
use rust_decimal::Decimal;
use std::fmt;

/// A single order to submit.
///
/// The client order id is normally left empty and assigned by the
/// controller at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    cl_ord_id: Option<String>,
    symbol: Option<String>,
    side: Option<Side>,
    ord_type: OrdType,
    quantity: Option<Decimal>,
    price: Option<Decimal>,
    time_in_force: TimeInForce,
    account: Option<String>,
    destination: Option<String>,
    exchange: Option<String>,
    extra_fields: Vec<(u32, String)>,
}

impl OrderRequest {
    /// Creates an empty MARKET order with DAY time in force.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cl_ord_id: None,
            symbol: None,
            side: None,
            ord_type: OrdType::Market,
            quantity: None,
            price: None,
            time_in_force: TimeInForce::Day,
            account: None,
            destination: None,
            exchange: None,
            extra_fields: Vec::new(),
        }
    }

    /// Creates a MARKET order.
    #[must_use]
    pub fn market(side: Side, symbol: impl Into<String>, quantity: Decimal) -> Self {
        Self::new()
            .with_side(side)
            .with_symbol(symbol)
            .with_quantity(quantity)
    }

    /// Creates a LIMIT order.
    #[must_use]
    pub fn limit(side: Side, symbol: impl Into<String>, quantity: Decimal, price: Decimal) -> Self {
        Self::market(side, symbol, quantity)
            .with_ord_type(OrdType::Limit)
            .with_price(price)
    }

    /// Creates an order whose type follows the price: LIMIT when a price
    /// is given, MARKET otherwise.
    #[must_use]
    pub fn priced(
        side: Side,
        symbol: impl Into<String>,
        quantity: Decimal,
        price: Option<Decimal>,
    ) -> Self {
        match price {
            Some(price) => Self::limit(side, symbol, quantity, price),
            None => Self::market(side, symbol, quantity),
        }
    }

    /// Creates a buy order; LIMIT when a price is given.
    #[must_use]
    pub fn buy(symbol: impl Into<String>, quantity: Decimal, price: Option<Decimal>) -> Self {
        Self::priced(Side::Buy, symbol, quantity, price)
    }

    /// Creates a sell order; LIMIT when a price is given.
    #[must_use]
    pub fn sell(symbol: impl Into<String>, quantity: Decimal, price: Option<Decimal>) -> Self {
        Self::priced(Side::Sell, symbol, quantity, price)
    }

    /// Sets the client order id.
    #[must_use]
    pub fn with_cl_ord_id(mut self, id: impl Into<String>) -> Self {
        self.cl_ord_id = Some(id.into());
        self
    }

    /// Sets the symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Sets the side.
    #[must_use]
    pub const fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    /// Sets the order type.
    #[must_use]
    pub const fn with_ord_type(mut self, ord_type: OrdType) -> Self {
        self.ord_type = ord_type;
        self
    }

    /// Sets the quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Sets the limit price.
    #[must_use]
    pub const fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the time in force.
    #[must_use]
    pub const fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = time_in_force;
        self
    }

    /// Sets the account (tag 1).
    #[must_use]
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Sets the destination broker (ExecBroker, tag 76).
    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Sets the exchange (ExDestination, tag 100).
    #[must_use]
    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    /// Adds an extra field written after the standard ones.
    ///
    /// A later field with the same tag, standard or extra, wins.
    #[must_use]
    pub fn with_extra_field(mut self, tag: u32, value: impl Into<String>) -> Self {
        self.extra_fields.push((tag, value.into()));
        self
    }

    /// Assigns the client order id in place.
    pub fn set_cl_ord_id(&mut self, id: impl Into<String>) {
        self.cl_ord_id = Some(id.into());
    }

    /// Returns the client order id.
    #[must_use]
    pub fn cl_ord_id(&self) -> Option<&str> {
        self.cl_ord_id.as_deref()
    }

    /// Returns the symbol.
    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Returns the side.
    #[must_use]
    pub const fn side(&self) -> Option<Side> {
        self.side
    }

    /// Returns the order type.
    #[must_use]
    pub const fn ord_type(&self) -> OrdType {
        self.ord_type
    }

    /// Returns the quantity.
    #[must_use]
    pub const fn quantity(&self) -> Option<Decimal> {
        self.quantity
    }

    /// Returns the limit price.
    #[must_use]
    pub const fn price(&self) -> Option<Decimal> {
        self.price
    }

    /// Returns the time in force.
    #[must_use]
    pub const fn time_in_force(&self) -> TimeInForce {
        self.time_in_force
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.cl_ord_id.as_deref().is_none_or(str::is_empty) {
            return Err(ValidationError::MissingField { field: "client order id" });
        }
        if self.symbol.as_deref().is_none_or(str::is_empty) {
            return Err(ValidationError::MissingField { field: "symbol" });
        }
        if self.side.is_none() {
            return Err(ValidationError::MissingField { field: "side" });
        }
        let quantity = self
            .quantity
            .ok_or(ValidationError::MissingField { field: "quantity" })?;
        if quantity <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveQuantity {
                quantity: quantity.to_string(),
            });
        }
        match (self.ord_type, self.price) {
            (OrdType::Limit, None) => Err(ValidationError::LimitPriceRequired),
            (OrdType::Market, Some(price)) => Err(ValidationError::MarketPriceNotAllowed {
                price: price.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Builds the NewOrderSingle message.
    ///
    /// # Errors
    /// Returns a `ValidationError` naming the first violated rule: missing
    /// client order id, symbol, side or quantity, a non-positive quantity,
    /// a LIMIT order without price or a MARKET order with one.
    pub fn build(&self) -> Result<Message, ValidationError> {
        self.validate()?;

        let mut message = Message::new(BEGIN_STRING_FIX44, &MsgType::NewOrderSingle);
        let body = message.body_mut();
        if let Some(id) = &self.cl_ord_id {
            body.set(tags::CL_ORD_ID, id.as_str());
        }
        if let Some(symbol) = &self.symbol {
            body.set(tags::SYMBOL, symbol.as_str());
        }
        if let Some(side) = self.side {
            body.set_char(tags::SIDE, side.code());
        }
        if let Some(quantity) = self.quantity {
            body.set_decimal(tags::ORDER_QTY, quantity);
        }
        body.set_char(tags::ORD_TYPE, self.ord_type.code());
        if self.ord_type == OrdType::Limit
            && let Some(price) = self.price
        {
            body.set_decimal(tags::PRICE, price);
        }
        body.set_char(tags::TIME_IN_FORCE, self.time_in_force.code());
        body.set_timestamp(tags::TRANSACT_TIME, Timestamp::now());
        if let Some(account) = &self.account {
            body.set(tags::ACCOUNT, account.as_str());
        }
        if let Some(destination) = &self.destination {
            body.set(tags::EXEC_BROKER, destination.as_str());
        }
        if let Some(exchange) = &self.exchange {
            body.set(tags::EX_DESTINATION, exchange.as_str());
        }

        for (tag, value) in &self.extra_fields {
            if is_header_tag(*tag) {
                message.header_mut().set(*tag, value.as_str());
            } else {
                message.set(*tag, value.as_str());
            }
        }
        Ok(message)
    }
}

impl Default for OrderRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders an optional value, or `None` when absent.
pub(crate) struct Shown<'a, T>(pub(crate) &'a Option<T>);

impl<T: fmt::Display> fmt::Display for Shown<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str("None"),
        }
    }
}

impl fmt::Display for OrderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OrderRequest: ID={}, OrderType={}, Symbol={}, Side={}, Quantity={}, Price={}, \
             Account={}, Destination={}, Exchange={}",
            Shown(&self.cl_ord_id),
            self.ord_type,
            Shown(&self.symbol),
            Shown(&self.side),
            Shown(&self.quantity),
            Shown(&self.price),
            Shown(&self.account),
            Shown(&self.destination),
            Shown(&self.exchange),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_limit_order_fields() {
        let message = OrderRequest::buy("BTCUSD", dec("1.0"), Some(dec("40000.0")))
            .with_cl_ord_id("42")
            .with_destination("BROKER1")
            .build()
            .unwrap();

        assert_eq!(message.msg_type(), Some(MsgType::NewOrderSingle));
        assert_eq!(message.begin_string(), Some("FIX.4.4"));
        assert_eq!(message.get(tags::CL_ORD_ID), Some("42"));
        assert_eq!(message.get(tags::SYMBOL), Some("BTCUSD"));
        assert_eq!(message.get(tags::SIDE), Some("1"));
        assert_eq!(message.get(tags::ORD_TYPE), Some("2"));
        assert_eq!(message.get(tags::ORDER_QTY), Some("1.0"));
        assert_eq!(message.get(tags::PRICE), Some("40000.0"));
        assert_eq!(message.get(tags::TIME_IN_FORCE), Some("0"));
        assert_eq!(message.get(tags::EXEC_BROKER), Some("BROKER1"));
        assert!(message.has(tags::TRANSACT_TIME));
        assert!(!message.has(tags::ACCOUNT));
    }

    #[test]
    fn test_market_order_has_no_price() {
        let message = OrderRequest::sell("ETHUSD", dec("2"), None)
            .with_cl_ord_id("7")
            .build()
            .unwrap();
        assert_eq!(message.get(tags::SIDE), Some("2"));
        assert_eq!(message.get(tags::ORD_TYPE), Some("1"));
        assert!(!message.has(tags::PRICE));
    }

    #[test]
    fn test_price_decides_type() {
        for price in [None, Some(dec("1.5"))] {
            for side in [Side::Buy, Side::Sell] {
                let order = OrderRequest::priced(side, "X", dec("1"), price);
                let expected = if price.is_some() {
                    OrdType::Limit
                } else {
                    OrdType::Market
                };
                assert_eq!(order.ord_type(), expected);
                assert_eq!(order.price(), price);

                let message = order.with_cl_ord_id("1").build().unwrap();
                assert_eq!(message.has(tags::PRICE), price.is_some());
            }
        }
    }

    #[test]
    fn test_missing_fields() {
        let order = OrderRequest::market(Side::Buy, "BTCUSD", dec("1"));
        assert_eq!(
            order.build(),
            Err(ValidationError::MissingField { field: "client order id" })
        );

        let order = OrderRequest::new().with_cl_ord_id("1");
        assert_eq!(
            order.build(),
            Err(ValidationError::MissingField { field: "symbol" })
        );

        let order = OrderRequest::new().with_cl_ord_id("1").with_symbol("");
        assert_eq!(
            order.build(),
            Err(ValidationError::MissingField { field: "symbol" })
        );

        let order = OrderRequest::new().with_cl_ord_id("1").with_symbol("X");
        assert_eq!(
            order.build(),
            Err(ValidationError::MissingField { field: "side" })
        );

        let order = order.with_side(Side::Sell);
        assert_eq!(
            order.build(),
            Err(ValidationError::MissingField { field: "quantity" })
        );
    }

    #[test]
    fn test_non_positive_quantity() {
        for quantity in ["0", "-1", "0.000"] {
            let err = OrderRequest::market(Side::Buy, "X", dec(quantity))
                .with_cl_ord_id("1")
                .build()
                .unwrap_err();
            assert!(matches!(err, ValidationError::NonPositiveQuantity { .. }));
        }
    }

    #[test]
    fn test_price_rules() {
        let err = OrderRequest::market(Side::Buy, "X", dec("1"))
            .with_ord_type(OrdType::Limit)
            .with_cl_ord_id("1")
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::LimitPriceRequired);

        let err = OrderRequest::market(Side::Buy, "X", dec("1"))
            .with_price(dec("10"))
            .with_cl_ord_id("1")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MarketPriceNotAllowed {
                price: "10".to_string()
            }
        );
    }

    #[test]
    fn test_extra_fields_last_writer_wins() {
        let message = OrderRequest::market(Side::Buy, "X", dec("1"))
            .with_cl_ord_id("1")
            .with_account("ACC1")
            .with_extra_field(tags::ACCOUNT, "ACC2")
            .with_extra_field(9000, "a")
            .with_extra_field(9000, "b")
            .with_extra_field(tags::TARGET_COMP_ID, "ROUTED")
            .build()
            .unwrap();

        assert_eq!(message.get(tags::ACCOUNT), Some("ACC2"));
        assert_eq!(message.get(9000), Some("b"));
        assert_eq!(message.body().fields().filter(|(t, _)| *t == 9000).count(), 1);
        assert_eq!(message.header().get(tags::TARGET_COMP_ID), Some("ROUTED"));
    }

    #[test]
    fn test_instances_do_not_share_state() {
        let first = OrderRequest::new().with_extra_field(1, "a");
        let second = OrderRequest::new();
        assert_ne!(first, second);
        assert_eq!(second, OrderRequest::default());
    }

    #[test]
    fn test_display() {
        let order = OrderRequest::buy("BTCUSD", dec("1.0"), Some(dec("40000.0")))
            .with_cl_ord_id("42")
            .with_exchange("XCME");
        assert_eq!(
            order.to_string(),
            "OrderRequest: ID=42, OrderType=LIMIT, Symbol=BTCUSD, Side=BUY, Quantity=1.0, \
             Price=40000.0, Account=None, Destination=None, Exchange=XCME"
        );
    }
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Requests accepted by [`SessionController::submit`](crate::SessionController::submit).

use crate::market_data::MarketDataRequest;
use crate::order::OrderRequest;
use gatefix_core::error::ValidationError;
use gatefix_core::message::Message;
use std::fmt;

/// An outbound business request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// A new order single.
    Order(OrderRequest),
    /// A market data subscription.
    MarketData(MarketDataRequest),
}

impl Request {
    /// Assigns the request's identifier (ClOrdID or MDReqID).
    pub fn set_id(&mut self, id: impl Into<String>) {
        match self {
            Self::Order(order) => order.set_cl_ord_id(id),
            Self::MarketData(request) => request.set_md_req_id(id),
        }
    }

    /// Returns the request's identifier, if assigned.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Order(order) => order.cl_ord_id(),
            Self::MarketData(request) => request.md_req_id(),
        }
    }

    /// Builds the wire message.
    ///
    /// # Errors
    /// Returns the builder's `ValidationError`.
    pub fn build(&self) -> Result<Message, ValidationError> {
        match self {
            Self::Order(order) => order.build(),
            Self::MarketData(request) => request.build(),
        }
    }
}

impl From<OrderRequest> for Request {
    fn from(order: OrderRequest) -> Self {
        Self::Order(order)
    }
}

impl From<MarketDataRequest> for Request {
    fn from(request: MarketDataRequest) -> Self {
        Self::MarketData(request)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order(order) => order.fmt(f),
            Self::MarketData(request) => request.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatefix_core::message::MsgType;
    use gatefix_core::tags;
    use gatefix_core::types::Side;
    use rust_decimal::Decimal;

    #[test]
    fn test_set_id_routes_to_request_kind() {
        let mut order: Request = OrderRequest::market(Side::Buy, "X", Decimal::ONE).into();
        order.set_id("11");
        assert_eq!(order.id(), Some("11"));
        let message = order.build().unwrap();
        assert_eq!(message.msg_type(), Some(MsgType::NewOrderSingle));
        assert_eq!(message.get(tags::CL_ORD_ID), Some("11"));

        let mut md: Request = MarketDataRequest::for_symbols(["X"]).into();
        assert_eq!(md.id(), None);
        md.set_id("12");
        let message = md.build().unwrap();
        assert_eq!(message.msg_type(), Some(MsgType::MarketDataRequest));
        assert_eq!(message.get(tags::MD_REQ_ID), Some("12"));
    }

    #[test]
    fn test_display_delegates() {
        let request: Request = MarketDataRequest::for_symbols(["X"]).into();
        assert_eq!(request.to_string(), "MarketDataRequest: ID=None, Symbols=[X]");
    }
}

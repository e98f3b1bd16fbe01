/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Session-level (admin) message builders.
//!
//! Builders produce only the body; [`stamp_header`] adds the routing and
//! sequencing header right before a message goes on the wire.

use crate::application::SessionId;
use crate::config::SessionConfig;
use gatefix_core::field::tags;
use gatefix_core::message::{Message, MsgType};
use gatefix_core::types::{SeqNum, Timestamp};

/// Builds a Logon: EncryptMethod=0, HeartBtInt and, when configured,
/// ResetSeqNumFlag=Y.
///
/// The password is not added here; it is injected by
/// [`Application::to_admin`](crate::Application::to_admin).
#[must_use]
pub fn logon(config: &SessionConfig) -> Message {
    let mut msg = Message::new(&config.begin_string, &MsgType::Logon);
    msg.set(tags::ENCRYPT_METHOD, "0");
    msg.body_mut()
        .set_int(tags::HEART_BT_INT, config.heartbeat_interval_secs() as i64);
    if config.reset_on_logon {
        msg.body_mut().set_bool(tags::RESET_SEQ_NUM_FLAG, true);
    }
    msg
}

/// Builds a Heartbeat, echoing a TestReqID when answering a TestRequest.
#[must_use]
pub fn heartbeat(begin_string: &str, test_req_id: Option<&str>) -> Message {
    let mut msg = Message::new(begin_string, &MsgType::Heartbeat);
    if let Some(id) = test_req_id {
        msg.set(tags::TEST_REQ_ID, id);
    }
    msg
}

/// Builds a TestRequest.
#[must_use]
pub fn test_request(begin_string: &str, test_req_id: &str) -> Message {
    let mut msg = Message::new(begin_string, &MsgType::TestRequest);
    msg.set(tags::TEST_REQ_ID, test_req_id);
    msg
}

/// Builds a Logout with optional text.
#[must_use]
pub fn logout(begin_string: &str, text: Option<&str>) -> Message {
    let mut msg = Message::new(begin_string, &MsgType::Logout);
    if let Some(text) = text {
        msg.set(tags::TEXT, text);
    }
    msg
}

/// Writes BeginString, SenderCompID, TargetCompID, MsgSeqNum and SendingTime.
pub fn stamp_header(message: &mut Message, session_id: &SessionId, seq_num: SeqNum) {
    let header = message.header_mut();
    header.set(tags::BEGIN_STRING, session_id.begin_string.as_str());
    header.set(tags::SENDER_COMP_ID, session_id.sender_comp_id.as_str());
    header.set(tags::TARGET_COMP_ID, session_id.target_comp_id.as_str());
    header.set(tags::MSG_SEQ_NUM, seq_num.to_string());
    header.set_timestamp(tags::SENDING_TIME, Timestamp::now());
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatefix_core::types::CompId;

    fn config() -> SessionConfig {
        SessionConfig::new(
            "localhost",
            9878,
            CompId::new("CLIENT").unwrap(),
            CompId::new("GATEWAY").unwrap(),
        )
    }

    #[test]
    fn test_logon_fields() {
        let msg = logon(&config());
        assert_eq!(msg.msg_type(), Some(MsgType::Logon));
        assert_eq!(msg.get(tags::ENCRYPT_METHOD), Some("0"));
        assert_eq!(msg.get(tags::HEART_BT_INT), Some("30"));
        assert_eq!(msg.get(tags::RESET_SEQ_NUM_FLAG), Some("Y"));
        assert!(!msg.has(tags::PASSWORD));
    }

    #[test]
    fn test_logon_without_reset() {
        let mut config = config();
        config.reset_on_logon = false;
        assert!(!logon(&config).has(tags::RESET_SEQ_NUM_FLAG));
    }

    #[test]
    fn test_heartbeat_and_test_request() {
        assert!(!heartbeat("FIX.4.4", None).has(tags::TEST_REQ_ID));
        assert_eq!(
            heartbeat("FIX.4.4", Some("T1")).get(tags::TEST_REQ_ID),
            Some("T1")
        );
        let probe = test_request("FIX.4.4", "T2");
        assert_eq!(probe.msg_type(), Some(MsgType::TestRequest));
        assert_eq!(probe.get(tags::TEST_REQ_ID), Some("T2"));
    }

    #[test]
    fn test_logout_text() {
        assert_eq!(
            logout("FIX.4.4", Some("bye")).get(tags::TEXT),
            Some("bye")
        );
        assert!(!logout("FIX.4.4", None).has(tags::TEXT));
    }

    #[test]
    fn test_stamp_header() {
        let session = SessionId::new("FIX.4.4", "CLIENT", "GATEWAY").with_connection(1);
        let mut msg = heartbeat("FIX.4.4", None);
        stamp_header(&mut msg, &session, SeqNum::new(7));

        let header = msg.header();
        assert_eq!(header.get(tags::SENDER_COMP_ID), Some("CLIENT"));
        assert_eq!(header.get(tags::TARGET_COMP_ID), Some("GATEWAY"));
        assert_eq!(header.get(tags::MSG_SEQ_NUM), Some("7"));
        assert_eq!(header.get(tags::SENDING_TIME).map(str::len), Some(21));
    }
}

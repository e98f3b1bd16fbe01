/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Session lifecycle states.
//!
//! ```text
//! Disconnected -> Connecting -> LoggedIn -> LoggingOut -> Disconnected
//!                     |             |
//!                     v             v
//!               Disconnected    Connecting (forced logout, awaiting re-logon)
//! ```

use std::fmt;

/// Lifecycle state of the client session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No session and no attempt in progress.
    #[default]
    Disconnected,
    /// Connecting or waiting for the Logon acknowledgement.
    Connecting,
    /// Logon acknowledged; application messages may be sent.
    LoggedIn,
    /// Logout requested, waiting for the transport to finish.
    LoggingOut,
}

impl SessionState {
    /// Returns the state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::LoggedIn => "LoggedIn",
            Self::LoggingOut => "LoggingOut",
        }
    }

    /// Returns true if application messages may be sent.
    #[inline]
    #[must_use]
    pub const fn is_logged_in(self) -> bool {
        matches!(self, Self::LoggedIn)
    }

    /// Returns true if the session is fully stopped.
    #[inline]
    #[must_use]
    pub const fn is_disconnected(self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

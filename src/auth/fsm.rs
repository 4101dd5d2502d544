//! 会话状态机（rust-fsm）
//!
//! ```text
//!                 LoginSuccess / SessionDetected
//!  ┌───────────┐ ─────────────────────────────► ┌───────────────┐
//!  │ Anonymous │                                │ Authenticated │
//!  └───────────┘ ◄───────────────────────────── └───────┬───────┘
//!     ▲    │               Logout                       │ Unauthorized (401)
//!     │    │ Unauthorized (refresh cookie only)         ▼
//!     │    └──────────────────────────────────► ┌───────────────┐
//!     │                                         │  Refreshing   │
//!     └──────── RefreshFailed / Logout ──────── └───────┬───────┘
//!                                                       │ RefreshSuccess
//!                                                       ▼
//!                                                 Authenticated
//! ```

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(Anonymous)

    Anonymous => {
        SessionDetected => Authenticated,
        LoginSuccess => Authenticated,
        Unauthorized => Refreshing
    },
    Authenticated => {
        LoginSuccess => Authenticated,
        Unauthorized => Refreshing,
        Logout => Anonymous
    },
    Refreshing => {
        RefreshSuccess => Authenticated,
        RefreshFailed => Anonymous,
        Logout => Anonymous
    }
}

pub use session_machine::Input as SessionInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// 对外的会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Anonymous,
    Authenticated,
    Refreshing,
}

impl From<&SessionMachineState> for SessionState {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::Anonymous => SessionState::Anonymous,
            SessionMachineState::Authenticated => SessionState::Authenticated,
            SessionMachineState::Refreshing => SessionState::Refreshing,
        }
    }
}

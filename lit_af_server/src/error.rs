use lit_af_core::{EngineError, ParseError, Seat};
use thiserror::Error;

use crate::config::ConfigError;
use crate::registry::ConnId;

/// 违反会话规则的消息：不影响会话，只回复发送者
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("only player 0 can start the game")]
    NotHost,

    #[error("a game is already in progress")]
    AlreadyPlaying,

    #[error("no game is in progress")]
    NotPlaying,

    #[error("the game is over")]
    GameOver,

    #[error("you are not seated in the current game")]
    NotSeated,

    /// `turn` 是座位号，与 `Notice::Turn` 一致
    #[error("it is player {turn}'s turn")]
    NotYourTurn { turn: Seat },

    #[error("unknown connection")]
    UnknownConnection,
}

/// 路由一条消息失败的原因，Display 即回复给发送者的文本
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid message: {0}")]
    Protocol(#[from] ProtocolViolation),

    #[error("{0}")]
    Engine(#[from] EngineError),
}

impl From<ParseError> for SessionError {
    fn from(e: ParseError) -> Self {
        SessionError::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        SessionError::Parse(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("connection {0} is not registered")]
    NotFound(ConnId),
}

/// 向单个连接投递失败
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportFault {
    #[error("outbound queue is full")]
    Backpressure,

    #[error("connection is closed")]
    Closed,
}

/// 只有监听端的建立失败才是致命错误
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

use thiserror::Error;

/// 招法文本解析失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty move")]
    Empty,

    #[error("unknown move '{0}', expected 'ask' or 'claim'")]
    UnknownVerb(String),

    #[error("invalid card '{0}'")]
    InvalidCard(String),

    #[error("invalid player '{0}'")]
    InvalidPlayer(String),

    #[error("malformed move: {0}")]
    Malformed(String),
}

/// 规则引擎拒绝或出错
///
/// 引擎保证返回错误时自身状态没有任何改变。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("cannot start a game with {0} players (need 2 to 8)")]
    InvalidPlayerCount(usize),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("internal engine failure: {0}")]
    Internal(String),
}

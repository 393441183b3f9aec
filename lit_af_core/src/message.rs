use crate::state::{GameResult, Seat};
use serde::{Deserialize, Serialize};
use std::fmt;

// --- 客户端 -> 服务器 的消息 ---
// 线上格式: {"type":"control","action":"start"} 或 {"type":"game","action":<招法>}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "action", rename_all = "lowercase")]
pub enum ClientMessage {
    /// 房间控制指令
    Control(ControlAction),
    /// 游戏内动作，原样交给招法解析器
    Game(serde_json::Value),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    /// 开始游戏 (仅房主)
    Start,
}

impl ClientMessage {
    pub fn start() -> Self {
        ClientMessage::Control(ControlAction::Start)
    }

    pub fn game(mv: impl Into<String>) -> Self {
        ClientMessage::Game(serde_json::Value::String(mv.into()))
    }
}

/// 招法负载交给解析器的文本：JSON 字符串取其内容，其他 JSON 取其文本
pub fn move_payload_text(payload: &serde_json::Value) -> String {
    match payload {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// --- 服务器 -> 客户端 的消息 ---
// 全部是纯文本，由 Display 渲染。

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// 当前在线人数
    PlayersJoined(usize),
    GameStarted,
    /// 轮到某个座位行动
    ///
    /// 这里是开局时固定的座位号，不是连接表里的序号。开局后有人断开时，
    /// 加入、断开通知里的序号会前移，座位号不变，两者可能不同。
    Turn(Seat),
    /// 某个玩家自己的手牌，只发给他本人
    Hand(Vec<String>),
    /// 某个玩家断开，带断开前的序号
    Disconnected(usize),
    GameOver(GameResult),
    /// 只发给出错的发送者
    Error(String),
}

impl Notice {
    pub fn hand<C: fmt::Display>(cards: &[C]) -> Self {
        Notice::Hand(cards.iter().map(|c| c.to_string()).collect())
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Notice::PlayersJoined(n) => write!(f, "{} players joined", n),
            Notice::GameStarted => write!(f, "Game started"),
            Notice::Turn(seat) => write!(f, "Player {}'s turn", seat),
            Notice::Hand(cards) if cards.is_empty() => write!(f, "(no cards)"),
            Notice::Hand(cards) => write!(f, "{}", cards.join(", ")),
            Notice::Disconnected(idx) => write!(f, "Player {} disconnected", idx),
            Notice::GameOver(result) => write!(f, "Game over: {}", result),
            Notice::Error(reason) => write!(f, "Error: {}", reason),
        }
    }
}

//! # Literature 核心逻辑库
//!
//! 这个 `core` crate 包含了 Literature 纸牌游戏的规则引擎、招法解析器、
//! 以及客户端-服务器之间的消息定义。
//! 它不涉及任何网络和异步，服务器通过 `GameEngine` trait 使用它，
//! 也可以被任何上层应用（如终端客户端）复用。

mod card;
mod engine;
mod error;
mod logic;
mod message;
mod parser;
mod state;

pub use card::*;

pub use engine::GameEngine;

pub use error::*;

pub use message::*;

pub use parser::parse_move;

pub use state::*;

use std::fmt;

use crate::card::Card;
use crate::error::{EngineError, ParseError};
use crate::parser;
use crate::state::{Action, Game, Move, Seat, TurnState};

/// 协调器与规则引擎之间的接口
///
/// 协调器只依赖这个 trait：开局、查询行动者和手牌、执行动作、解析招法。
/// `action` 返回 Err 时，引擎必须保持原状。
pub trait GameEngine: Clone + Send + 'static {
    type Move: Send;
    type Card: fmt::Display;

    fn new(players: usize) -> Result<Self, EngineError>;

    /// 当前行动的座位
    fn turn(&self) -> Seat;

    fn player_hand(&self, seat: Seat) -> Vec<Self::Card>;

    fn action(&mut self, action: Action<Self::Move>) -> Result<TurnState, EngineError>;

    fn parse_move(raw: &str) -> Result<Self::Move, ParseError>;
}

impl GameEngine for Game {
    type Move = Move;
    type Card = Card;

    fn new(players: usize) -> Result<Self, EngineError> {
        Game::new(players)
    }

    fn turn(&self) -> Seat {
        Game::turn(self)
    }

    fn player_hand(&self, seat: Seat) -> Vec<Card> {
        Game::player_hand(self, seat).to_vec()
    }

    fn action(&mut self, action: Action) -> Result<TurnState, EngineError> {
        Game::action(self, action)
    }

    fn parse_move(raw: &str) -> Result<Move, ParseError> {
        parser::parse_move(raw)
    }
}

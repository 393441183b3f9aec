use crate::card::{Card, HalfSuit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 玩家在牌局中的座位号，同时也是引擎要求的稠密索引 0..N-1
pub type Seat = usize;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    // 每个座位的手牌，索引即座位号
    pub(crate) hands: Vec<Vec<Card>>,
    // 当前应该行动的座位
    pub(crate) turn: Seat,
    // 已经宣告完成的半花色，以及拿到这一分的队伍
    pub(crate) claimed: BTreeMap<HalfSuit, Team>,
}

/// 队伍：偶数座位为 A 队，奇数座位为 B 队
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    /// 向对手要一张牌
    Ask { target: Seat, card: Card },
    /// 宣告一个半花色：列出 6 张牌分别在哪位队友手里
    Claim { assignments: Vec<(Seat, Card)> },
}

/// 一次玩家动作：谁 + 做了什么
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action<M = Move> {
    pub player: Seat,
    pub mv: M,
}

/// 动作执行后的局面：轮到下一位，或者整局结束
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnState {
    Next(Seat),
    Finished(GameResult),
}

/// 整局结果，scores[0] 为 A 队得分，scores[1] 为 B 队得分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub scores: [u8; 2],
}

// --- 实现方法 ---

impl Team {
    pub fn of(seat: Seat) -> Team {
        if seat % 2 == 0 { Team::A } else { Team::B }
    }

    pub fn index(self) -> usize {
        match self {
            Team::A => 0,
            Team::B => 1,
        }
    }

    pub fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }
}

impl GameResult {
    /// 得分高的队伍获胜，平分时返回 None
    pub fn winner(&self) -> Option<Team> {
        match self.scores[0].cmp(&self.scores[1]) {
            std::cmp::Ordering::Greater => Some(Team::A),
            std::cmp::Ordering::Less => Some(Team::B),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl<M> Action<M> {
    pub fn new(player: Seat, mv: M) -> Self {
        Action { player, mv }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Team::A => write!(f, "Team A"),
            Team::B => write!(f, "Team B"),
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b] = self.scores;
        match self.winner() {
            Some(team) => write!(f, "{} wins {}-{}", team, a.max(b), a.min(b)),
            None => write!(f, "draw {}-{}", a, b),
        }
    }
}

impl Game {
    /// 当前行动的座位
    pub fn turn(&self) -> Seat {
        self.turn
    }

    pub fn player_count(&self) -> usize {
        self.hands.len()
    }

    /// 某个座位的手牌；越界座位视为空手
    pub fn player_hand(&self, seat: Seat) -> &[Card] {
        self.hands.get(seat).map_or(&[], |h| h.as_slice())
    }

    pub fn claimed(&self) -> &BTreeMap<HalfSuit, Team> {
        &self.claimed
    }

    pub fn scores(&self) -> [u8; 2] {
        let mut scores = [0u8; 2];
        for team in self.claimed.values() {
            scores[team.index()] += 1;
        }
        scores
    }
}

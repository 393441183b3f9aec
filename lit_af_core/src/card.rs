use rand::prelude::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

// --- 核心数据结构定义 ---

/// 花色 (Suit)
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Suit {
    Spade,   // 黑桃 S
    Heart,   // 红心 H
    Club,    // 梅花 C
    Diamond, // 方块 D
}

/// 点数 (Rank)
/// Literature 用 48 张牌，8 全部拿掉，所以这里没有 Eight。
/// 2-7 为小半花色，9-A 为大半花色。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

/// 半花色的高低 (Low: 2-7, High: 9-A)
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Half {
    Low,
    High,
}

/// 半花色 (HalfSuit)，每个半花色正好 6 张牌，是宣告 (claim) 的单位
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct HalfSuit {
    pub suit: Suit,
    pub half: Half,
}

/// 单张牌 (Card)
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

pub const SUITS: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Club, Suit::Diamond];

pub const RANKS: [Rank; 12] = [
    Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven,
    Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
];

/// 整副牌的半花色数量
pub const HALF_SUIT_COUNT: usize = 8;

impl Rank {
    pub fn half(self) -> Half {
        if self <= Rank::Seven { Half::Low } else { Half::High }
    }
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    pub fn half_suit(&self) -> HalfSuit {
        HalfSuit { suit: self.suit, half: self.rank.half() }
    }
}

impl HalfSuit {
    /// 该半花色包含的 6 张牌，按点数从小到大
    pub fn cards(&self) -> Vec<Card> {
        RANKS
            .iter()
            .filter(|r| r.half() == self.half)
            .map(|&rank| Card { rank, suit: self.suit })
            .collect()
    }
}

// --- 实现辅助功能 ---

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Suit::Spade => "S",
            Suit::Heart => "H",
            Suit::Club => "C",
            Suit::Diamond => "D",
        })
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Nine => "9",
            Rank::Ten => "T",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        })
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl fmt::Display for HalfSuit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let half = match self.half {
            Half::Low => "low",
            Half::High => "high",
        };
        write!(f, "{} {}", half, self.suit)
    }
}

/// 解析形如 `QH`、`10s`、`2D` 的牌面，大小写不敏感
impl FromStr for Card {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        // 按字符而不是字节切分，玩家可能输入 ♥ 之类的多字节字符
        let mut chars = upper.chars();
        let suit_char = chars.next_back().ok_or_else(|| ParseError::InvalidCard(s.to_string()))?;
        let rank_str = chars.as_str();

        let suit = match suit_char {
            'S' => Suit::Spade,
            'H' => Suit::Heart,
            'C' => Suit::Club,
            'D' => Suit::Diamond,
            _ => return Err(ParseError::InvalidCard(s.to_string())),
        };
        let rank = match rank_str {
            "2" => Rank::Two,
            "3" => Rank::Three,
            "4" => Rank::Four,
            "5" => Rank::Five,
            "6" => Rank::Six,
            "7" => Rank::Seven,
            "9" => Rank::Nine,
            "T" | "10" => Rank::Ten,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            "A" => Rank::Ace,
            _ => return Err(ParseError::InvalidCard(s.to_string())),
        };

        Ok(Card { rank, suit })
    }
}

// --- 随机牌组生成 ---

/// 创建一副完整的 48 张牌 (不含 8)
pub fn create_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(SUITS.len() * RANKS.len());
    for &suit in &SUITS {
        for &rank in &RANKS {
            deck.push(Card { rank, suit });
        }
    }
    deck
}

/// 洗牌后轮流发给 k 个玩家，每手牌按 (花色, 点数) 排序
pub fn deal<R: Rng + ?Sized>(k_players: usize, rng: &mut R) -> Vec<Vec<Card>> {
    let mut deck = create_deck();
    deck.shuffle(rng);

    let mut hands = vec![Vec::new(); k_players];
    for (i, card) in deck.into_iter().enumerate() {
        hands[i % k_players].push(card);
    }
    for hand in &mut hands {
        hand.sort_by_key(|c| (c.suit, c.rank));
    }
    hands
}

// --- 单元测试 ---

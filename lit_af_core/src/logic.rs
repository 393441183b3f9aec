use crate::card::*;
use crate::error::EngineError;
use crate::state::*;
use rand::Rng;
use std::collections::{BTreeMap, HashSet};

// --- 核心游戏流程函数 ---

impl Game {
    /// 开始新的一局，使用线程本地随机数
    pub fn new(players: usize) -> Result<Game, EngineError> {
        Game::with_rng(players, &mut rand::rng())
    }

    /// 开始新的一局
    ///
    /// - 校验人数 (2 到 8 人)。
    /// - 洗牌并轮流发完 48 张牌。
    /// - 随机选出第一个行动的玩家。
    pub fn with_rng<R: Rng>(players: usize, rng: &mut R) -> Result<Game, EngineError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
            return Err(EngineError::InvalidPlayerCount(players));
        }

        let hands = deal(players, rng);
        let turn = rng.random_range(0..players);

        Ok(Game {
            hands,
            turn,
            claimed: BTreeMap::new(),
        })
    }

    /// 全部半花色都已宣告，整局结束
    pub fn is_over(&self) -> bool {
        self.claimed.len() == HALF_SUIT_COUNT
    }

    pub fn result(&self) -> GameResult {
        GameResult { scores: self.scores() }
    }

    /// 处理单个玩家的动作
    ///
    /// 先完整校验，再修改状态：返回 Err 时牌局保持原样。
    pub fn action(&mut self, action: Action) -> Result<TurnState, EngineError> {
        if self.is_over() {
            return Err(EngineError::IllegalMove("the game is already over".to_string()));
        }
        if action.player != self.turn {
            return Err(EngineError::IllegalMove(format!(
                "it is player {}'s turn, not player {}'s",
                self.turn, action.player
            )));
        }

        match action.mv {
            Move::Ask { target, card } => self.ask(action.player, target, card),
            Move::Claim { assignments } => self.claim(action.player, &assignments),
        }
    }

    /// 向对手要牌：要到了继续行动，没要到轮到被问的人
    fn ask(&mut self, asker: Seat, target: Seat, card: Card) -> Result<TurnState, EngineError> {
        self.check_seat(target)?;
        if target == asker {
            return Err(illegal("you cannot ask yourself"));
        }
        if Team::of(target) == Team::of(asker) {
            return Err(illegal(format!("player {} is your teammate", target)));
        }
        if self.hands[target].is_empty() {
            return Err(illegal(format!("player {} has no cards", target)));
        }

        let hand = &self.hands[asker];
        if hand.contains(&card) {
            return Err(illegal(format!("you already hold {}", card)));
        }
        let half_suit = card.half_suit();
        if !hand.iter().any(|c| c.half_suit() == half_suit) {
            return Err(illegal(format!("you must hold a card of {} to ask for {}", half_suit, card)));
        }

        match self.hands[target].iter().position(|c| *c == card) {
            Some(pos) => {
                let taken = self.hands[target].remove(pos);
                insert_sorted(&mut self.hands[asker], taken);
            }
            None => self.turn = target,
        }

        Ok(TurnState::Next(self.turn))
    }

    /// 宣告半花色
    ///
    /// 6 张牌必须正好组成一个未宣告的半花色，且全部分配给宣告者所在队伍。
    /// 全部猜对则本队得分，否则对方得分；这 6 张牌无论如何都离场。
    fn claim(&mut self, claimant: Seat, assignments: &[(Seat, Card)]) -> Result<TurnState, EngineError> {
        let team = Team::of(claimant);

        let half_suit = match assignments.first() {
            Some((_, card)) => card.half_suit(),
            None => return Err(illegal("a claim must name all six cards of a half-suit")),
        };
        if self.claimed.contains_key(&half_suit) {
            return Err(illegal(format!("{} has already been claimed", half_suit)));
        }

        let named: HashSet<Card> = assignments.iter().map(|(_, c)| *c).collect();
        let expected: HashSet<Card> = half_suit.cards().into_iter().collect();
        if assignments.len() != expected.len() || named != expected {
            return Err(illegal(format!("a claim must name each card of {} exactly once", half_suit)));
        }

        for &(seat, _) in assignments {
            self.check_seat(seat)?;
            if Team::of(seat) != team {
                return Err(illegal(format!("player {} is not on your team", seat)));
            }
        }

        // 校验结束，开始修改状态
        let correct = assignments
            .iter()
            .all(|(seat, card)| self.hands[*seat].contains(card));
        for hand in &mut self.hands {
            hand.retain(|c| c.half_suit() != half_suit);
        }
        let scorer = if correct { team } else { team.opponent() };
        self.claimed.insert(half_suit, scorer);

        if self.is_over() {
            return Ok(TurnState::Finished(self.result()));
        }

        self.turn = self.next_turn_after_claim(claimant);
        Ok(TurnState::Next(self.turn))
    }

    // --- 辅助逻辑函数 ---

    fn check_seat(&self, seat: Seat) -> Result<(), EngineError> {
        if seat >= self.hands.len() {
            return Err(illegal(format!("there is no player {}", seat)));
        }
        Ok(())
    }

    /// 宣告后的行动权：自己还有牌就继续；否则交给下一位有牌的队友；
    /// 队友也都没牌了就交给下一位有牌的玩家。
    fn next_turn_after_claim(&self, claimant: Seat) -> Seat {
        if !self.hands[claimant].is_empty() {
            return claimant;
        }

        let n = self.hands.len();
        let order: Vec<Seat> = (1..n).map(|offset| (claimant + offset) % n).collect();
        let team = Team::of(claimant);

        order
            .iter()
            .copied()
            .find(|&s| Team::of(s) == team && !self.hands[s].is_empty())
            .or_else(|| order.iter().copied().find(|&s| !self.hands[s].is_empty()))
            .unwrap_or(claimant)
    }
}

fn illegal(reason: impl Into<String>) -> EngineError {
    EngineError::IllegalMove(reason.into())
}

fn insert_sorted(hand: &mut Vec<Card>, card: Card) {
    let key = (card.suit, card.rank);
    let pos = hand.partition_point(|c| (c.suit, c.rank) < key);
    hand.insert(pos, card);
}

// --- 单元测试 ---

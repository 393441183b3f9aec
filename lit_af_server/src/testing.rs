//! 测试用的假引擎：行为完全可控，并记录被调用的次数

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lit_af_core::{Action, EngineError, GameEngine, GameResult, ParseError, Seat, TurnState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeMove {
    /// 轮到下一位
    Pass,
    /// 直接结束整局
    Win,
    /// 先改状态再报错，用来检验会话不会提交半成品
    Refuse,
    /// 先改状态再 panic
    Panic,
}

#[derive(Debug, Clone)]
pub struct FakeEngine {
    players: usize,
    turn: Seat,
    calls: Arc<AtomicUsize>,
}

impl FakeEngine {
    pub const INITIAL_TURN: Seat = 1;
    pub const RESULT: GameResult = GameResult { scores: [5, 3] };
    /// 解析这段文本时假引擎的解析器会 panic
    pub const PANIC_ON_PARSE: &'static str = "explode-while-parsing";

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GameEngine for FakeEngine {
    type Move = FakeMove;
    type Card = String;

    fn new(players: usize) -> Result<Self, EngineError> {
        if players < 2 {
            return Err(EngineError::InvalidPlayerCount(players));
        }
        Ok(FakeEngine {
            players,
            turn: Self::INITIAL_TURN,
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn turn(&self) -> Seat {
        self.turn
    }

    fn player_hand(&self, seat: Seat) -> Vec<String> {
        vec![format!("card-{}", seat)]
    }

    fn action(&mut self, action: Action<FakeMove>) -> Result<TurnState, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match action.mv {
            FakeMove::Pass => {
                self.turn = (self.turn + 1) % self.players;
                Ok(TurnState::Next(self.turn))
            }
            FakeMove::Win => Ok(TurnState::Finished(Self::RESULT)),
            FakeMove::Refuse => {
                self.turn = 0;
                Err(EngineError::IllegalMove("refused".to_string()))
            }
            FakeMove::Panic => {
                self.turn = 0;
                panic!("fake engine exploded");
            }
        }
    }

    fn parse_move(raw: &str) -> Result<FakeMove, ParseError> {
        match raw.trim() {
            "pass" => Ok(FakeMove::Pass),
            "win" => Ok(FakeMove::Win),
            "refuse" => Ok(FakeMove::Refuse),
            "panic" => Ok(FakeMove::Panic),
            Self::PANIC_ON_PARSE => panic!("fake parser exploded"),
            "" => Err(ParseError::Empty),
            other => Err(ParseError::UnknownVerb(other.to_string())),
        }
    }
}

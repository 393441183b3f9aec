use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use lit_af_core::{Action, EngineError, GameEngine, GameResult, Seat, TurnState};
use tracing::error;

use crate::error::{ProtocolViolation, SessionError};
use crate::registry::ConnId;

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing,
    Ended,
}

// 引擎和行动者只在 Playing 阶段存在，用枚举在结构上保证
enum State<E> {
    Idle,
    Playing(Table<E>),
    Ended(GameResult),
}

struct Table<E> {
    engine: E,
    // 开局时固定的座位表：座位号 -> 连接
    // 有人中途断开时座位保留，其他人的座位号不变
    seats: Vec<ConnId>,
}

/// 唯一的共享牌局
///
/// 由协调器独占，所有修改都在处理单个事件的同步代码里完成。
pub struct Session<E> {
    state: State<E>,
}

impl<E: GameEngine> Default for Session<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: GameEngine> Session<E> {
    pub fn new() -> Self {
        Session { state: State::Idle }
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Playing(_) => Phase::Playing,
            State::Ended(_) => Phase::Ended,
        }
    }

    pub fn engine(&self) -> Option<&E> {
        match &self.state {
            State::Playing(table) => Some(&table.engine),
            _ => None,
        }
    }

    /// 当前行动的座位，仅在 Playing 阶段存在
    pub fn turn(&self) -> Option<Seat> {
        self.engine().map(|e| e.turn())
    }

    pub fn seats(&self) -> &[ConnId] {
        match &self.state {
            State::Playing(table) => &table.seats,
            _ => &[],
        }
    }

    pub fn seat_of(&self, id: ConnId) -> Option<Seat> {
        self.seats().iter().position(|s| *s == id)
    }

    pub fn result(&self) -> Option<&GameResult> {
        match &self.state {
            State::Ended(result) => Some(result),
            _ => None,
        }
    }

    /// 每个座位的 (连接, 手牌)
    pub fn hands(&self) -> Vec<(ConnId, Vec<E::Card>)> {
        match &self.state {
            State::Playing(table) => table
                .seats
                .iter()
                .enumerate()
                .map(|(seat, id)| (*id, table.engine.player_hand(seat)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Idle -> Playing
    ///
    /// 按给定的连接顺序入座，创建引擎，返回第一个行动的座位。
    /// 失败时会话保持 Idle。
    pub fn start(&mut self, seats: Vec<ConnId>) -> Result<Seat, SessionError> {
        match self.state {
            State::Idle => {}
            State::Playing(_) => return Err(ProtocolViolation::AlreadyPlaying.into()),
            State::Ended(_) => return Err(ProtocolViolation::GameOver.into()),
        }

        let players = seats.len();
        let engine = guard_engine(|| E::new(players))?;
        let turn = engine.turn();
        self.state = State::Playing(Table { engine, seats });
        Ok(turn)
    }

    /// 执行一个座位的动作
    ///
    /// 只有 Playing 阶段、且轮到该座位时才会调用引擎。引擎在副本上执行，
    /// 成功才替换，失败或 panic 时会话不变。引擎报告终局时进入 Ended。
    pub fn apply_action(&mut self, seat: Seat, mv: E::Move) -> Result<TurnState, SessionError> {
        let table = match &mut self.state {
            State::Playing(table) => table,
            State::Idle => return Err(ProtocolViolation::NotPlaying.into()),
            State::Ended(_) => return Err(ProtocolViolation::GameOver.into()),
        };

        let turn = table.engine.turn();
        if seat != turn {
            return Err(ProtocolViolation::NotYourTurn { turn }.into());
        }

        let mut candidate = table.engine.clone();
        let next = guard_engine(|| candidate.action(Action::new(seat, mv)))?;
        table.engine = candidate;

        if let TurnState::Finished(result) = &next {
            self.state = State::Ended(*result);
        }
        Ok(next)
    }

    /// Ended -> Idle，准备下一局。其他阶段不做任何事，返回 false
    pub fn rearm(&mut self) -> bool {
        if let State::Ended(_) = self.state {
            self.state = State::Idle;
            true
        } else {
            false
        }
    }
}

/// 调用引擎（包括它的招法解析器），把 panic 也转换成 EngineError
pub(crate) fn guard_engine<T, Err>(f: impl FnOnce() -> Result<T, Err>) -> Result<T, SessionError>
where
    Err: Into<SessionError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result.map_err(Into::into),
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            error!(panic = %msg, "引擎在处理动作时 panic");
            Err(EngineError::Internal("the game engine crashed".to_string()).into())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

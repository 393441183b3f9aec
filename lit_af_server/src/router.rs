use lit_af_core::{ClientMessage, ControlAction, GameEngine, Seat, TurnState, move_payload_text};
use tracing::{info, warn};

use crate::error::{ProtocolViolation, SessionError};
use crate::registry::{ConnId, ConnectionRegistry};
use crate::session::{Phase, Session, guard_engine};

/// 一条入站消息的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    StartAccepted { turn: Seat },
    ActionAccepted(TurnState),
    /// 会话没有任何改变，原因只回复给发送者
    Rejected(SessionError),
}

/// 解析并分发一条入站消息
///
/// 任何失败（格式错误、越权、不是你的回合、引擎拒绝）都变成 `Rejected`，
/// 不会向上传播。
pub fn route<E: GameEngine>(
    session: &mut Session<E>,
    registry: &ConnectionRegistry,
    sender: ConnId,
    raw: &str,
) -> RouteOutcome {
    match try_route(session, registry, sender, raw) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(%sender, error = %e, "拒绝消息");
            RouteOutcome::Rejected(e)
        }
    }
}

fn try_route<E: GameEngine>(
    session: &mut Session<E>,
    registry: &ConnectionRegistry,
    sender: ConnId,
    raw: &str,
) -> Result<RouteOutcome, SessionError> {
    let msg: ClientMessage = serde_json::from_str(raw)?;
    let index = registry
        .index_of(sender)
        .map_err(|_| ProtocolViolation::UnknownConnection)?;

    match msg {
        ClientMessage::Control(ControlAction::Start) => {
            // 只有序号 0 的玩家是房主
            if index != 0 {
                return Err(ProtocolViolation::NotHost.into());
            }
            let turn = session.start(registry.ids())?;
            info!(players = registry.len(), turn, "游戏开始");
            Ok(RouteOutcome::StartAccepted { turn })
        }
        ClientMessage::Game(payload) => {
            match session.phase() {
                Phase::Playing => {}
                Phase::Idle => return Err(ProtocolViolation::NotPlaying.into()),
                Phase::Ended => return Err(ProtocolViolation::GameOver.into()),
            }
            let seat = session.seat_of(sender).ok_or(ProtocolViolation::NotSeated)?;
            // 先检查回合再解析，不是你的回合时引擎和解析器都不会被调用
            if let Some(turn) = session.turn().filter(|&t| t != seat) {
                return Err(ProtocolViolation::NotYourTurn { turn }.into());
            }

            let text = move_payload_text(&payload);
            let mv = guard_engine(|| E::parse_move(&text))?;
            let next = session.apply_action(seat, mv)?;
            info!(seat, ?next, "动作已执行");
            Ok(RouteOutcome::ActionAccepted(next))
        }
    }
}

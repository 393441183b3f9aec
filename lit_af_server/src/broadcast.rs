use lit_af_core::{GameEngine, Notice};
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

use crate::error::TransportFault;
use crate::registry::{ConnId, ConnectionRegistry, Outbound};
use crate::session::Session;

// 所有发送都是非阻塞的 try_send：协调器不能因为某个慢连接而停下来。
// 单个连接失败只记日志，不影响其他连接，也不影响发起方。

pub(crate) fn deliver(sender: &Outbound, text: String) -> Result<(), TransportFault> {
    sender.try_send(text).map_err(|e| match e {
        TrySendError::Full(_) => TransportFault::Backpressure,
        TrySendError::Closed(_) => TransportFault::Closed,
    })
}

/// 只发给一个连接
pub fn send_to(registry: &ConnectionRegistry, id: ConnId, notice: &Notice) -> Result<(), TransportFault> {
    let sender = registry.sender(id).ok_or(TransportFault::Closed)?;
    deliver(sender, notice.to_string()).inspect_err(|fault| {
        warn!(conn = %id, %fault, "向玩家发送消息失败");
    })
}

/// 向调用时在线的所有连接广播，返回成功投递的数量
pub fn broadcast_all(registry: &ConnectionRegistry, notice: &Notice) -> usize {
    let text = notice.to_string();
    let mut delivered = 0;
    for conn in registry.snapshot() {
        match deliver(&conn.sender, text.clone()) {
            Ok(()) => delivered += 1,
            Err(fault) => warn!(conn = %conn.id, %fault, "广播失败（可能已断开）"),
        }
    }
    delivered
}

/// 把每个座位自己的手牌只发给他本人
///
/// 已经断开的座位跳过，开局后才加入、没有座位的连接收不到任何手牌。
pub fn send_hands_to_all<E: GameEngine>(session: &Session<E>, registry: &ConnectionRegistry) -> usize {
    let mut delivered = 0;
    for (id, hand) in session.hands() {
        if send_to(registry, id, &Notice::hand(&hand)).is_ok() {
            delivered += 1;
        }
    }
    delivered
}

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use futures_util::{SinkExt, stream::StreamExt};
use lit_af_core::Notice;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::broadcast::deliver;
use crate::coordinator::{Event, EventTx};
use crate::error::TransportFault;
use crate::registry::{ConnId, Outbound};

/// 所有连接任务共享的状态：通往协调器的事件通道
#[derive(Clone)]
pub struct AppState {
    events: EventTx,
    outbound_buffer: usize,
}

impl AppState {
    pub fn new(events: EventTx, outbound_buffer: usize) -> Self {
        AppState { events, outbound_buffer }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(websocket_handler))
        .route("/ws", get(websocket_handler))
        .with_state(state)
}

/// 处理 WebSocket 连接请求
async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// 处理单个 WebSocket 连接的生命周期: Connecting -> Active -> Closed
async fn handle_socket(socket: WebSocket, state: AppState) {
    let id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();

    // 协调器和本任务通过这个通道把文本交给写任务
    let (tx, mut rx) = mpsc::channel::<String>(state.outbound_buffer);

    // 启动一个新任务，专门负责将通道中的消息发送到 WebSocket
    tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sender.send(Message::Text(text.into())).await.is_err() {
                // 发送失败，说明客户端已断开，退出任务
                break;
            }
        }
    });

    if state.events.send(Event::Connected { id, sender: tx.clone() }).is_err() {
        warn!(conn = %id, "协调器已退出，拒绝连接");
        return;
    }

    // 主循环，把客户端的文本消息交给协调器
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let event = Event::Inbound { id, text: text.as_str().to_owned() };
                if state.events.send(event).is_err() {
                    break;
                }
            }
            Ok(Message::Binary(_)) => {
                let _ = reject_binary(id, &tx);
            }
            Ok(Message::Close(_)) => break,
            // Ping/Pong 由 axum 自动处理
            Ok(_) => {}
            Err(e) => {
                warn!(conn = %id, error = %e, "读取消息失败");
                break;
            }
        }
    }

    // 客户端断开连接，交给协调器注销并广播
    let _ = state.events.send(Event::Disconnected { id });
    info!(conn = %id, "客户端连接关闭");
}

/// 不支持二进制帧，直接回复发送者，不经过协调器
fn reject_binary(id: ConnId, tx: &Outbound) -> Result<(), TransportFault> {
    let notice = Notice::Error("binary frames are not supported".to_string());
    deliver(tx, notice.to_string()).inspect_err(|fault| {
        warn!(conn = %id, %fault, "回复二进制消息错误失败");
    })
}

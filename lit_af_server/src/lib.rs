//! # Literature 多人会话服务器
//!
//! 通过 WebSocket 接受玩家连接，维护唯一的一局共享牌局，
//! 校验并分发玩家动作，把结果广播给所有人。
//!
//! 结构：每个连接一个任务（`handler`），全部事件汇入一个协调器任务
//! （`coordinator`），协调器独占连接表（`registry`）和会话（`session`），
//! 用 `router` 处理入站消息、用 `broadcast` 投递出站消息。

pub mod broadcast;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod handler;
pub mod registry;
pub mod router;
pub mod session;

#[cfg(test)]
mod testing;

use std::path::Path;

use axum::Router;
use lit_af_core::{Game, GameEngine};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::{Endpoint, ServerConfig};
use crate::coordinator::{Coordinator, EventTx};
use crate::error::ServerError;
use crate::handler::AppState;

/// 启动协调器任务，返回连接任务用的事件发送端
pub fn spawn_coordinator<E: GameEngine>() -> EventTx {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(Coordinator::<E>::new().run(rx));
    tx
}

/// 组装好 Literature 服务器的路由
pub fn app(outbound_buffer: usize) -> Router {
    handler::router(AppState::new(spawn_coordinator::<Game>(), outbound_buffer))
}

/// 按配置监听并一直运行；只有监听建立失败才会返回错误
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let app = app(config.outbound_buffer);

    match &config.endpoint {
        Endpoint::Tcp { host, port } => {
            let listener = TcpListener::bind((host.as_str(), *port)).await?;
            info!("服务器正在监听 {}", listener.local_addr()?);
            axum::serve(listener, app).await?;
        }
        Endpoint::Unix(path) => serve_unix(path, app).await?,
    }
    Ok(())
}

#[cfg(unix)]
async fn serve_unix(path: &Path, app: Router) -> Result<(), ServerError> {
    use std::os::unix::fs::{FileTypeExt, PermissionsExt};

    // 清理上次残留的 socket 文件，其他类型的文件不动
    if let Ok(meta) = std::fs::symlink_metadata(path) {
        if meta.file_type().is_socket() {
            std::fs::remove_file(path)?;
        }
    }

    let listener = tokio::net::UnixListener::bind(path)?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o660))?;
    info!("服务器正在监听 {}", path.display());
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn serve_unix(path: &Path, _app: Router) -> Result<(), ServerError> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        format!("unix sockets are not supported on this platform: {}", path.display()),
    )
    .into())
}

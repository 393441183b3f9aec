use futures_util::{SinkExt, StreamExt};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use url::Url;

use lit_af_core::{ClientMessage, parse_move};

const DEFAULT_URL: &str = "ws://127.0.0.1:8088/ws";

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// 把一行用户输入转换成要发送的消息；`Ok(None)` 表示退出
fn command_to_message(line: &str) -> Result<Option<ClientMessage>, String> {
    let line = line.trim();
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    match command {
        "start" => Ok(Some(ClientMessage::start())),
        "ask" | "claim" => {
            // 先在本地检查一遍格式，服务器仍会重新校验
            parse_move(line).map_err(|e| e.to_string())?;
            Ok(Some(ClientMessage::game(line)))
        }
        "raw" => {
            let value: serde_json::Value = serde_json::from_str(rest.trim()).map_err(|e| format!("无效的 JSON: {}", e))?;
            serde_json::from_value(value).map(Some).map_err(|e| format!("无效的消息: {}", e))
        }
        "exit" => Ok(None),
        "" => Err("请输入命令".to_string()),
        other => Err(format!("未知命令: {}", other)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = Url::parse(&std::env::args().nth(1).unwrap_or_else(|| DEFAULT_URL.to_string()))?;

    println!("正在连接到: {}", url);
    let (ws_stream, _) = connect_async(url.as_str()).await?;
    println!("连接成功!");

    let (mut write, mut read) = ws_stream.split();

    // 启动一个任务来处理从服务器接收的消息
    tokio::spawn(async move {
        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    println!("\n<-- {}", text.as_str());
                    prompt();
                }
                Ok(Message::Close(_)) => {
                    println!("\n服务器关闭了连接");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("接收消息时出错: {}", e);
                    break;
                }
            }
        }
    });

    // 主任务处理用户输入
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    println!("--- Literature 客户端 ---");
    println!("可用命令:");
    println!("  start                        - 开始游戏 (仅房主)");
    println!("  ask <座位> <牌>              - 向某位玩家要一张牌, 例如 ask 2 QH");
    println!("  claim <座位>:<牌>,<牌> ...   - 宣告一个半花色, 例如 claim 0:2S,3S 2:4S,5S,6S,7S");
    println!("  raw <json>                   - 原样发送一条 JSON 消息");
    println!("  exit                         - 退出");

    loop {
        prompt();

        let Some(line) = stdin.next_line().await? else {
            break;
        };

        match command_to_message(&line) {
            Ok(Some(msg)) => {
                let payload = serde_json::to_string(&msg)?;
                write.send(Message::Text(payload.into())).await?;
            }
            Ok(None) => {
                println!("正在断开连接...");
                break;
            }
            Err(e) => println!("{}", e),
        }
    }

    let _ = write.send(Message::Close(None)).await;
    Ok(())
}

//! 协调器：独占连接表和会话的单一任务
//!
//! 各连接任务只负责收发，把事件送进同一个通道；协调器逐个处理事件，
//! 每个事件从查序号到修改会话再到投递消息都在一段同步代码里完成，
//! 中间没有 await，所以不需要锁，也不会读到被并发断线改动过的序号。

use lit_af_core::{GameEngine, Notice, TurnState};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::broadcast::{broadcast_all, send_hands_to_all, send_to};
use crate::registry::{ConnId, ConnectionRegistry, Outbound};
use crate::router::{RouteOutcome, route};
use crate::session::Session;

/// 连接任务发给协调器的事件
#[derive(Debug)]
pub enum Event {
    Connected { id: ConnId, sender: Outbound },
    Inbound { id: ConnId, text: String },
    Disconnected { id: ConnId },
}

pub type EventTx = mpsc::UnboundedSender<Event>;
pub type EventRx = mpsc::UnboundedReceiver<Event>;

pub struct Coordinator<E> {
    registry: ConnectionRegistry,
    session: Session<E>,
}

impl<E: GameEngine> Default for Coordinator<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: GameEngine> Coordinator<E> {
    pub fn new() -> Self {
        Coordinator {
            registry: ConnectionRegistry::new(),
            session: Session::new(),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn session(&self) -> &Session<E> {
        &self.session
    }

    /// 事件循环，所有连接任务都退出、通道关闭后结束
    pub async fn run(mut self, mut events: EventRx) {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        info!("事件通道已关闭，协调器退出");
    }

    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Connected { id, sender } => self.on_connected(id, sender),
            Event::Inbound { id, text } => self.on_inbound(id, &text),
            Event::Disconnected { id } => self.on_disconnected(id),
        }
    }

    fn on_connected(&mut self, id: ConnId, sender: Outbound) {
        let index = self.registry.register(id, sender);
        info!(conn = %id, index, "新连接");
        broadcast_all(&self.registry, &Notice::PlayersJoined(self.registry.len()));
    }

    fn on_inbound(&mut self, id: ConnId, text: &str) {
        debug!(conn = %id, message = text, "收到消息");

        match route(&mut self.session, &self.registry, id, text) {
            RouteOutcome::StartAccepted { turn } => {
                broadcast_all(&self.registry, &Notice::GameStarted);
                send_hands_to_all(&self.session, &self.registry);
                broadcast_all(&self.registry, &Notice::Turn(turn));
            }
            RouteOutcome::ActionAccepted(TurnState::Next(turn)) => {
                send_hands_to_all(&self.session, &self.registry);
                broadcast_all(&self.registry, &Notice::Turn(turn));
            }
            RouteOutcome::ActionAccepted(TurnState::Finished(result)) => {
                info!(%result, "游戏结束");
                broadcast_all(&self.registry, &Notice::GameOver(result));
                // Playing -> Ended -> Idle，房主可以重新开局
                self.session.rearm();
            }
            RouteOutcome::Rejected(e) => {
                let _ = send_to(&self.registry, id, &Notice::Error(e.to_string()));
            }
        }
    }

    fn on_disconnected(&mut self, id: ConnId) {
        match self.registry.remove(id) {
            Ok(index) => {
                info!(conn = %id, index, "玩家断开连接");
                // 断线玩家的座位保留；如果正轮到他，牌局会一直等待
                if let Some(seat) = self.session.seat_of(id) {
                    if self.session.turn() == Some(seat) {
                        warn!(seat, "当前行动的玩家已断开，牌局暂停");
                    }
                }
                broadcast_all(&self.registry, &Notice::Disconnected(index));
            }
            Err(e) => warn!(error = %e, "断开了一个未注册的连接"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Phase;
    use crate::testing::FakeEngine;
    use lit_af_core::{ClientMessage, Game, GameResult};
    use uuid::Uuid;

    const START: &str = r#"{"type":"control","action":"start"}"#;

    struct Player {
        id: ConnId,
        rx: mpsc::Receiver<String>,
    }

    impl Player {
        fn drain(&mut self) -> Vec<String> {
            let mut out = Vec::new();
            while let Ok(msg) = self.rx.try_recv() {
                out.push(msg);
            }
            out
        }
    }

    fn connect<E: GameEngine>(coordinator: &mut Coordinator<E>) -> Player {
        let (sender, rx) = mpsc::channel(32);
        let id = Uuid::new_v4();
        coordinator.handle(Event::Connected { id, sender });
        Player { id, rx }
    }

    fn send<E: GameEngine>(coordinator: &mut Coordinator<E>, player: &Player, text: &str) {
        coordinator.handle(Event::Inbound { id: player.id, text: text.to_string() });
    }

    fn game_msg(mv: &str) -> String {
        serde_json::to_string(&ClientMessage::game(mv)).unwrap()
    }

    #[test]
    fn test_join_order_assigns_indices_and_announces_count() {
        let mut coordinator: Coordinator<FakeEngine> = Coordinator::new();
        let mut players: Vec<Player> = (0..3).map(|_| connect(&mut coordinator)).collect();

        for (idx, p) in players.iter().enumerate() {
            assert_eq!(coordinator.registry().index_of(p.id), Ok(idx));
        }
        assert_eq!(players[0].drain(), vec!["1 players joined", "2 players joined", "3 players joined"]);
        assert_eq!(players[2].drain(), vec!["3 players joined"]);
    }

    #[test]
    fn test_scenario_start_wrong_turn_and_valid_action() {
        let mut coordinator: Coordinator<FakeEngine> = Coordinator::new();
        let mut players: Vec<Player> = (0..3).map(|_| connect(&mut coordinator)).collect();
        players.iter_mut().for_each(|p| {
            p.drain();
        });

        // A 开局：每个人收到开局通知、自己的手牌、行动者
        send(&mut coordinator, &players[0], START);
        for (seat, p) in players.iter_mut().enumerate() {
            assert_eq!(
                p.drain(),
                vec!["Game started".to_string(), format!("card-{}", seat), "Player 1's turn".to_string()]
            );
        }

        // 轮到 1 号，0 号出手被拒绝，只有他自己收到错误，没有手牌重发
        send(&mut coordinator, &players[0], &game_msg("pass"));
        assert_eq!(players[0].drain(), vec!["Error: invalid message: it is player 1's turn"]);
        assert!(players[1].drain().is_empty());
        assert!(players[2].drain().is_empty());

        // 1 号合法出手：所有人收到新手牌和新行动者
        send(&mut coordinator, &players[1], &game_msg("pass"));
        for (seat, p) in players.iter_mut().enumerate() {
            assert_eq!(p.drain(), vec![format!("card-{}", seat), "Player 2's turn".to_string()]);
        }
    }

    #[test]
    fn test_rejections_go_only_to_sender() {
        let mut coordinator: Coordinator<FakeEngine> = Coordinator::new();
        let mut host = connect(&mut coordinator);
        let mut guest = connect(&mut coordinator);
        host.drain();
        guest.drain();

        send(&mut coordinator, &guest, START);
        assert_eq!(guest.drain(), vec!["Error: invalid message: only player 0 can start the game"]);
        assert!(host.drain().is_empty());
        assert_eq!(coordinator.session().phase(), Phase::Idle);

        send(&mut coordinator, &guest, "{oops");
        let replies = guest.drain();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("Error: parse error: "));
        assert!(host.drain().is_empty());
    }

    #[test]
    fn test_disconnect_names_pre_removal_index_and_keeps_others() {
        let mut coordinator: Coordinator<FakeEngine> = Coordinator::new();
        let mut players: Vec<Player> = (0..3).map(|_| connect(&mut coordinator)).collect();
        send(&mut coordinator, &players[0], START);
        players.iter_mut().for_each(|p| {
            p.drain();
        });

        let leaving = players.remove(1);
        coordinator.handle(Event::Disconnected { id: leaving.id });

        for p in &mut players {
            assert_eq!(p.drain(), vec!["Player 1 disconnected"]);
        }
        assert_eq!(coordinator.registry().len(), 2);
        assert_eq!(coordinator.registry().index_of(players[1].id), Ok(1));

        // 座位不随断线移动，牌局仍在进行
        assert_eq!(coordinator.session().phase(), Phase::Playing);
        assert_eq!(coordinator.session().seat_of(players[1].id), Some(2));
    }

    #[test]
    fn test_disconnected_turn_holder_stalls_the_game() {
        let mut coordinator: Coordinator<FakeEngine> = Coordinator::new();
        let mut players: Vec<Player> = (0..3).map(|_| connect(&mut coordinator)).collect();
        send(&mut coordinator, &players[0], START);

        // 1 号正在行动时断开，没有自动跳过
        let leaving = players.remove(1);
        coordinator.handle(Event::Disconnected { id: leaving.id });
        players.iter_mut().for_each(|p| {
            p.drain();
        });

        assert_eq!(coordinator.session().turn(), Some(1));
        send(&mut coordinator, &players[1], &game_msg("pass"));
        assert_eq!(players[1].drain(), vec!["Error: invalid message: it is player 1's turn"]);
    }

    #[test]
    fn test_game_over_announces_and_rearms() {
        let mut coordinator: Coordinator<FakeEngine> = Coordinator::new();
        let mut players: Vec<Player> = (0..2).map(|_| connect(&mut coordinator)).collect();
        send(&mut coordinator, &players[0], START);
        players.iter_mut().for_each(|p| {
            p.drain();
        });

        send(&mut coordinator, &players[1], &game_msg("win"));
        let result = GameResult { scores: [5, 3] };
        for p in &mut players {
            assert_eq!(p.drain(), vec![format!("Game over: {}", result)]);
        }
        assert_eq!(coordinator.session().phase(), Phase::Idle);

        // 不再接受游戏动作
        send(&mut coordinator, &players[1], &game_msg("pass"));
        assert_eq!(players[1].drain(), vec!["Error: invalid message: no game is in progress"]);

        // 房主可以开新的一局
        send(&mut coordinator, &players[0], START);
        assert_eq!(coordinator.session().phase(), Phase::Playing);
        assert_eq!(players[0].drain()[0], "Game started");
    }

    #[test]
    fn test_parser_panic_keeps_coordinator_serving() {
        let mut coordinator: Coordinator<FakeEngine> = Coordinator::new();
        let mut players: Vec<Player> = (0..2).map(|_| connect(&mut coordinator)).collect();
        send(&mut coordinator, &players[0], START);
        players.iter_mut().for_each(|p| {
            p.drain();
        });

        send(&mut coordinator, &players[1], &game_msg(FakeEngine::PANIC_ON_PARSE));
        assert_eq!(players[1].drain(), vec!["Error: internal engine failure: the game engine crashed"]);
        assert!(players[0].drain().is_empty());

        // 之后的连接和动作都照常处理
        let mut late = connect(&mut coordinator);
        assert_eq!(late.drain(), vec!["3 players joined"]);
        send(&mut coordinator, &players[1], &game_msg("pass"));
        assert_eq!(players[0].drain(), vec!["3 players joined", "card-0", "Player 0's turn"]);
    }

    #[test]
    fn test_turn_notices_use_seats_after_a_departure() {
        let mut coordinator: Coordinator<FakeEngine> = Coordinator::new();
        let mut players: Vec<Player> = (0..3).map(|_| connect(&mut coordinator)).collect();
        send(&mut coordinator, &players[0], START);

        // 0 号离开后，座位 1、2 的连接在连接表里变成 0、1 号
        let leaving = players.remove(0);
        coordinator.handle(Event::Disconnected { id: leaving.id });
        players.iter_mut().for_each(|p| {
            p.drain();
        });
        assert_eq!(coordinator.registry().index_of(players[1].id), Ok(1));

        send(&mut coordinator, &players[0], &game_msg("pass"));
        assert_eq!(players[1].drain(), vec!["card-2", "Player 2's turn"]);
        assert_eq!(players[0].drain(), vec!["card-1", "Player 2's turn"]);

        // 连接表里的 0 号是新房主，但行动仍按座位号
        send(&mut coordinator, &players[0], &game_msg("pass"));
        assert_eq!(players[0].drain(), vec!["Error: invalid message: it is player 2's turn"]);
        send(&mut coordinator, &players[1], &game_msg("pass"));
        assert_eq!(players[1].drain(), vec!["card-2", "Player 0's turn"]);
    }

    #[test]
    fn test_unknown_disconnect_is_ignored() {
        let mut coordinator: Coordinator<FakeEngine> = Coordinator::new();
        let mut p = connect(&mut coordinator);
        p.drain();

        coordinator.handle(Event::Disconnected { id: Uuid::new_v4() });
        assert!(p.drain().is_empty());
        assert_eq!(coordinator.registry().len(), 1);
    }

    #[test]
    fn test_real_game_sends_each_player_their_own_hand() {
        let mut coordinator: Coordinator<Game> = Coordinator::new();
        let mut players: Vec<Player> = (0..4).map(|_| connect(&mut coordinator)).collect();
        send(&mut coordinator, &players[0], START);

        let turn = coordinator.session().turn().unwrap();
        let engine = coordinator.session().engine().unwrap();
        let expected_hands: Vec<String> = (0..4)
            .map(|seat| Notice::hand(engine.player_hand(seat)).to_string())
            .collect();

        for (seat, p) in players.iter_mut().enumerate() {
            let msgs = p.drain();
            let hands: Vec<_> = msgs.iter().filter(|m| m.contains(", ")).collect();
            assert_eq!(hands, vec![&expected_hands[seat]]);
            assert_eq!(msgs.last().unwrap(), &format!("Player {}'s turn", turn));
        }
    }
}

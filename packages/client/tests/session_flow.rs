//! End-to-end move exchange against an in-process game server.

use std::{sync::Arc, time::Duration};

use gambit_client::{
    channel::{ChannelEvent, ChannelPublisher, WebSocketPublisher, connect_channel},
    error::ChannelError,
    session::{FreezeReason, GameSession, Phase, SessionEvent},
    transport::HttpMoveTransport,
};
use gambit_server::ui::Server;
use gambit_shared::{
    protocol::{
        ChannelMessage, Colour, GameMode, GameStatus, MessageType, MoveNotation, MoveResponse,
        ResponseType,
    },
    time::SystemClock,
};
use tokio::{net::TcpListener, sync::mpsc};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Start a server on an ephemeral port and return its base URL
async fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(Server::with_in_memory_storage().serve(listener));
    format!("http://{}", addr)
}

async fn next_message(rx: &mut mpsc::UnboundedReceiver<ChannelEvent>) -> ChannelMessage {
    match tokio::time::timeout(TIMEOUT, rx.recv()).await {
        Ok(Some(ChannelEvent::Message(message))) => message,
        other => panic!("expected a channel message, got {:?}", other),
    }
}

struct Player {
    session: GameSession,
    publisher: Arc<WebSocketPublisher>,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl Player {
    /// Connect, take the SEAT, publish JOIN and consume the relayed JOIN
    async fn join(base: &str, id: &str) -> Self {
        let (publisher, events) = connect_channel(base, id).await.unwrap();
        let publisher = Arc::new(publisher);
        let session = GameSession::multiplayer(
            id.to_string(),
            Arc::new(HttpMoveTransport::new(base, GameMode::Multi)),
            publisher.clone(),
            Arc::new(SystemClock),
        );
        let mut player = Self {
            session,
            publisher,
            events,
        };
        let seated = player.receive().await;
        assert!(matches!(
            seated[..],
            [SessionEvent::OrientationAssigned(_)]
        ));
        player.session.join().await.unwrap();
        player.receive().await;
        player
    }

    async fn receive(&mut self) -> Vec<SessionEvent> {
        let message = next_message(&mut self.events).await;
        self.session.handle_message(message)
    }
}

/// Two seated players with the game started
async fn seated_pair(base: &str) -> (Player, Player) {
    let id = HttpMoveTransport::new(base, GameMode::Multi)
        .create_game(None)
        .await
        .unwrap()
        .id;
    let mut white = Player::join(base, &id).await;
    let black = Player::join(base, &id).await;
    // white sees black's JOIN
    white.receive().await;
    (white, black)
}

#[tokio::test]
async fn test_two_players_exchange_moves() {
    // テスト項目: 二人のクライアントが向きを割り当てられ、着手が相手の盤面に反映される
    // given (前提条件):
    let base = start_server().await;
    let (mut white, mut black) = seated_pair(&base).await;
    assert_eq!(white.session.orientation(), Some(Colour::White));
    assert_eq!(black.session.orientation(), Some(Colour::Black));
    assert_eq!(white.session.phase(), Phase::Active);
    assert_eq!(black.session.phase(), Phase::Active);

    // when (操作):
    let committed = white.session.submit_move("e2", "e4").await;
    let received = black.receive().await;
    let echo = white.receive().await;

    // then (期待する結果):
    assert_eq!(
        committed[0],
        SessionEvent::Committed(MoveNotation::new("e2", "e4"))
    );
    assert_eq!(
        received[0],
        SessionEvent::OpponentMoved(MoveNotation::new("e2", "e4"))
    );
    assert!(echo.is_empty());
    assert_eq!(
        black.session.board().layout(),
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR"
    );
    assert_eq!(white.session.board(), black.session.board());
}

#[tokio::test]
async fn test_illegal_and_out_of_turn_moves_snap_back() {
    // テスト項目: 非合法手と手番外の手は snap-back になり、盤面は変わらない
    // given (前提条件):
    let base = start_server().await;
    let (mut white, mut black) = seated_pair(&base).await;
    let start = white.session.board().clone();

    // when (操作):
    let illegal = white.session.submit_move("e2", "e5").await;
    let out_of_turn = black.session.submit_move("e7", "e5").await;

    // then (期待する結果):
    assert_eq!(
        illegal,
        vec![SessionEvent::SnapBack(MoveNotation::new("e2", "e5"))]
    );
    assert_eq!(
        out_of_turn,
        vec![SessionEvent::SnapBack(MoveNotation::new("e7", "e5"))]
    );
    assert_eq!(white.session.board(), &start);
    assert_eq!(black.session.board(), &start);
}

#[tokio::test]
async fn test_third_seat_and_unknown_session_are_refused() {
    // テスト項目: 三人目の参加と存在しないセッションへの接続は拒否される
    // given (前提条件):
    let base = start_server().await;
    let (white, _black) = seated_pair(&base).await;

    // when (操作):
    let third = connect_channel(&base, white.session.session_id()).await;
    let unknown = connect_channel(&base, "no-such-game").await;

    // then (期待する結果):
    assert!(matches!(third, Err(ChannelError::SessionFull(_))));
    assert!(matches!(unknown, Err(ChannelError::SessionNotFound(_))));
}

#[tokio::test]
async fn test_leave_freezes_remaining_player() {
    // テスト項目: 相手が切断すると LEAVE が届き、盤面が凍結される
    // given (前提条件):
    let base = start_server().await;
    let (mut white, black) = seated_pair(&base).await;

    // when (操作):
    black.publisher.close();
    let message = next_message(&mut white.events).await;
    let events = white.session.handle_message(message.clone());

    // then (期待する結果):
    assert_eq!(message.r#type, MessageType::Leave);
    assert_eq!(message.colour, Some(Colour::Black));
    assert!(matches!(events[..], [SessionEvent::OpponentLeft { .. }]));
    assert_eq!(
        white.session.phase(),
        Phase::Frozen(FreezeReason::OpponentLeft)
    );
    let after = white.session.submit_move("e2", "e4").await;
    assert_eq!(
        after,
        vec![SessionEvent::SnapBack(MoveNotation::new("e2", "e4"))]
    );
}

#[tokio::test]
async fn test_single_player_engine_replies() {
    // テスト項目: シングルプレイでは着手の後にエンジンが黒で応答する
    // given (前提条件):
    let base = start_server().await;
    let transport = Arc::new(HttpMoveTransport::new(&base, GameMode::Single));
    let created = transport.create_game(None).await.unwrap();
    let mut session = GameSession::single_player(created.id, transport, Arc::new(SystemClock));

    // when (操作):
    let events = session.submit_move("e2", "e4").await;

    // then (期待する結果):
    assert_eq!(
        events[0],
        SessionEvent::Committed(MoveNotation::new("e2", "e4"))
    );
    let engine_move = events.iter().find_map(|event| match event {
        SessionEvent::OpponentMoved(notation) => Some(notation.clone()),
        _ => None,
    });
    let engine_move = engine_move.expect("the engine should reply");
    let landed: shakmaty::Square = engine_move.target.parse().unwrap();
    assert_eq!(
        session.board().piece_colour_at(landed),
        Some(Colour::Black)
    );
}

#[tokio::test]
async fn test_http_errors() {
    // テスト項目: 存在しないゲームは 404、モード違いは 400、ヘルスチェックは ok を返す
    // given (前提条件):
    let base = start_server().await;
    let client = reqwest::Client::new();
    let id = HttpMoveTransport::new(&base, GameMode::Single)
        .create_game(None)
        .await
        .unwrap()
        .id;

    // when (操作):
    let unknown = client
        .post(format!("{}/sp/automove", base))
        .form(&[("id", "missing")])
        .send()
        .await
        .unwrap();
    let wrong_mode = client
        .post(format!("{}/mp/move", base))
        .form(&[("id", id.as_str()), ("source", "e2"), ("target", "e4"), ("colour", "WHITE")])
        .send()
        .await
        .unwrap();
    let bad_position = client
        .post(format!("{}/api/games", base))
        .form(&[("mode", "single"), ("fen", "not a position")])
        .send()
        .await
        .unwrap();
    let health: serde_json::Value = client
        .get(format!("{}/api/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(unknown.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(wrong_mode.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(bad_position.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(health["status"], "ok");
}

#[tokio::test]
async fn test_forged_move_never_reaches_opponent() {
    // テスト項目: サーバーで指していない MOVE（偽の勝利判定付き）は相手に届かない
    // given (前提条件):
    let base = start_server().await;
    let (mut white, black) = seated_pair(&base).await;
    let forged = ChannelMessage::movement(
        MoveNotation::new("e7", "e5"),
        MoveResponse {
            response_type: ResponseType::Ok,
            end_of_game: true,
            game_status: Some(GameStatus::BlackWin),
            ..MoveResponse::snapback()
        },
        0,
    );

    // when (操作):
    black.publisher.publish(&forged).await.unwrap();
    white.session.submit_move("e2", "e4").await;
    let message = next_message(&mut white.events).await;

    // then (期待する結果):
    assert_eq!(message.r#type, MessageType::Move);
    assert_eq!(message.colour, Some(Colour::White));
    assert_eq!(message.content.as_deref(), Some("e2-e4"));
    assert_eq!(white.session.phase(), Phase::Active);
}

#[tokio::test]
async fn test_single_player_from_position_and_restart() {
    // テスト項目: FEN で指定した局面から始め、やり直しでその局面に戻る
    // given (前提条件):
    let base = start_server().await;
    let transport = Arc::new(HttpMoveTransport::new(&base, GameMode::Single));
    let created = transport
        .create_game(Some("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"))
        .await
        .unwrap();
    assert_eq!(created.game_fen, "4k3/8/8/8/8/8/4P3/4K3");
    let mut session = GameSession::single_player(created.id, transport, Arc::new(SystemClock))
        .with_starting_layout(&created.game_fen);
    session.submit_move("e2", "e4").await;
    assert_ne!(session.board().layout(), created.game_fen);

    // when (操作):
    let events = session.restart().await;

    // then (期待する結果):
    assert_eq!(events, vec![SessionEvent::Restarted]);
    assert_eq!(session.board().layout(), created.game_fen);
    let again = session.submit_move("e2", "e4").await;
    assert_eq!(
        again[0],
        SessionEvent::Committed(MoveNotation::new("e2", "e4"))
    );
}

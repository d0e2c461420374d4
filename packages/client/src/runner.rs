//! Client execution logic.
//!
//! One task owns the [`GameSession`] and handles input lines, channel events
//! and deferred board refreshes in arrival order.

use std::sync::Arc;

use gambit_shared::{protocol::GameMode, time::SystemClock};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{
    channel::{ChannelEvent, connect_channel},
    command::{Command, parse_command},
    error::ClientError,
    formatter::MessageFormatter,
    session::{BoardRefresh, GameSession, SessionEvent},
    transport::HttpMoveTransport,
    ui::{PROMPT, redisplay_prompt},
};

/// Options of a client run
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL, e.g. `http://127.0.0.1:8080`
    pub server: String,
    /// Existing multiplayer session to join; a new game is created when `None`
    pub session: Option<String>,
    pub single: bool,
    /// Starting position of a single-player game in FEN
    pub fen: Option<String>,
    /// Print rank and file coordinates around the board
    pub notation: bool,
}

/// Run the client until the user quits or the channel closes
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let mode = if config.single {
        GameMode::Single
    } else {
        GameMode::Multi
    };
    let transport = Arc::new(HttpMoveTransport::new(&config.server, mode));
    let clock = Arc::new(SystemClock);

    let (session_id, layout) = match (&config.session, mode) {
        (Some(id), GameMode::Multi) => (id.clone(), None),
        _ => {
            let created = transport
                .create_game(config.fen.as_deref())
                .await
                .map_err(ClientError::CreateFailed)?;
            print!(
                "{}",
                MessageFormatter::format_session_created(&created.id, mode)
            );
            (created.id, Some(created.game_fen))
        }
    };

    let (mut session, publisher, mut channel_rx) = match mode {
        GameMode::Single => {
            let mut session = GameSession::single_player(session_id, transport, clock);
            if let Some(layout) = layout.filter(|layout| !layout.is_empty()) {
                session = session.with_starting_layout(&layout);
            }
            (session, None, None)
        }
        GameMode::Multi => {
            let (publisher, events) = connect_channel(&config.server, &session_id)
                .await
                .map_err(ClientError::ConnectFailed)?;
            let publisher = Arc::new(publisher);
            let session =
                GameSession::multiplayer(session_id, transport, publisher.clone(), clock);
            session.join().await.map_err(ClientError::ConnectFailed)?;
            (session, Some(publisher), Some(events))
        }
    };

    tracing::info!("Joined session '{}'", session.session_id());
    println!("\nType 'help' for commands. Press Ctrl+C to exit.");
    print!(
        "{}",
        MessageFormatter::format_board(session.board(), session.orientation(), config.notation)
    );

    let mut input_rx = spawn_input_reader();
    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel::<BoardRefresh>();

    loop {
        let events = tokio::select! {
            line = input_rx.recv() => {
                let Some(line) = line else { break };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Board) => {
                        print!(
                            "{}",
                            MessageFormatter::format_board(
                                session.board(),
                                session.orientation(),
                                config.notation,
                            )
                        );
                        Vec::new()
                    }
                    Ok(Command::Help) => vec![SessionEvent::Notice(MessageFormatter::format_help())],
                    Ok(command) => execute(&mut session, command).await,
                    Err(e) => vec![SessionEvent::Notice(e.to_string())],
                }
            }
            event = next_channel_event(&mut channel_rx) => match event {
                Some(ChannelEvent::Message(message)) => session.handle_message(message),
                Some(ChannelEvent::Closed) | None => {
                    println!("\nConnection to the game closed.");
                    break;
                }
            },
            Some(refresh) = refresh_rx.recv() => session.refresh_position(refresh),
        };

        present(&session, &events, &refresh_tx, config.notation);
    }

    if let Some(publisher) = publisher {
        publisher.close();
    }
    Ok(())
}

async fn execute(session: &mut GameSession, command: Command) -> Vec<SessionEvent> {
    let result = match command {
        Command::Move(notation) => {
            return session.submit_move(&notation.source, &notation.target).await;
        }
        Command::Promote(piece) => session.choose_promotion(piece).await,
        Command::Cancel => session.dismiss_promotion(),
        Command::Restart => return session.restart().await,
        Command::Board | Command::Help | Command::Quit => Ok(Vec::new()),
    };
    result.unwrap_or_else(|e| vec![SessionEvent::Notice(e.to_string())])
}

/// Print the events, schedule deferred refreshes and redraw the board when it changed
fn present(
    session: &GameSession,
    events: &[SessionEvent],
    refresh_tx: &mpsc::UnboundedSender<BoardRefresh>,
    notation: bool,
) {
    if events.is_empty() {
        return;
    }

    let mut redraw = false;
    println!();
    for event in events {
        if let SessionEvent::ScheduleRefresh { refresh, delay } = event {
            let refresh_tx = refresh_tx.clone();
            let refresh = refresh.clone();
            let delay = *delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                refresh_tx.send(refresh).ok();
            });
        }
        if let Some(text) = MessageFormatter::format_event(event) {
            println!("{}", text);
        }
        redraw |= MessageFormatter::redraws_board(event);
    }

    if redraw {
        print!(
            "{}",
            MessageFormatter::format_board(session.board(), session.orientation(), notation)
        );
    }
    redisplay_prompt();
}

async fn next_channel_event(
    channel_rx: &mut Option<mpsc::UnboundedReceiver<ChannelEvent>>,
) -> Option<ChannelEvent> {
    match channel_rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Read lines on a blocking thread (rustyline is synchronous) and forward them
fn spawn_input_reader() -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};
use twenty_engine::engine::Board;

use crate::config::SessionConfig;
use crate::host::{self, HostCommand};
use crate::input::{InputEvent, InputFilter, Symbol};

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The player pressed quit.
    Quit,
    /// A move left no empty cell for the spawn.
    Lost,
    /// No qualifying input arrived within the input timeout.
    TimedOut,
    /// The host dropped its side of the input or command channel.
    HostGone,
    /// The session's cancellation token fired.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub player_id: u64,
    pub reason: EndReason,
    pub moves: u64,
    pub score: u64,
    pub highest_tile: u32,
    pub board: Board,
}

/// One play-through: waits for the player's reactions on the board message,
/// applies them to the board and tells the host what to show.
pub struct GameSession {
    pub player_id: u64,
    pub message_id: u64,
    pub board: Board,
    input_timeout: Duration,
    loss_linger: Duration,
    input_rx: mpsc::Receiver<InputEvent>,
    host_tx: mpsc::Sender<HostCommand>,
    cancel: CancellationToken,
    rng: StdRng,
}

enum Wait {
    Input(Symbol),
    TimedOut,
    Closed,
    Cancelled,
}

impl GameSession {
    pub fn new(
        player_id: u64,
        message_id: u64,
        cfg: &SessionConfig,
        input_rx: mpsc::Receiver<InputEvent>,
        host_tx: mpsc::Sender<HostCommand>,
        cancel: CancellationToken,
    ) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            player_id,
            message_id,
            board: Board::new_game(),
            input_timeout: cfg.input_timeout(),
            loss_linger: cfg.loss_linger(),
            input_rx,
            host_tx,
            cancel,
            rng,
        }
    }

    /// Start from `board` instead of the default opening.
    pub fn with_board(mut self, board: Board) -> Self {
        self.board = board;
        self
    }

    /// Run the session loop to completion and return the summary.
    pub async fn run(mut self) -> SessionSummary {
        let mut filter = InputFilter::new(self.player_id, self.message_id);
        let mut moves: u64 = 0;
        let mut score: u64 = 0;
        info!(player = self.player_id, message = self.message_id, "session started");

        let opened = self.emit(HostCommand::Announce(host::start_notice(self.input_timeout))).await
            && self
                .emit(HostCommand::ShowBoard {
                    message_id: self.message_id,
                    text: host::board_block(&self.board),
                })
                .await;

        let reason = if !opened {
            EndReason::HostGone
        } else {
            loop {
                let symbol = match next_input(
                    &mut self.input_rx,
                    &filter,
                    &self.cancel,
                    self.input_timeout,
                )
                .await
                {
                    Wait::Input(symbol) => symbol,
                    Wait::TimedOut => {
                        self.end_game().await;
                        break EndReason::TimedOut;
                    }
                    Wait::Closed => break EndReason::HostGone,
                    Wait::Cancelled => break EndReason::Cancelled,
                };

                // Whether the host manages to remove the reaction is its concern;
                // a closed channel means it is gone.
                let cleared = self
                    .emit(HostCommand::ClearInput {
                        message_id: self.message_id,
                        user_id: self.player_id,
                        symbol: symbol.emoji().to_string(),
                    })
                    .await;
                if !cleared {
                    break EndReason::HostGone;
                }

                let Some(direction) = symbol.direction() else {
                    self.end_game().await;
                    break EndReason::Quit;
                };

                let res = self.board.make_move(direction, &mut self.rng);
                filter.record(symbol);
                if res.is_lost() {
                    self.lose().await;
                    break EndReason::Lost;
                }

                self.board = res.board;
                moves += 1;
                score += res.gained;
                debug!(player = self.player_id, %direction, gained = res.gained, score, "move applied");

                let updated = self
                    .emit(HostCommand::UpdateBoard {
                        message_id: self.message_id,
                        text: host::board_block(&self.board),
                    })
                    .await;
                if !updated {
                    break EndReason::HostGone;
                }
            }
        };

        let summary = SessionSummary {
            player_id: self.player_id,
            reason,
            moves,
            score,
            highest_tile: self.board.highest_tile(),
            board: self.board,
        };
        info!(
            player = summary.player_id,
            reason = ?summary.reason,
            moves = summary.moves,
            score = summary.score,
            highest_tile = summary.highest_tile,
            "session ended"
        );
        summary
    }

    /// Send a command; false once the host has hung up.
    async fn emit(&self, cmd: HostCommand) -> bool {
        self.host_tx.send(cmd).await.is_ok()
    }

    async fn end_game(&self) {
        self.emit(HostCommand::Announce(host::END_NOTICE.to_string())).await;
        self.emit(HostCommand::RetireBoard { message_id: self.message_id }).await;
    }

    async fn lose(&self) {
        self.emit(HostCommand::Announce(host::loss_notice(self.player_id))).await;
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = tokio::time::sleep(self.loss_linger) => {}
        }
        self.emit(HostCommand::RetireBoard { message_id: self.message_id }).await;
    }
}

// The timeout covers the whole wait; ignored events do not restart it.
async fn next_input(
    rx: &mut mpsc::Receiver<InputEvent>,
    filter: &InputFilter,
    cancel: &CancellationToken,
    timeout: Duration,
) -> Wait {
    let qualifying = async {
        while let Some(event) = rx.recv().await {
            match filter.accepts(&event) {
                Some(symbol) => return Some(symbol),
                None => trace!(user = event.user_id, symbol = %event.symbol, "input ignored"),
            }
        }
        None
    };
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Wait::Cancelled,
        res = tokio::time::timeout(timeout, qualifying) => match res {
            Ok(Some(symbol)) => Wait::Input(symbol),
            Ok(None) => Wait::Closed,
            Err(_elapsed) => Wait::TimedOut,
        },
    }
}

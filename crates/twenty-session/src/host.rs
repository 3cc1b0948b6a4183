use std::time::Duration;

use twenty_engine::engine::Board;

pub const END_NOTICE: &str = "Ending game";

/// Instructions a session sends to its host. The host owns delivery; the
/// session never learns whether a command succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Post a standalone message in the session's channel.
    Announce(String),
    /// Post the board as message `message_id` and attach the input reactions.
    ShowBoard { message_id: u64, text: String },
    /// Replace the contents of the board message.
    UpdateBoard { message_id: u64, text: String },
    /// Remove the player's reaction so the same symbol can be pressed again later.
    ClearInput {
        message_id: u64,
        user_id: u64,
        symbol: String,
    },
    /// Delete the board message.
    RetireBoard { message_id: u64 },
}

pub fn start_notice(timeout: Duration) -> String {
    format!(
        "Starting game...\nIf a reaction is not received every {}, the game will time out.",
        describe(timeout)
    )
}

pub fn loss_notice(player_id: u64) -> String {
    format!("Oh no! It appears you have lost {}", mention(player_id))
}

pub fn mention(user_id: u64) -> String {
    format!("<@{user_id}>")
}

/// Board rendering wrapped in a fixed-width code block.
pub fn board_block(board: &Board) -> String {
    format!("```\n{}```", board.render())
}

fn describe(d: Duration) -> String {
    let secs = d.as_secs();
    match (secs / 60, secs % 60) {
        (1, 0) => "1 minute".to_string(),
        (m, 0) if m > 0 => format!("{m} minutes"),
        _ if secs == 1 => "1 second".to_string(),
        _ => format!("{secs} seconds"),
    }
}

//! Stdin/stdout host used by the `twenty` binary.

use crate::host::HostCommand;
use crate::input::Symbol;

/// Map a typed line to a reaction symbol. Accepts the arrow emoji, words
/// (`up`, `left`, ...), single letters (`u/d/l/r`), and `q`/`quit`.
pub fn symbol_for_line(line: &str) -> Option<Symbol> {
    let line = line.trim();
    if let Some(symbol) = Symbol::parse(line) {
        return Some(symbol);
    }
    match line.to_ascii_lowercase().as_str() {
        "u" | "up" => Some(Symbol::Up),
        "d" | "down" => Some(Symbol::Down),
        "l" | "left" => Some(Symbol::Left),
        "r" | "right" => Some(Symbol::Right),
        "q" | "x" | "quit" | "exit" => Some(Symbol::Quit),
        _ => None,
    }
}

/// What the terminal prints for a host command, if anything.
pub fn display_command(cmd: &HostCommand) -> Option<String> {
    match cmd {
        HostCommand::Announce(text) => Some(text.clone()),
        HostCommand::ShowBoard { text, .. } | HostCommand::UpdateBoard { text, .. } => {
            Some(strip_fence(text).to_string())
        }
        HostCommand::ClearInput { .. } | HostCommand::RetireBoard { .. } => None,
    }
}

fn strip_fence(text: &str) -> &str {
    text.strip_prefix("```\n")
        .and_then(|t| t.strip_suffix("```"))
        .unwrap_or(text)
}

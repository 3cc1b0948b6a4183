use twenty_engine::engine::Move;

/// The five reactions a board message accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Up,
    Down,
    Left,
    Right,
    Quit,
}

impl Symbol {
    pub const ALL: [Symbol; 5] = [
        Symbol::Up,
        Symbol::Down,
        Symbol::Left,
        Symbol::Right,
        Symbol::Quit,
    ];

    pub fn emoji(self) -> &'static str {
        match self {
            Symbol::Up => "\u{2B06}",
            Symbol::Down => "\u{2B07}",
            Symbol::Left => "\u{2B05}",
            Symbol::Right => "\u{27A1}",
            Symbol::Quit => "\u{274C}",
        }
    }

    /// Match reaction text; a trailing emoji variation selector is ignored.
    pub fn parse(text: &str) -> Option<Symbol> {
        let text = text.trim_end_matches('\u{FE0F}');
        Symbol::ALL.into_iter().find(|s| s.emoji() == text)
    }

    /// The move this symbol stands for; `None` for quit.
    pub fn direction(self) -> Option<Move> {
        match self {
            Symbol::Up => Some(Move::Up),
            Symbol::Down => Some(Move::Down),
            Symbol::Left => Some(Move::Left),
            Symbol::Right => Some(Move::Right),
            Symbol::Quit => None,
        }
    }
}

/// A reaction delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub user_id: u64,
    pub message_id: u64,
    pub symbol: String,
}

impl InputEvent {
    pub fn new(user_id: u64, message_id: u64, symbol: Symbol) -> Self {
        Self {
            user_id,
            message_id,
            symbol: symbol.emoji().to_string(),
        }
    }
}

/// Decides which events a session reacts to: the session's player, on the
/// session's board message, one of the five symbols, and not the symbol
/// accepted last.
#[derive(Debug, Clone)]
pub struct InputFilter {
    player_id: u64,
    message_id: u64,
    last: Option<Symbol>,
}

impl InputFilter {
    pub fn new(player_id: u64, message_id: u64) -> Self {
        Self {
            player_id,
            message_id,
            last: None,
        }
    }

    pub fn accepts(&self, event: &InputEvent) -> Option<Symbol> {
        if event.user_id != self.player_id || event.message_id != self.message_id {
            return None;
        }
        let symbol = Symbol::parse(&event.symbol)?;
        (Some(symbol) != self.last).then_some(symbol)
    }

    pub fn record(&mut self, symbol: Symbol) {
        self.last = Some(symbol);
    }

    pub fn last(&self) -> Option<Symbol> {
        self.last
    }
}

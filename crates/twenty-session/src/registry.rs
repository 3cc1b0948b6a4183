use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Process-wide table of running sessions, one per player.
///
/// Sessions register when they start and unregister when they end.
/// `shutdown` (plugin unload) cancels every registered session and refuses
/// new ones.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    root: CancellationToken,
    active: Arc<Mutex<HashMap<u64, CancellationToken>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the player's slot and return the token the session should watch.
    pub async fn register(&self, player_id: u64) -> Result<CancellationToken> {
        if self.root.is_cancelled() {
            bail!("session registry is shut down");
        }
        let mut map = self.active.lock().await;
        if map.contains_key(&player_id) {
            bail!("player {player_id} already has a game running");
        }
        let token = self.root.child_token();
        map.insert(player_id, token.clone());
        debug!(player = player_id, active = map.len(), "session registered");
        Ok(token)
    }

    /// Release the player's slot. Returns false if nothing was registered.
    pub async fn unregister(&self, player_id: u64) -> bool {
        let mut map = self.active.lock().await;
        let removed = map.remove(&player_id).is_some();
        debug!(player = player_id, removed, active = map.len(), "session unregistered");
        removed
    }

    /// Cancel one player's session, if any.
    pub async fn cancel(&self, player_id: u64) -> bool {
        let map = self.active.lock().await;
        match map.get(&player_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub async fn is_active(&self, player_id: u64) -> bool {
        self.active.lock().await.contains_key(&player_id)
    }

    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }

    /// Cancel all sessions and refuse new registrations. Returns how many
    /// sessions were running.
    pub async fn shutdown(&self) -> usize {
        self.root.cancel();
        let running = self.active.lock().await.len();
        info!(running, "session registry shut down");
        running
    }
}

use crate::config;
use crate::host::HostCommand;
use crate::input::InputEvent;
use crate::registry::SessionRegistry;
use crate::session::{GameSession, SessionSummary};
use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Register `player_id`, then run a session for them on a Tokio task. The
/// player is unregistered when the session ends, whatever the reason.
pub async fn start_session(
    registry: &SessionRegistry,
    player_id: u64,
    message_id: u64,
    cfg: &config::SessionConfig,
    input_rx: mpsc::Receiver<InputEvent>,
    host_tx: mpsc::Sender<HostCommand>,
) -> Result<JoinHandle<SessionSummary>> {
    let cancel = registry
        .register(player_id)
        .await
        .with_context(|| format!("cannot start a game for player {player_id}"))?;
    let session = GameSession::new(player_id, message_id, cfg, input_rx, host_tx, cancel);
    let registry = registry.clone();
    Ok(tokio::spawn(async move {
        let summary = session.run().await;
        registry.unregister(player_id).await;
        summary
    }))
}

//! One chat turn with an optional deadline

use crate::output::console::ConsoleRenderer;
use reentry_application::{ChannelSession, SessionError, Transport, TurnSummary};
use reentry_domain::TurnRequest;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Why a turn produced no complete reply
#[derive(Error, Debug)]
pub enum TurnError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("No complete reply within {0:?}")]
    TimedOut(Duration),
}

/// Send `request` and render the reply.
///
/// When `timeout` elapses the session is closed, which also cancels the turn.
pub async fn execute_turn<T: Transport + ?Sized>(
    session: &ChannelSession<T>,
    request: &TurnRequest,
    renderer: &ConsoleRenderer,
    timeout: Option<Duration>,
) -> Result<TurnSummary, TurnError> {
    let turn = session.send_and_await(request, renderer);
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, turn).await {
            Ok(result) => result.map_err(TurnError::from),
            Err(_) => {
                warn!("Turn timed out after {:?}, closing session", limit);
                session.close().await;
                Err(TurnError::TimedOut(limit))
            }
        },
        None => turn.await.map_err(TurnError::from),
    };

    if let Err(e) = &result {
        warn!("Turn failed: {}", e);
        renderer.render_failure();
    }
    result
}

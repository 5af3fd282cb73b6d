//! Remote session use-case: enforce the connection precondition, then hand
//! off to whichever `RemoteSession` strategy was selected.

use anyhow::Result;

use crate::application::ports::{RemoteSession, SessionEvents};
use crate::domain::ConnectionInfo;

/// Validate `info` and open a session on it.
///
/// No connection or process is started unless host, key path and username
/// are all present.
///
/// # Errors
///
/// Returns `ConnectionError::MissingField` before any attempt, or the
/// strategy's `SessionError`.
pub async fn open(
    session: &impl RemoteSession,
    info: &ConnectionInfo,
    events: &impl SessionEvents,
) -> Result<()> {
    let target = info.validate()?;
    tracing::info!(
        host = %target.host,
        user = %target.username,
        relay = ?target.relay_host,
        "opening remote session"
    );
    session.open(&target, events).await?;
    Ok(())
}

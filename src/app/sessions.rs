use chrono::{SecondsFormat, Utc};

use crate::args::InteractArgs;
use crate::error::AppResult;
use crate::store::{InteractionLog, SessionBook, SessionRegistry};

use super::Workspace;

pub(super) fn run_interact(workspace: &Workspace, args: &InteractArgs) -> AppResult<()> {
    let log = InteractionLog::new(std::sync::Arc::clone(&workspace.kv));
    let interaction = log.record(&args.kind, args.target.as_deref(), Utc::now())?;
    println!("{}", serde_json::to_string(&interaction)?);
    Ok(())
}

pub(super) fn run_sessions(workspace: &Workspace) -> AppResult<()> {
    let registry = registry(workspace);
    let current = SessionBook::new(std::sync::Arc::clone(&workspace.kv)).current_session_id()?;
    let sessions = registry.sessions()?;
    if sessions.is_empty() {
        println!("No active sessions.");
        return Ok(());
    }
    for (session_id, last_seen) in sessions {
        let marker = if current.as_deref() == Some(session_id.as_str()) {
            " (current)"
        } else {
            ""
        };
        println!(
            "{} last seen {}{}",
            session_id,
            last_seen.to_rfc3339_opts(SecondsFormat::Secs, true),
            marker
        );
    }
    Ok(())
}

pub(super) fn run_end_session(workspace: &Workspace) -> AppResult<()> {
    let book = SessionBook::new(std::sync::Arc::clone(&workspace.kv));
    let Some(session_id) = book.current_session_id()? else {
        tracing::info!("No session to end");
        return Ok(());
    };
    registry(workspace).end(&session_id)?;
    book.end()?;
    InteractionLog::new(std::sync::Arc::clone(&workspace.kv)).clear()?;
    tracing::info!("Ended session {}", session_id);
    Ok(())
}

fn registry(workspace: &Workspace) -> SessionRegistry {
    SessionRegistry::with_ttl(std::sync::Arc::clone(&workspace.kv), workspace.session_ttl)
}

use uuid::Uuid;

/// Value stored under the liveness marker
pub const SESSION_ACTIVE: &str = "active";

/// Value stored under a turn lock
pub const TURN_LOCKED: &str = "locked";

/// Sliding liveness marker of a session
pub fn session_marker(session_id: Uuid) -> String {
    format!("session:{}", session_id)
}

/// Advisory lock held for the duration of one turn
pub fn turn_lock(session_id: Uuid) -> String {
    format!("lock:chat:{}", session_id)
}

/// Cached first page of a session's history
pub fn history_page(session_id: Uuid) -> String {
    format!("chat_history:{}", session_id)
}

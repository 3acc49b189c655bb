/// Serialized bounded metric log.
pub const METRICS_KEY: &str = "powerbi_metrics";
/// Session id to last-seen epoch millis.
pub const ACTIVE_SESSIONS_KEY: &str = "active_sessions";
pub const SESSION_ID_KEY: &str = "sessionId";
pub const SESSION_START_KEY: &str = "session_start";
/// Recorded report interactions for the current session.
pub const INTERACTIONS_KEY: &str = "report_interactions";
/// Written by the login flow; only its presence is read here.
pub const USER_TOKEN_KEY: &str = "user_token";

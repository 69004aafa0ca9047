use crate::backend::{DirectiveComposer, SessionState};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single composer all turns run through
    pub composer: Arc<DirectiveComposer>,

    /// Live session state (session_id → state), dropped at session end
    pub sessions: Arc<RwLock<HashMap<String, SessionState>>>,
}

impl AppState {
    pub fn new(composer: Arc<DirectiveComposer>) -> Self {
        Self {
            composer,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

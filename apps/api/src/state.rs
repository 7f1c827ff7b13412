use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::resume::ResumeExtractor;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main`; the store owns the process-wide connection pool.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub passwords: PasswordHasher,
    /// Pluggable resume extractor. `DisabledExtractor` when no API key is configured.
    pub extractor: Arc<dyn ResumeExtractor>,
}

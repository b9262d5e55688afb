//! Cache maintenance after link mutations.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::infrastructure::cache::CacheService;

/// A change applied to a link in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMutation<'a> {
    Created {
        code: &'a str,
        destination_url: &'a str,
    },
    Updated {
        code: &'a str,
    },
    Deactivated {
        code: &'a str,
    },
    Deleted {
        code: &'a str,
    },
}

impl LinkMutation<'_> {
    fn code(&self) -> &str {
        match self {
            LinkMutation::Created { code, .. }
            | LinkMutation::Updated { code }
            | LinkMutation::Deactivated { code }
            | LinkMutation::Deleted { code } => code,
        }
    }
}

/// Keeps the redirect cache in step with the link store.
///
/// Must run after the store mutation succeeded. Creation warms the cache; every
/// other mutation evicts the entry. Cache failures are logged and swallowed.
#[derive(Clone)]
pub struct MutationHooks {
    cache: Arc<dyn CacheService>,
}

impl MutationHooks {
    pub fn new(cache: Arc<dyn CacheService>) -> Self {
        Self { cache }
    }

    pub async fn after(&self, mutation: LinkMutation<'_>) {
        let code = mutation.code();

        let result = match mutation {
            LinkMutation::Created {
                destination_url, ..
            } => self.cache.set_url(code, destination_url, None).await,
            _ => self.cache.invalidate(code).await,
        };

        match result {
            Ok(()) => debug!(code, ?mutation, "Cache updated after mutation"),
            Err(e) => warn!(code, error = %e, "Cache update after mutation failed"),
        }
    }
}

//! Shared application state injected into every handler.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::application::services::{
    AuthService, LinkService, MutationHooks, Resolver, StatsService,
};
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{LinkRepository, StatsRepository, TokenRepository};
use crate::infrastructure::cache::CacheService;

/// Settings the handlers and services need beyond their repositories.
#[derive(Debug, Clone)]
pub struct StateSettings {
    pub base_url: String,
    pub behind_proxy: bool,
    pub short_code_length: usize,
    pub resolve_timeout: Duration,
    pub token_signing_secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver<dyn LinkRepository>>,
    pub link_service: Arc<LinkService<dyn LinkRepository>>,
    pub stats_service: Arc<StatsService<dyn LinkRepository, dyn StatsRepository>>,
    pub auth_service: Arc<AuthService<dyn TokenRepository>>,
    pub link_repository: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    pub base_url: String,
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires the services over the given repositories and cache.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        stats_repository: Arc<dyn StatsRepository>,
        token_repository: Arc<dyn TokenRepository>,
        cache: Arc<dyn CacheService>,
        click_sender: mpsc::Sender<ClickEvent>,
        settings: StateSettings,
    ) -> Self {
        let hooks = MutationHooks::new(cache.clone());

        let resolver = Resolver::new(
            link_repository.clone(),
            cache.clone(),
            settings.resolve_timeout,
        );
        let link_service = LinkService::new(
            link_repository.clone(),
            hooks,
            settings.short_code_length,
        );
        let stats_service = StatsService::new(link_repository.clone(), stats_repository);
        let auth_service = AuthService::new(token_repository, settings.token_signing_secret);

        Self {
            resolver: Arc::new(resolver),
            link_service: Arc::new(link_service),
            stats_service: Arc::new(stats_service),
            auth_service: Arc::new(auth_service),
            link_repository,
            cache,
            click_sender,
            base_url: settings.base_url,
            behind_proxy: settings.behind_proxy,
        }
    }
}

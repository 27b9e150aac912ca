//! API module - HTTP handlers and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;

use crate::config::Config;
use crate::services::identity::IdentityService;
use crate::services::image_enricher::ImageEnricher;
use crate::services::plan_generator::PlanGenerator;
use sqlx::PgPool;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: PgPool,
    pub identity: Arc<IdentityService>,
    pub plan_generator: Arc<dyn PlanGenerator>,
    /// Absent when no image service is configured; enrichment then degrades
    /// to records without cover images.
    pub image_enricher: Option<Arc<dyn ImageEnricher>>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: PgPool,
        identity: Arc<IdentityService>,
        plan_generator: Arc<dyn PlanGenerator>,
    ) -> Self {
        Self {
            config,
            db,
            identity,
            plan_generator,
            image_enricher: None,
        }
    }

    /// Set the photo lookup service used for display enrichment.
    pub fn set_image_enricher(&mut self, enricher: Arc<dyn ImageEnricher>) {
        self.image_enricher = Some(enricher);
    }
}

pub type SharedState = Arc<AppState>;

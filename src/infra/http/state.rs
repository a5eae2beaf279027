use std::sync::Arc;

use crate::application::analytics::AnalyticsService;
use crate::application::catalog::CatalogService;
use crate::application::engagement::EngagementService;
use crate::application::notifications::NotificationService;
use crate::application::orders::OrderService;
use crate::application::sessions::SessionService;
use crate::infra::db::PostgresRepositories;

use super::rate_limit::ApiRateLimiter;

#[derive(Clone)]
pub struct ApiState {
    pub sessions: Arc<SessionService>,
    pub catalog: Arc<CatalogService>,
    pub engagement: Arc<EngagementService>,
    pub notifications: Arc<NotificationService>,
    pub orders: Arc<OrderService>,
    pub analytics: Arc<AnalyticsService>,
    pub db: Arc<PostgresRepositories>,
    pub rate_limiter: Arc<ApiRateLimiter>,
}

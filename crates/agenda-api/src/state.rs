use agenda_core::cache::RedisPool;
use agenda_core::jobs::JobProcessor;
use agenda_core::repository::Database;
use agenda_core::services::{AuthService, CustomerService, ProductService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
    pub customer_service: CustomerService,
    pub auth_service: AuthService,
    pub db: Database,
    pub redis: Option<RedisPool>,
    /// The job scheduler core (`agenda_core::jobs`). Request handlers only
    /// ever read its `status()` snapshot or call `notify_due_soon` — the
    /// discovery/dispatch loop itself runs on a background task started
    /// alongside the server.
    pub jobs: Arc<JobProcessor>,
}

impl AppState {
    pub fn new(
        product_service: ProductService,
        customer_service: CustomerService,
        auth_service: AuthService,
        db: Database,
        redis: Option<RedisPool>,
        jobs: Arc<JobProcessor>,
    ) -> Self {
        Self {
            product_service,
            customer_service,
            auth_service,
            db,
            redis,
            jobs,
        }
    }
}

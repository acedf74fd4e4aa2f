// Application state shared across handlers
use std::sync::Arc;

use crate::{
    app_config::{AppConfig, StorageBackend},
    db::DieselPool,
    repositories::Store,
    services::{
        AccountService, ActivityService, BlogService, CurriculumService, EmailError,
        EmailService, JwtService, ProductService, ServiceCatalog,
    },
    utils::PasswordConfig,
};

// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Store,
    /// None when running on the in-memory store
    pub diesel_pool: Option<DieselPool>,
    pub jwt_service: Arc<JwtService>,
    pub email_service: Arc<EmailService>,
    pub accounts: AccountService,
    pub activity: ActivityService,
    pub products: ProductService,
    pub curriculum: CurriculumService,
    pub services: ServiceCatalog,
    pub blog: BlogService,
}

impl AppState {
    /// Wire every service onto the given store
    pub fn new(
        config: AppConfig,
        store: Store,
        diesel_pool: Option<DieselPool>,
    ) -> Result<Self, EmailError> {
        let jwt_service = Arc::new(JwtService::new(&config.jwt));
        let email_service = Arc::new(EmailService::new(config.email.clone())?);

        // Full-strength Argon2 is pointless (and slow) against a throwaway store
        let password_config = match config.storage_backend {
            StorageBackend::Memory => PasswordConfig::light(),
            StorageBackend::Postgres => PasswordConfig::default(),
        };

        let activity = ActivityService::new(store.activity.clone());
        let accounts = AccountService::new(store.users.clone(), jwt_service.clone(), password_config);
        let products = ProductService::new(store.products.clone(), activity.clone());
        let curriculum = CurriculumService::new(store.products.clone(), activity.clone());
        let services = ServiceCatalog::new(store.services.clone(), activity.clone());
        let blog = BlogService::new(store.posts.clone(), activity.clone());

        Ok(Self {
            config: Arc::new(config),
            store,
            diesel_pool,
            jwt_service,
            email_service,
            accounts,
            activity,
            products,
            curriculum,
            services,
            blog,
        })
    }

    /// State backed by the in-memory store, used by tests and local demos
    pub fn in_memory(config: AppConfig) -> Result<Self, EmailError> {
        Self::new(config, Store::in_memory(), None)
    }
}

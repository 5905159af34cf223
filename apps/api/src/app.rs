// Router assembly and shared state

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{auth, health, resources};
use crate::auth::jwt::TokenService;
use crate::auth::password::PasswordHasher;
use crate::config::AppConfig;
use crate::domain::repositories::{CrudRepository, UserRepository};
use crate::domain::resource::Resource;
use crate::domain::user::User;
use crate::infrastructure::repositories::InMemoryRepository;

/// Everything a handler needs, passed explicitly through the router
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub resources: Arc<dyn CrudRepository<Resource>>,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        resources: Arc<dyn CrudRepository<Resource>>,
    ) -> Self {
        let tokens = TokenService::new(
            &config.jwt_secret,
            config.jwt_algorithm,
            config.access_token_ttl,
        );
        let hasher = PasswordHasher::new(config.bcrypt_cost);

        Self {
            config: Arc::new(config),
            users,
            resources,
            tokens,
            hasher,
        }
    }

    /// State backed by fresh in-memory stores
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryRepository::<User>::new()),
            Arc::new(InMemoryRepository::<Resource>::new()),
        )
    }
}

/// Builds the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Service info
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        // Auth routes
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me).patch(auth::update_me))
        .route("/auth/users", get(auth::list_users))
        .route("/auth/users/:id", delete(auth::delete_user))
        // Example resource
        .route(
            "/examples",
            post(resources::create_resource).get(resources::list_resources),
        )
        .route(
            "/examples/:id",
            get(resources::get_resource)
                .patch(resources::update_resource)
                .delete(resources::delete_resource),
        )
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // Shared state
        .with_state(state)
}

use axum::{
    Router,
    extract::FromRef,
    http::{HeaderValue, request::Parts},
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::CorsConfig;
use crate::db::sqlite::IdentityStorage;
use crate::handlers::{account, identity};
use crate::identity::session::CookieSettings;

#[derive(Clone)]
pub struct BackendState {
    pub storage: IdentityStorage,
    pub key: Key,
    pub cookies: CookieSettings,
}

impl BackendState {
    pub fn new(storage: IdentityStorage, key: Key, cookies: CookieSettings) -> Self {
        Self {
            storage,
            key,
            cookies,
        }
    }
}

impl FromRef<BackendState> for Key {
    fn from_ref(state: &BackendState) -> Self {
        state.key.clone()
    }
}

pub fn backend_router(state: BackendState, cors: &CorsConfig) -> Router {
    Router::new()
        .merge(identity_routes())
        .route("/Logout", post(account::logout))
        .route("/roles", get(account::roles))
        .with_state(state)
        .layer(cors_layer(cors))
}

fn identity_routes() -> Router<BackendState> {
    Router::new()
        .route("/register", post(identity::register))
        .route("/login", post(identity::login))
        .route("/manage/info", get(identity::manage_info))
}

/// CORS policy for the WASM client: any method, any header, credentials.
///
/// The allow-list (backend and frontend URL) is only checked when
/// `enforce_allow_list` is set; otherwise every origin is echoed back.
pub fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let allowed: Vec<HeaderValue> = cfg
        .allowed_origins()
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    let enforce = cfg.enforce_allow_list;

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| !enforce || allowed.contains(origin),
        ))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

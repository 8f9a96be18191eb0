use crate::error::ApiError;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{
    middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result as ActixResult,
};
use hybridrec_core::{ItemId, UserId, DEFAULT_TOP_N};
use hybridrec_storage::SnapshotManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request limits and admin access applied by the HTTP layer
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Items returned when `n` is absent
    pub default_n: usize,
    /// Largest `n` a caller may ask for
    pub max_n: usize,
    /// Bearer token required by `/admin` routes when set
    pub admin_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_n: DEFAULT_TOP_N,
            max_n: 100,
            admin_token: None,
        }
    }
}

impl ApiConfig {
    /// Check the `Authorization: Bearer` header against the admin token
    pub fn authorize_admin(&self, req: &HttpRequest) -> Result<(), ApiError> {
        let Some(expected) = self.admin_token.as_deref() else {
            return Ok(());
        };

        let provided = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_string()))?
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                ApiError::Unauthorized("invalid Authorization header format".to_string())
            })?;

        if provided != expected {
            warn!("Rejected admin request with an invalid token");
            return Err(ApiError::Unauthorized("invalid admin token".to_string()));
        }
        Ok(())
    }
}

/// Raw query string of `GET /api/recommend`. Fields stay strings so bad
/// values map to `InvalidInput` instead of a generic extractor error.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendQuery {
    pub user_id: Option<String>,
    pub n: Option<String>,
}

impl RecommendQuery {
    pub fn parse(&self, config: &ApiConfig) -> Result<(UserId, usize), ApiError> {
        let user_id = match self.user_id.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(ApiError::InvalidInput(
                    "missing query parameter 'user_id'".to_string(),
                ))
            }
            Some(raw) => raw.parse::<UserId>().map_err(|_| {
                ApiError::InvalidInput(format!(
                    "user_id must be a non-negative integer, got '{}'",
                    raw
                ))
            })?,
        };

        let n = match self.n.as_deref().map(str::trim) {
            None | Some("") => config.default_n,
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                ApiError::InvalidInput(format!("n must be a positive integer, got '{}'", raw))
            })?,
        };
        if n == 0 || n > config.max_n {
            return Err(ApiError::InvalidInput(format!(
                "n must be between 1 and {}, got {}",
                config.max_n, n
            )));
        }

        Ok((user_id, n))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub user_id: UserId,
    pub items: Vec<ItemId>,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(
        manager: Arc<SnapshotManager>,
        config: ApiConfig,
        bind: String,
        port: u16,
    ) -> std::io::Result<()> {
        info!("HTTP API listening on {}:{}", bind, port);
        if config.admin_token.is_none() {
            warn!("No admin token configured, POST /admin/reload is open");
        }
        HttpServer::new(move || {
            App::new()
                .wrap(middleware::Logger::default())
                .app_data(web::Data::new(manager.clone()))
                .app_data(web::Data::new(config.clone()))
                .configure(Self::routes)
        })
        .bind((bind.as_str(), port))?
        .run()
        .await
    }

    /// Route table, shared by the server and the handler tests.
    /// Only the read-only `/api` scope is open to cross-origin callers.
    pub fn routes(cfg: &mut web::ServiceConfig) {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET"])
            .allow_any_header()
            .max_age(3600);

        cfg.service(
            web::scope("/api")
                .wrap(cors)
                .route("/recommend", web::get().to(recommend)),
        )
        .route("/health", web::get().to(health))
        .route("/admin/reload", web::post().to(reload));
    }
}

async fn recommend(
    manager: web::Data<Arc<SnapshotManager>>,
    config: web::Data<ApiConfig>,
    query: web::Query<RecommendQuery>,
) -> Result<HttpResponse, ApiError> {
    let (user_id, n) = query.parse(&config)?;
    let snapshot = manager.current()?;

    let items = snapshot.recommend(user_id, n);
    debug!(user_id, n, returned = items.len(), "recommendation served");

    Ok(HttpResponse::Ok().json(RecommendResponse { user_id, items }))
}

async fn health(manager: web::Data<Arc<SnapshotManager>>) -> ActixResult<HttpResponse> {
    let status = manager.status();
    match status.current {
        Some(info) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "snapshot": info,
            "last_error": status.last_error,
        }))),
        None => Ok(HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unavailable",
            "error": status.last_error,
        }))),
    }
}

async fn reload(
    req: HttpRequest,
    manager: web::Data<Arc<SnapshotManager>>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse, ApiError> {
    config.authorize_admin(&req)?;
    let info = manager.reload().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "result": true,
        "snapshot": info,
    })))
}

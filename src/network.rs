use crate::config::{Config, CorsConfig};
use crate::hangman::HangmanManager;
use crate::message::{
    ErrorResponse, GameRequest, ListCategoryResponse, PickWordRequest, ValidateRequest,
    ValidateResponse, WordStatusResponse,
};
use crate::session::TokenStore;
use crate::storage::Storage;
use crate::{Error, Result};
use axum::{
    Json, Router,
    extract::State,
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    routing::post,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};

/// 猜单词HTTP服务
pub struct HangmanServer {
    manager: Arc<HangmanManager>,
}

impl HangmanServer {
    pub fn new(manager: HangmanManager) -> Self {
        HangmanServer {
            manager: Arc::new(manager),
        }
    }

    /// 按配置连接数据库和令牌存储
    pub async fn from_config(config: &Config) -> Result<Self> {
        let storage =
            Storage::connect(&config.database.url, config.database.max_connections).await?;

        let tokens = match &config.redis {
            Some(redis) => {
                info!("使用redis令牌存储: {}", redis.url);
                TokenStore::redis(&redis.url).await?
            }
            None => {
                warn!("未配置redis，使用进程内令牌存储");
                TokenStore::memory()
            }
        };

        Ok(Self::new(HangmanManager::new(storage, tokens)))
    }

    pub fn router(&self, cors: &CorsConfig) -> Router {
        app(self.manager.clone()).layer(cors_layer(cors))
    }

    /// 启动HTTP服务器
    pub async fn start_http_server(&self, http_addr: SocketAddr, cors: &CorsConfig) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(http_addr)
            .await
            .map_err(|e| {
                error!("绑定HTTP地址失败: {} - {}", http_addr, e);
                Error::Network(anyhow::anyhow!(e))
            })?;

        info!("HTTP服务器启动在 {}", http_addr);
        axum::serve(listener, self.router(cors))
            .await
            .map_err(|e| {
                error!("HTTP服务器运行错误: {}", e);
                Error::Network(anyhow::anyhow!(e))
            })?;
        Ok(())
    }
}

/// 路由表，`reset` 与 `pick_word` 相同
pub fn app(manager: Arc<HangmanManager>) -> Router {
    Router::new()
        .route("/v1/hangman/list_category", post(list_category))
        .route("/v1/hangman/pick_word", post(pick_word))
        .route("/v1/hangman/load_status", post(load_status))
        .route("/v1/hangman/validate", post(validate))
        .route("/v1/hangman/reset", post(pick_word))
        .with_state(manager)
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let allow_all = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_credentials(false);

    if cors.allow_all_origins.unwrap_or(true) {
        debug!("CORS配置: 允许所有来源");
        return allow_all;
    }

    match &cors.allowed_origins {
        Some(allowed_origins) if !allowed_origins.is_empty() => {
            let origins = allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<axum::http::HeaderValue>().ok())
                .collect::<Vec<_>>();

            debug!("CORS允许的来源: {:?}", origins);
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::POST, axum::http::Method::OPTIONS])
                .allow_headers([axum::http::header::CONTENT_TYPE])
                .allow_credentials(true)
        }
        _ => {
            debug!("CORS配置: 没有设置允许的来源，默认允许所有来源");
            allow_all
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Persistence(_)
            | Error::SessionStore(_)
            | Error::InvalidWord(_)
            | Error::Network(_) => error!("请求处理失败: {}", self),
            _ => warn!("请求被拒绝: {}", self),
        }
        // 与平台一致，错误也用200返回
        Json(ErrorResponse::from(&self)).into_response()
    }
}

async fn list_category(
    State(manager): State<Arc<HangmanManager>>,
    payload: std::result::Result<Json<GameRequest>, JsonRejection>,
) -> Result<Json<ListCategoryResponse>> {
    let Json(request) = payload?;
    Ok(Json(manager.list_category(request).await?))
}

async fn pick_word(
    State(manager): State<Arc<HangmanManager>>,
    payload: std::result::Result<Json<PickWordRequest>, JsonRejection>,
) -> Result<Json<WordStatusResponse>> {
    let Json(request) = payload?;
    Ok(Json(manager.pick_word(request).await?))
}

async fn load_status(
    State(manager): State<Arc<HangmanManager>>,
    payload: std::result::Result<Json<GameRequest>, JsonRejection>,
) -> Result<Json<WordStatusResponse>> {
    let Json(request) = payload?;
    Ok(Json(manager.load_status(request).await?))
}

async fn validate(
    State(manager): State<Arc<HangmanManager>>,
    payload: std::result::Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>> {
    let Json(request) = payload?;
    Ok(Json(manager.validate(request).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hangman::HANGMAN_GAME_ID;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let storage = Storage::memory().await;
        storage.add_user(1, "alice").await;
        storage.add_category(1, "animals").await;
        storage.add_word(1, "cat").await;

        let tokens = TokenStore::memory();
        tokens.issue(1, HANGMAN_GAME_ID, "tok").await.unwrap();

        HangmanServer::new(HangmanManager::new(storage, tokens)).router(&CorsConfig::default())
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn list_category_route() {
        let app = test_app().await;
        let (status, body) = post_json(
            &app,
            "/v1/hangman/list_category",
            json!({"user_id": 1, "game_id": 1, "game_token": "tok"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "code": 130,
                "message_type": "user_success",
                "categories": [{"id": 1, "name": "animals"}]
            })
        );
    }

    #[tokio::test]
    async fn full_game_over_http() {
        let app = test_app().await;
        let (_, picked) = post_json(
            &app,
            "/v1/hangman/pick_word",
            json!({"user_id": 1, "game_id": 1, "category_id": 1, "game_token": "tok"}),
        )
        .await;
        assert_eq!(picked["current_word"], "***");
        assert_eq!(picked["status"], 0);

        let mut last = Value::Null;
        for letter in [json!(99), json!("a"), json!(116)] {
            let (_, body) = post_json(
                &app,
                "/v1/hangman/validate",
                json!({"user_id": 1, "game_id": 1, "current_letter": letter, "game_token": "tok"}),
            )
            .await;
            assert_eq!(body["code"], 130);
            assert_eq!(body["true_or_false"], true);
            last = body;
        }
        assert_eq!(last["ending"], true);
        assert_eq!(last["current_word"], "cat");
        assert_eq!(last["letter_status"], (1 << 2) | 1 | (1 << 19));

        let (_, loaded) = post_json(
            &app,
            "/v1/hangman/load_status",
            json!({"user_id": 1, "game_id": 1, "game_token": "tok"}),
        )
        .await;
        assert_eq!(loaded["current_word"], "cat");
        assert_eq!(loaded["ending"], true);

        let (_, ended) = post_json(
            &app,
            "/v1/hangman/validate",
            json!({"user_id": 1, "game_id": 1, "current_letter": "x", "game_token": "tok"}),
        )
        .await;
        assert_eq!(ended["code"], 133);
    }

    #[tokio::test]
    async fn reset_picks_a_new_word() {
        let app = test_app().await;
        let (_, body) = post_json(
            &app,
            "/v1/hangman/reset",
            json!({"user_id": 1, "game_id": 1, "category_id": 1, "game_token": "tok"}),
        )
        .await;
        assert_eq!(body["code"], 130);
        assert_eq!(body["current_word"], "***");
    }

    #[tokio::test]
    async fn errors_use_the_envelope() {
        let app = test_app().await;

        let (status, body) = post_json(
            &app,
            "/v1/hangman/load_status",
            json!({"user_id": 1, "game_id": 3, "game_token": "tok"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 103);
        assert_eq!(body["message_type"], "user_error");
        assert!(body["message"].as_str().is_some());

        let (_, body) = post_json(
            &app,
            "/v1/hangman/load_status",
            json!({"user_id": 1, "game_id": 1, "game_token": "tok"}),
        )
        .await;
        assert_eq!(body["code"], 131);

        let (_, body) = post_json(
            &app,
            "/v1/hangman/list_category",
            json!({"user_id": 5, "game_id": 1, "game_token": "tok"}),
        )
        .await;
        assert_eq!(body["code"], 112);
    }

    #[tokio::test]
    async fn malformed_bodies_are_invalid_requests() {
        let app = test_app().await;
        let (status, body) = post_json(
            &app,
            "/v1/hangman/validate",
            json!({"user_id": 1, "game_id": 1, "game_token": "tok"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 102);

        let (_, body) = post_json(
            &app,
            "/v1/hangman/validate",
            json!({"user_id": 1, "game_id": 1, "current_letter": "?", "game_token": "tok"}),
        )
        .await;
        assert_eq!(body["code"], 102);
    }
}

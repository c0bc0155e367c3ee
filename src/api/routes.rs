//! API Routes
//!
//! HTTP endpoint definitions. Each endpoint pins the status its failures are
//! reported with.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::{Coins, CoinTransferInfo, DomainError, OperationContext, UserInfo};
use crate::error::{ApiError, AppError};
use crate::handlers::{AuthenticateCommand, BuyItemCommand, SendCoinsCommand};
use crate::state::AppState;

use super::middleware::{auth_middleware, AuthenticatedUser};

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct SendCoinRequest {
    #[serde(rename = "toUser")]
    pub to_user: String,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InventoryItemResponse {
    #[serde(rename = "type")]
    pub item_type: String,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct CoinTransferResponse {
    pub amount: i64,
    pub username: String,
}

impl From<CoinTransferInfo> for CoinTransferResponse {
    fn from(info: CoinTransferInfo) -> Self {
        Self {
            amount: info.amount.value(),
            username: info.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CoinHistoryResponse {
    pub received: Vec<CoinTransferResponse>,
    pub sent: Vec<CoinTransferResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub coins: i64,
    pub inventory: Vec<InventoryItemResponse>,
    pub coin_history: CoinHistoryResponse,
}

impl From<UserInfo> for InfoResponse {
    fn from(info: UserInfo) -> Self {
        Self {
            coins: info.coins.value(),
            inventory: info
                .inventory
                .into_iter()
                .map(|item| InventoryItemResponse {
                    item_type: item.item_name,
                    quantity: item.quantity,
                })
                .collect(),
            coin_history: CoinHistoryResponse {
                received: info
                    .coin_history
                    .received
                    .into_iter()
                    .map(Into::into)
                    .collect(),
                sent: info.coin_history.sent.into_iter().map(Into::into).collect(),
            },
        }
    }
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request(AppError::InvalidRequest(rejection.body_text()))
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router. Everything except `/auth` requires a bearer
/// credential.
pub fn create_router(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/sendCoin", post(send_coin))
        .route("/buy/", get(buy_without_item))
        .route("/buy/:item", get(buy_item))
        .route("/info", get(get_info))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/auth", post(authenticate))
        .merge(protected)
}

// =========================================================================
// POST /auth
// =========================================================================

/// Log in, registering unknown users
async fn authenticate(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload.map_err(invalid_body)?;

    let result = state
        .accounts
        .authenticate(
            AuthenticateCommand::new(request.username, request.password),
            &context,
        )
        .await
        .map_err(|e| match e {
            AppError::Domain(DomainError::InvalidInput(_)) => ApiError::bad_request(e),
            e => ApiError::unauthorized(e),
        })?;

    Ok(Json(TokenResponse {
        token: result.token,
    }))
}

// =========================================================================
// POST /sendCoin
// =========================================================================

/// Transfer coins from the caller to another user
async fn send_coin(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<SendCoinRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(invalid_body)?;

    if request.to_user.is_empty() {
        return Err(ApiError::bad_request(AppError::InvalidRequest(
            "toUser is required".to_string(),
        )));
    }

    let amount = Coins::new(request.amount).map_err(|e| {
        ApiError::bad_request(AppError::InvalidRequest(format!("amount: {}", e)))
    })?;

    state
        .transfers
        .execute(
            SendCoinsCommand::new(user.username, request.to_user, amount),
            &context,
        )
        .await
        .map_err(ApiError::bad_request)?;

    Ok(Json(MessageResponse::new("Coins sent successfully")))
}

// =========================================================================
// GET /buy/:item
// =========================================================================

/// Buy one unit of a catalog item
async fn buy_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Extension(context): Extension<OperationContext>,
    Path(item): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .purchases
        .execute(BuyItemCommand::new(user.username, item), &context)
        .await
        .map_err(ApiError::bad_request)?;

    Ok(Json(MessageResponse::new("Item purchased successfully")))
}

async fn buy_without_item() -> ApiError {
    ApiError::bad_request(DomainError::InvalidInput(
        "item name cannot be empty".to_string(),
    ))
}

// =========================================================================
// GET /info
// =========================================================================

/// Balance, inventory and coin history of the caller
async fn get_info(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<InfoResponse>, ApiError> {
    let info = state
        .accounts
        .user_info(&user.username)
        .await
        .map_err(ApiError::not_found)?;

    Ok(Json(info.into()))
}

//! 玩家网关处理器
//!
//! 受保护的处理器从请求扩展中读取会话守卫注入的 `SessionContext`。

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use ditebak_resource::models::{Bet, User};
use ditebak_shared::error::Result;
use ditebak_shared::response::{DataEnvelope, parse_data_body};

use super::passthrough;
use crate::middleware::SessionContext;
use crate::state::AppState;
use crate::workflow::PlaceBetCommand;
use crate::workflow::gambler::PageParams;

/// GET /ggw/profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<DataEnvelope<User>>> {
    let user = state.gambler.my_profile(&session.email).await?;
    Ok(Json(DataEnvelope::new(user)))
}

/// GET /ggw/bets
pub async fn my_bets(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(paging): Query<PageParams>,
) -> Result<Response> {
    let body = state.gambler.my_bets(&session.email, &paging).await?;
    Ok(passthrough(body))
}

/// POST /ggw/bets
pub async fn place_bet(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    body: Bytes,
) -> Result<(StatusCode, Json<DataEnvelope<Bet>>)> {
    let command: PlaceBetCommand = parse_data_body(&body)?;
    let bet = state.place_bet.place(&session, &command).await?;
    Ok((StatusCode::CREATED, Json(DataEnvelope::new(bet))))
}

/// GET /ggw/topics
pub async fn topics(
    State(state): State<AppState>,
    Query(paging): Query<PageParams>,
) -> Result<Response> {
    let body = state.gambler.topics(&paging).await?;
    Ok(passthrough(body))
}

/// GET /ggw/topics/{id}
pub async fn topic(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let body = state.gambler.topic(&id).await?;
    Ok(passthrough(body))
}

/// GET /ggw/topics/{id}/bet
pub async fn topic_bet(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Response> {
    let body = state.gambler.topic_bet(&session.email, &id).await?;
    Ok(passthrough(body))
}

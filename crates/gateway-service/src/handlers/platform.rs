//! 平台网关处理器

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use ditebak_shared::error::Result;
use ditebak_shared::response::{DataEnvelope, parse_data_body};

use crate::state::AppState;
use crate::workflow::{AnswerCommand, AnswerStats, LoginCommand};

/// 登录
///
/// POST /pgw/login，成功后下发会话 Cookie 并返回用户
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<Response> {
    let command: LoginCommand = parse_data_body(&body)?;
    let outcome = state.login.login(&command).await?;
    let jar = state.cookie.issue(jar, &outcome.session);

    Ok((jar, Json(DataEnvelope::new(outcome.user))).into_response())
}

/// 退出登录
///
/// GET /pgw/logout
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    (StatusCode::OK, state.cookie.clear(jar)).into_response()
}

/// 公布答案并结算
///
/// POST /pgw/answers
pub async fn answers(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DataEnvelope<AnswerStats>>> {
    let command: AnswerCommand = parse_data_body(&body)?;
    let stats = state.settlement.settle(&command).await?;
    Ok(Json(DataEnvelope::new(stats)))
}

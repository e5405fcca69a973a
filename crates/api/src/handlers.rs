use crate::dto::{
    AddAdblockFilterRequest, CreateRuleRequest, LogsQuery, RulesQuery, SetStartupRequest,
    SetSystemProxyRequest, TrafficQuery, UpdateRuleRequest, UpdateSettingRequest,
};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use custos_application::ports::SystemIntegrationPort;
use custos_domain::{AdblockFilter, DomainError, Rule, RuleSource, RuleType};
use serde_json::json;

pub struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::InvalidPattern(_) | DomainError::ConfigInvalid(_) => StatusCode::BAD_REQUEST,
            DomainError::UnsupportedPlatform(_) => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.get_stats.execute().await?))
}

pub async fn get_logs(
    State(state): State<AppState>,
    Query(q): Query<LogsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.get_recent_logs.execute(q.limit).await?))
}

pub async fn get_traffic(
    State(state): State<AppState>,
    Query(q): Query<TrafficQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.get_traffic_history.execute(q.minutes).await?))
}

pub async fn reset_data(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.reset_data.execute().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_rules(
    State(state): State<AppState>,
    Query(q): Query<RulesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state
            .get_rules
            .execute_paginated(q.page, q.size, &q.search)
            .await?,
    ))
}

pub async fn create_rule(
    State(state): State<AppState>,
    Json(body): Json<CreateRuleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let rule_type = RuleType::from_str(&body.rule_type)
        .ok_or_else(|| DomainError::InvalidPattern(format!("unknown rule type: {}", body.rule_type)))?;
    let rule = Rule {
        id: 0,
        rule_type,
        pattern: body.pattern,
        enabled: body.enabled,
        source: RuleSource::Custom,
    };
    let id = state.create_rule.execute(rule).await?;
    Ok(Json(json!({ "id": id })))
}

pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateRuleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let rule_type = RuleType::from_str(&body.rule_type)
        .ok_or_else(|| DomainError::InvalidPattern(format!("unknown rule type: {}", body.rule_type)))?;
    let rule = Rule {
        id,
        rule_type,
        pattern: body.pattern,
        enabled: body.enabled,
        source: RuleSource::Custom,
    };
    state.update_rule.execute(rule).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.delete_rule.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_adblock_filters(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.get_adblock_filters.execute().await?))
}

pub async fn add_adblock_filter(
    State(state): State<AppState>,
    Json(body): Json<AddAdblockFilterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = AdblockFilter {
        id: 0,
        name: body.name,
        url: body.url,
        enabled: body.enabled,
        last_updated: None,
    };
    let id = state.add_adblock_filter.execute(filter).await?;
    state.refresher.refresh().await;
    Ok(Json(json!({ "id": id })))
}

pub async fn delete_adblock_filter(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.delete_adblock_filter.execute(id).await?;
    state.refresher.refresh().await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.get_settings.execute().await?))
}

pub async fn update_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<UpdateSettingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.update_setting.execute(&key, &body.value).await?;

    // Mirror the persisted value into the live runtime state it backs,
    // matching the settings/flags split documented for the store (§4.6.1).
    match key.as_str() {
        "protection_enabled" => {
            let enabled = custos_domain::parse_bool_setting(&body.value, false);
            state.decision.set_protection_enabled(enabled);
        }
        "adblock_enabled" => {
            let enabled = custos_domain::parse_bool_setting(&body.value, true);
            state.decision.set_adblock_enabled(enabled);
        }
        "proxy_port" => {
            let port = custos_domain::parse_port_setting(&body.value, 1080);
            state
                .socks5
                .set_port(port)
                .await
                .map_err(ApiError::from)?;
        }
        _ => {}
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_system_proxy(
    State(state): State<AppState>,
    Json(body): Json<SetSystemProxyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .system_integration
        .set_system_proxy(body.enabled, body.port)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_startup_enabled(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let enabled = state.system_integration.is_startup_enabled().await?;
    Ok(Json(json!({ "enabled": enabled })))
}

pub async fn set_startup(
    State(state): State<AppState>,
    Json(body): Json<SetStartupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.system_integration.set_startup(body.enabled).await?;
    Ok(StatusCode::NO_CONTENT)
}

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;

use super::domain::UsageScope;
use super::error::QuotaError;
use super::repository::BudgetStore;
use super::service::{BudgetQuotaService, QuotaServiceError};
use super::validator::SubmissionForm;

type Params = HashMap<String, String>;

/// Router builder exposing budget validation, resolution and quota endpoints.
pub fn budget_router<S>(service: Arc<BudgetQuotaService<S>>) -> Router
where
    S: BudgetStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/subcategory-budgets/validate",
            get(validate_handler::<S>),
        )
        .route(
            "/api/v1/subcategory-budgets/available-quartiles",
            get(available_quartiles_handler::<S>),
        )
        .route(
            "/api/v1/subcategory-budgets/mapping",
            get(mapping_handler::<S>),
        )
        .route("/api/v1/budgets/resolve", post(resolve_handler::<S>))
        .route("/api/v1/quota/summary", get(summary_handler::<S>))
        .route("/api/v1/quota/usage", get(usage_handler::<S>))
        .with_state(service)
}

/// Body of a submission resolution request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolveRequest {
    pub subcategory_id: i64,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub require_price: bool,
    #[serde(default)]
    pub form: SubmissionForm,
}

pub(crate) async fn validate_handler<S>(
    State(service): State<Arc<BudgetQuotaService<S>>>,
    Query(params): Query<Params>,
) -> Response
where
    S: BudgetStore + 'static,
{
    let result = required_id(&params, "subcategory_id").and_then(|subcategory_id| {
        service
            .validation_report(subcategory_id, optional_text(&params, "year"))
            .map_err(Rejection::from)
    });

    match result {
        Ok(report) => success(report),
        Err(rejection) => rejection.into_response(),
    }
}

pub(crate) async fn available_quartiles_handler<S>(
    State(service): State<Arc<BudgetQuotaService<S>>>,
    Query(params): Query<Params>,
) -> Response
where
    S: BudgetStore + 'static,
{
    let result = required_id(&params, "subcategory_id").and_then(|subcategory_id| {
        service
            .available_quartiles(subcategory_id, optional_text(&params, "year"))
            .map(|codes| (subcategory_id, codes))
            .map_err(Rejection::from)
    });

    match result {
        Ok((subcategory_id, codes)) => success(json!({
            "subcategory_id": subcategory_id,
            "available_quartiles": codes,
        })),
        Err(rejection) => rejection.into_response(),
    }
}

pub(crate) async fn mapping_handler<S>(
    State(service): State<Arc<BudgetQuotaService<S>>>,
    Query(params): Query<Params>,
) -> Response
where
    S: BudgetStore + 'static,
{
    let result = required_id(&params, "subcategory_id").and_then(|subcategory_id| {
        service
            .mapping(
                subcategory_id,
                optional_text(&params, "year"),
                optional_text(&params, "author_status"),
            )
            .map_err(Rejection::from)
    });

    match result {
        Ok(mapping) => success(mapping),
        Err(rejection) => rejection.into_response(),
    }
}

pub(crate) async fn resolve_handler<S>(
    State(service): State<Arc<BudgetQuotaService<S>>>,
    Json(request): Json<ResolveRequest>,
) -> Response
where
    S: BudgetStore + 'static,
{
    let result = service.resolve_submission(
        &request.form,
        request.subcategory_id,
        request.year.as_deref(),
        request.require_price,
    );

    match result {
        Ok(resolution) => success(resolution),
        Err(err) => Rejection::from(err).into_response(),
    }
}

pub(crate) async fn summary_handler<S>(
    State(service): State<Arc<BudgetQuotaService<S>>>,
    Query(params): Query<Params>,
) -> Response
where
    S: BudgetStore + 'static,
{
    let result = usage_scope(&params)
        .and_then(|scope| service.quota_summary(&scope).map_err(Rejection::from));

    match result {
        Ok(rows) => success(json!({ "total": rows.len(), "rows": rows })),
        Err(rejection) => rejection.into_response(),
    }
}

pub(crate) async fn usage_handler<S>(
    State(service): State<Arc<BudgetQuotaService<S>>>,
    Query(params): Query<Params>,
) -> Response
where
    S: BudgetStore + 'static,
{
    let result = usage_scope(&params).and_then(|scope| {
        let report = service.usage(&scope).map_err(Rejection::from)?;
        let tally = service.status_tally(&scope).map_err(Rejection::from)?;
        Ok((report, tally))
    });

    match result {
        Ok((report, tally)) => success(json!({
            "source": report.source,
            "usage": report.entries(),
            "statuses": tally,
        })),
        Err(rejection) => rejection.into_response(),
    }
}

fn success<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": data })),
    )
        .into_response()
}

/// Error payload returned by every budget endpoint.
#[derive(Debug)]
pub(crate) struct Rejection(QuotaServiceError);

impl From<QuotaServiceError> for Rejection {
    fn from(value: QuotaServiceError) -> Self {
        Self(value)
    }
}

impl From<QuotaError> for Rejection {
    fn from(value: QuotaError) -> Self {
        Self(QuotaServiceError::Quota(value))
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        AppError::Quota(self.0).into_response()
    }
}

fn required_id(params: &Params, name: &str) -> Result<i64, Rejection> {
    let raw = optional_text(params, name)
        .ok_or_else(|| QuotaError::invalid(format!("missing {name}")))?;
    parse_id(raw, name)
}

fn parse_id(raw: &str, name: &str) -> Result<i64, Rejection> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| QuotaError::invalid(format!("invalid {name}: '{raw}'")).into())
}

fn optional_text<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn usage_scope(params: &Params) -> Result<UsageScope, Rejection> {
    let year_ids = match optional_text(params, "year_ids") {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| parse_id(part, "year_ids"))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let subcategory_id = optional_text(params, "subcategory_id")
        .map(|raw| parse_id(raw, "subcategory_id"))
        .transpose()?;
    let user_id = optional_text(params, "user_id")
        .map(|raw| parse_id(raw, "user_id"))
        .transpose()?;

    Ok(UsageScope {
        year_ids,
        subcategory_id,
        user_id,
    })
}

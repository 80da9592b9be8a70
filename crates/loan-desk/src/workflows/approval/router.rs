use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::domain::LoanId;
use super::repository::{LoanEntry, LoanRepository, LoanStatusView};
use super::service::LoanApprovalService;
use crate::error::AppError;

/// Body accepted by the suggest endpoint. A missing or null amount is refused by the state
/// machine rather than by deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestRequest {
    #[serde(default)]
    pub amount: Option<f64>,
}

/// Router builder exposing the loan approval workflow over HTTP.
pub fn approval_router<R>(service: Arc<LoanApprovalService<R>>) -> Router
where
    R: LoanRepository + 'static,
{
    Router::new()
        .route("/api/v1/loans", post(open_handler::<R>))
        .route("/api/v1/loans/:loan_id", get(status_handler::<R>))
        .route("/api/v1/loans/:loan_id/suggest", post(suggest_handler::<R>))
        .route("/api/v1/loans/:loan_id/approve", post(approve_handler::<R>))
        .route("/api/v1/loans/:loan_id/reject", post(reject_handler::<R>))
        .with_state(service)
}

type LoanResponse = Result<(StatusCode, Json<LoanStatusView>), AppError>;

pub(crate) async fn open_handler<R>(
    State(service): State<Arc<LoanApprovalService<R>>>,
) -> LoanResponse
where
    R: LoanRepository + 'static,
{
    let entry = service.open()?;
    Ok(respond(&service, &entry, StatusCode::CREATED))
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<LoanApprovalService<R>>>,
    Path(loan_id): Path<String>,
) -> LoanResponse
where
    R: LoanRepository + 'static,
{
    let entry = service.get(&LoanId(loan_id))?;
    Ok(respond(&service, &entry, StatusCode::OK))
}

pub(crate) async fn suggest_handler<R>(
    State(service): State<Arc<LoanApprovalService<R>>>,
    Path(loan_id): Path<String>,
    Json(request): Json<SuggestRequest>,
) -> LoanResponse
where
    R: LoanRepository + 'static,
{
    let entry = service.suggest(&LoanId(loan_id), request.amount)?;
    Ok(respond(&service, &entry, StatusCode::OK))
}

pub(crate) async fn approve_handler<R>(
    State(service): State<Arc<LoanApprovalService<R>>>,
    Path(loan_id): Path<String>,
) -> LoanResponse
where
    R: LoanRepository + 'static,
{
    let entry = service.approve(&LoanId(loan_id))?;
    Ok(respond(&service, &entry, StatusCode::OK))
}

pub(crate) async fn reject_handler<R>(
    State(service): State<Arc<LoanApprovalService<R>>>,
    Path(loan_id): Path<String>,
) -> LoanResponse
where
    R: LoanRepository + 'static,
{
    let entry = service.reject(&LoanId(loan_id))?;
    Ok(respond(&service, &entry, StatusCode::OK))
}

fn respond<R>(
    service: &LoanApprovalService<R>,
    entry: &LoanEntry,
    status: StatusCode,
) -> (StatusCode, Json<LoanStatusView>)
where
    R: LoanRepository + 'static,
{
    (status, Json(service.view(entry)))
}

//! In-memory expense tracker API.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use thiserror::Error;

use crate::{api::types::ErrorBody, server};

pub mod handlers;
pub mod model;
pub mod repository;

pub use model::{Expense, NewExpense};
pub use repository::{ExpenseRepository, InMemoryExpenseRepository};

use handlers::{add_expense, delete_expense, list_expenses};

#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("{0}")]
    BadRequest(String),
    #[error("expense not found")]
    NotFound,
}

impl IntoResponse for ExpenseError {
    fn into_response(self) -> Response {
        let status = match self {
            ExpenseError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ExpenseError::NotFound => StatusCode::NOT_FOUND,
        };
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

#[derive(Clone)]
pub struct ExpenseState {
    pub repo: Arc<dyn ExpenseRepository>,
}

impl ExpenseState {
    pub fn new(repo: Arc<dyn ExpenseRepository>) -> Self {
        Self { repo }
    }
}

pub fn router() -> Router<ExpenseState> {
    Router::new()
        .route("/api/expenses", get(list_expenses).post(add_expense))
        .route("/api/expenses/{expense_id}", delete(delete_expense))
}

pub fn build_router(state: ExpenseState) -> Router {
    server::with_middleware(router().with_state(state))
}

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use super::{
    model::{Expense, NewExpense},
    ExpenseError, ExpenseState,
};

pub async fn list_expenses(State(state): State<ExpenseState>) -> Json<Vec<Expense>> {
    Json(state.repo.list().await)
}

pub async fn add_expense(
    State(state): State<ExpenseState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Expense>), ExpenseError> {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let expense = NewExpense::from_json(&payload, Utc::now().date_naive())?;
    let expense = state.repo.insert(expense).await;
    info!(id = expense.id, category = %expense.category, "expense added");
    Ok((StatusCode::CREATED, Json(expense)))
}

/// Non-numeric ids can never exist, so they are a 404 like any unknown id.
pub async fn delete_expense(
    State(state): State<ExpenseState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ExpenseError> {
    let id: u64 = raw_id.parse().map_err(|_| ExpenseError::NotFound)?;
    state
        .repo
        .remove(id)
        .await
        .ok_or(ExpenseError::NotFound)?;
    info!(id, "expense deleted");
    Ok(Json(json!({ "message": "deleted" })))
}

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use super::ExpenseError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    pub id: u64,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
}

/// A validated expense that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
}

impl NewExpense {
    /// Validates a request payload. A missing or unreadable `date` falls back
    /// to `today`.
    pub fn from_json(payload: &Value, today: NaiveDate) -> Result<Self, ExpenseError> {
        let fields = payload
            .as_object()
            .filter(|obj| !obj.is_empty())
            .ok_or_else(|| ExpenseError::BadRequest("JSON body required".into()))?;

        let present = |name: &str| fields.get(name).filter(|v| !v.is_null());
        let (Some(amount), Some(category)) = (present("amount"), present("category")) else {
            return Err(ExpenseError::BadRequest(
                "amount and category are required".into(),
            ));
        };

        let amount = parse_amount(amount)
            .ok_or_else(|| ExpenseError::BadRequest("amount must be a number".into()))?;
        let category = category
            .as_str()
            .ok_or_else(|| ExpenseError::BadRequest("category must be a string".into()))?
            .to_string();
        let date = present("date")
            .and_then(Value::as_str)
            .and_then(parse_date)
            .unwrap_or(today);

        Ok(Self {
            amount,
            category,
            date,
        })
    }
}

fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    amount.is_finite().then_some(amount)
}

/// Accepts a plain date or a full ISO datetime, keeping only the date part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

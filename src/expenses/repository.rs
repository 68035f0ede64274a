use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::model::{Expense, NewExpense};

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// All expenses in id order.
    async fn list(&self) -> Vec<Expense>;
    async fn insert(&self, expense: NewExpense) -> Expense;
    async fn remove(&self, id: u64) -> Option<Expense>;
}

/// Process-lifetime store. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct InMemoryExpenseRepository {
    next_id: AtomicU64,
    expenses: RwLock<BTreeMap<u64, Expense>>,
}

impl InMemoryExpenseRepository {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            expenses: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryExpenseRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryExpenseRepository {
    async fn list(&self) -> Vec<Expense> {
        self.expenses.read().await.values().cloned().collect()
    }

    async fn insert(&self, expense: NewExpense) -> Expense {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let expense = Expense {
            id,
            amount: expense.amount,
            category: expense.category,
            date: expense.date,
        };
        self.expenses.write().await.insert(id, expense.clone());
        expense
    }

    async fn remove(&self, id: u64) -> Option<Expense> {
        self.expenses.write().await.remove(&id)
    }
}

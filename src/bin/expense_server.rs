use std::sync::Arc;

use langdetect_service::{
    config::ExpensesConfig,
    expenses::{self, ExpenseState, InMemoryExpenseRepository},
    logging, server,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let config = ExpensesConfig::from_env()?;
    info!("starting expense tracker server");

    let state = ExpenseState::new(Arc::new(InMemoryExpenseRepository::new()));
    let app = expenses::build_router(state);

    server::serve(app, &config.server.addr()).await
}

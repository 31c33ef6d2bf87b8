// src/config.rs

use std::sync::Arc;
use std::{env, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing_subscriber::EnvFilter;

use crate::{db::ImportRepository, services::ImportService};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub import_service: ImportService<ImportRepository>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let import_repo = ImportRepository::new(db_pool.clone());
        let import_service = ImportService::new(Arc::new(import_repo));

        Ok(Self { db_pool, import_service })
    }
}

/// Inicializa o logger. Chamado uma vez pelo binário que embute a lib.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();
}

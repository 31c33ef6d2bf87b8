// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

// E-mail sentinela usado quando o export legado não traz e-mail.
// O cadastro é completado depois, manualmente, pela equipe comercial.
pub const SENTINEL_EMAIL: &str = "sem-email@importacao.local";

// --- CLIENTE ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,

    pub legal_name: String, // Razão Social
    pub trade_name: String, // Nome Fantasia

    // CNPJ/CPF normalizado (somente dígitos). Único por cliente.
    pub document_number: String,

    pub email: String,
    pub phone: Option<String>,

    // Endereço flexível (JSONB). A importação nunca preenche isto.
    pub address: Option<Value>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dados mínimos para criar um cliente.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub legal_name: String,
    pub trade_name: String,
    pub document_number: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<Value>,
}

impl NewClient {
    /// Cliente mínimo criado pela importação: o nome que veio no arquivo
    /// vira razão social E fantasia; contatos ficam com placeholders vazios
    /// até alguém completar o cadastro.
    pub fn from_import(document_number: &str, display_name: &str) -> Self {
        Self {
            legal_name: display_name.to_string(),
            trade_name: display_name.to_string(),
            document_number: document_number.to_string(),
            email: SENTINEL_EMAIL.to_string(),
            phone: None,
            address: None,
        }
    }
}

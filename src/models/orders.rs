// src/models/orders.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Pedidos importados entram já concluídos (histórico de vendas, não carteira
// aberta) e com a tabela de preço padrão.
pub const DEFAULT_PRICE_TIER: &str = "1";
pub const DEFAULT_PAYMENT_TERMS: &str = "A combinar";

// Mapeia o CREATE TYPE order_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,     // Rascunho
    Confirmed, // Confirmado
    Completed, // Concluído
    Cancelled, // Cancelado
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub client_id: Uuid,
    pub supplier_id: Uuid,

    pub status: OrderStatus,

    // Soma dos totais de linha COMO VIERAM do arquivo (não é preço × qtd).
    pub total: f64,

    pub price_tier: String,
    pub payment_terms: String,

    // Campo livre de observações. A importação grava aqui o marcador de
    // idempotência "Protheus ID: <n>", pois não existe coluna dedicada de
    // referência externa.
    pub notes: Option<String>,

    pub issue_date: NaiveDate,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,

    pub quantity: f64,
    pub unit_price: f64,

    // `Vlr.Total` do arquivo, confiado literalmente.
    pub total: f64,
}

/// Pedido a criar, com suas linhas. Persistido como uma unidade.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub client_id: Uuid,
    pub supplier_id: Uuid,
    pub status: OrderStatus,
    pub total: f64,
    pub price_tier: String,
    pub payment_terms: String,
    pub notes: Option<String>,
    pub issue_date: NaiveDate,
    pub lines: Vec<NewOrderLine>,
}

#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: Uuid,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

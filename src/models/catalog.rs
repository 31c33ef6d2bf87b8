// src/models/catalog.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Fábrica/fornecedor padrão sob a qual a importação agrupa os produtos
// vindos do Protheus. Criada na primeira importação, se não existir.
pub const IMPORT_SUPPLIER_NAME: &str = "Importação";

// --- FÁBRICA / FORNECEDOR ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// --- PRODUTO ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub supplier_id: Uuid,

    // SKU legado, formato pontuado (ex: "11.01.04.09"). Único por fábrica.
    pub code: String,
    pub name: String,

    // As cinco tabelas de preço (faixas por volume). A importação inicializa
    // todas com o mesmo preço unitário do arquivo.
    pub price_1: f64,
    pub price_2: f64,
    pub price_3: f64,
    pub price_4: f64,
    pub price_5: f64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dados mínimos para criar um produto.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub supplier_id: Uuid,
    pub code: String,
    pub name: String,
    pub price_1: f64,
    pub price_2: f64,
    pub price_3: f64,
    pub price_4: f64,
    pub price_5: f64,
}

impl NewProduct {
    /// Produto mínimo criado pela importação, com as cinco tabelas de preço
    /// iguais ao único preço que o arquivo traz.
    pub fn from_import(supplier_id: Uuid, code: &str, name: &str, unit_price: f64) -> Self {
        Self {
            supplier_id,
            code: code.to_string(),
            name: name.to_string(),
            price_1: unit_price,
            price_2: unit_price,
            price_3: unit_price,
            price_4: unit_price,
            price_5: unit_price,
        }
    }
}

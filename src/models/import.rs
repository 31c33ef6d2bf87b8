// src/models/import.rs

// Tipos transientes do pipeline de importação: vivem só durante uma chamada
// de `import_sales_csv` e morrem quando o relatório é devolvido.

use serde::Serialize;

use crate::models::catalog::NewProduct;
use crate::models::crm::NewClient;

/// Uma linha de dados do arquivo, já endereçada por posição e aparada.
/// Campos ausentes (linha "curta") chegam como string vazia.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub order_number: String,
    pub issue_date: String,
    pub document_number: String,
    pub client_name: String,
    pub payment_terms: String,
    pub product_code: String,
    pub product_description: String,
    pub unit_price: String,
    pub quantity: String,
    pub line_total: String,
}

/// Mapa posicional das colunas do export Protheus.
///
/// O cabeçalho do arquivo tem nomes DUPLICADOS (duas colunas "Nome": cliente
/// e vendedor; duas "Descricao": condição de pagamento e produto), então
/// endereçar por nome dependeria de qual duplicata "vence". Endereçamos por
/// índice, com o layout conhecido como configuração nomeada.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub order_number: usize,
    pub issue_date: usize,
    pub document_number: usize,
    pub client_name: usize,
    pub payment_terms: usize,
    pub product_code: usize,
    pub product_description: usize,
    pub unit_price: usize,
    pub quantity: usize,
    pub line_total: usize,
}

impl Default for ColumnMap {
    /// Layout do export padrão do Protheus:
    /// 0 Filial | 1 Num.Pedido | 2 Emissao | 3 CNPJ/CPF | 4 Nome (cliente) |
    /// 5 Nome (vendedor, ignorado) | 6 Descricao (cond. pagto) | 7 Codigo |
    /// 8 Descricao (produto) | 9 Prc.Unitario | 10 Quantidade | 11 Vlr.Total
    fn default() -> Self {
        Self {
            order_number: 1,
            issue_date: 2,
            document_number: 3,
            client_name: 4,
            payment_terms: 6,
            product_code: 7,
            product_description: 8,
            unit_price: 9,
            quantity: 10,
            line_total: 11,
        }
    }
}

/// Identidade deduplicada de cliente (chave: documento normalizado).
/// Primeira ocorrência no arquivo define o nome exibido.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    pub document_number: String,
    pub display_name: String,
}

/// Identidade deduplicada de produto (chave: código legado).
/// Primeira ocorrência define nome e preço.
#[derive(Debug, Clone)]
pub struct ProductIdentity {
    pub code: String,
    pub name: String,
    pub unit_price: f64,
}

/// Registros prontos para inserir, na ordem de primeira ocorrência no
/// arquivo. Aplicado pelo store como uma unidade atômica.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationPlan {
    pub clients: Vec<NewClient>,
    pub products: Vec<NewProduct>,
}

/// Contadores da fase de reconciliação, devolvidos pelo store e fundidos no
/// relatório final (acumulador explícito, não estado mutável compartilhado).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileCounts {
    pub clients_new: usize,
    pub clients_updated: usize,
    pub products_new: usize,
}

/// Relatório devolvido ao chamador ao final da importação.
/// Sucesso parcial é um resultado normal: contadores positivos podem
/// coexistir com uma lista `errors` não vazia.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub clients_new: usize,
    pub clients_updated: usize,
    pub products_new: usize,
    pub orders_created: usize,
    pub orders_skipped: usize,
    pub errors: Vec<String>,
}

// src/services/import_service.rs

// Pipeline de importação do histórico de vendas (export Protheus):
// leitura das linhas → reconciliação de clientes e produtos → montagem de
// pedidos com checagem de idempotência → relatório.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::{
    common::error::AppError,
    common::normalize::{clean_document, parse_brl_float, parse_legacy_date},
    db::store::ImportStore,
    models::catalog::{IMPORT_SUPPLIER_NAME, NewProduct, Supplier},
    models::crm::NewClient,
    models::import::{
        ClientIdentity, ColumnMap, ImportReport, ProductIdentity, RawRow, ReconciliationPlan,
    },
    models::orders::{
        DEFAULT_PAYMENT_TERMS, DEFAULT_PRICE_TIER, NewOrder, NewOrderLine, OrderStatus,
    },
};

pub struct ImportService<S: ImportStore + ?Sized> {
    store: Arc<S>,
}

impl<S: ImportStore + ?Sized> Clone for ImportService<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

/// Resultado do processamento de um grupo de linhas (um número de pedido).
enum GroupOutcome {
    Created,
    /// O marcador de idempotência já existe no banco: reimportação.
    SkippedExisting,
    /// Nenhuma linha do grupo resolveu produto; o grupo é descartado sem
    /// mexer em contador (comportamento herdado do sistema de origem).
    DroppedEmpty,
    /// A reconciliação deveria ter garantido este cliente; a ausência é
    /// tratada como erro do relatório, não como skip normal.
    ClientMissing(String),
}

/// Acumulador explícito da fase de pedidos.
#[derive(Default)]
struct OrderPhase {
    created: usize,
    skipped: usize,
    errors: Vec<String>,
}

impl<S: ImportStore + ?Sized> ImportService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Importa um export de vendas do Protheus usando o layout padrão de
    /// colunas. Ver `import_sales_csv_with` para layout customizado.
    pub async fn import_sales_csv(&self, bytes: &[u8]) -> Result<ImportReport, AppError> {
        self.import_sales_csv_with(bytes, &ColumnMap::default()).await
    }

    pub async fn import_sales_csv_with(
        &self,
        bytes: &[u8],
        columns: &ColumnMap,
    ) -> Result<ImportReport, AppError> {
        let rows = read_rows(bytes, columns)?;
        tracing::info!("Importação Protheus: {} linhas de dados no arquivo", rows.len());

        // --- Fase 1: reconciliação de clientes e produtos (atômica) ---
        // Precisa terminar antes de qualquer pedido: a montagem dos pedidos
        // depende de todo cliente/produto já existir no banco.
        let supplier = self.ensure_import_supplier().await?;
        let plan = build_reconciliation_plan(&rows, &supplier);
        let counts = self.store.reconcile_entities(&plan).await?;
        tracing::info!(
            clients_new = counts.clients_new,
            clients_updated = counts.clients_updated,
            products_new = counts.products_new,
            "Reconciliação concluída"
        );

        // --- Fase 2: montagem dos pedidos, um grupo por vez ---
        let phase = self.build_orders(&rows, &supplier).await;
        tracing::info!(
            orders_created = phase.created,
            orders_skipped = phase.skipped,
            errors = phase.errors.len(),
            "Importação concluída"
        );

        Ok(ImportReport {
            clients_new: counts.clients_new,
            clients_updated: counts.clients_updated,
            products_new: counts.products_new,
            orders_created: phase.created,
            orders_skipped: phase.skipped,
            errors: phase.errors,
        })
    }

    /// Garante a fábrica padrão "Importação", criando-a na primeira vez.
    async fn ensure_import_supplier(&self) -> Result<Supplier, AppError> {
        if let Some(supplier) = self.store.find_supplier_by_name(IMPORT_SUPPLIER_NAME).await? {
            return Ok(supplier);
        }

        tracing::info!("Criando fábrica padrão '{}'", IMPORT_SUPPLIER_NAME);
        self.store.create_supplier(IMPORT_SUPPLIER_NAME).await
    }

    async fn build_orders(&self, rows: &[RawRow], supplier: &Supplier) -> OrderPhase {
        // Linhas sem número de pedido são descartadas sem efeito em contador.
        let mut groups: HashMap<&str, Vec<&RawRow>> = HashMap::new();
        for row in rows {
            if row.order_number.is_empty() {
                continue;
            }
            groups.entry(row.order_number.as_str()).or_default().push(row);
        }

        let mut phase = OrderPhase::default();
        for (order_number, group) in groups {
            match self
                .import_order_group(order_number, &group, supplier, &mut phase.errors)
                .await
            {
                Ok(GroupOutcome::Created) => phase.created += 1,
                Ok(GroupOutcome::SkippedExisting) => phase.skipped += 1,
                Ok(GroupOutcome::DroppedEmpty) => {
                    tracing::warn!(
                        "Pedido {}: nenhuma linha resolveu produto; grupo descartado",
                        order_number
                    );
                }
                Ok(GroupOutcome::ClientMissing(document)) => {
                    phase.errors.push(format!(
                        "Pedido {order_number}: cliente com documento '{document}' não \
                         encontrado após a reconciliação"
                    ));
                }
                // Falha local a um pedido (ex: erro de escrita) nunca aborta a
                // importação inteira.
                Err(error) => {
                    phase.errors.push(format!("Pedido {order_number}: {error}"));
                }
            }
        }

        phase
    }

    async fn import_order_group(
        &self,
        order_number: &str,
        group: &[&RawRow],
        supplier: &Supplier,
        errors: &mut Vec<String>,
    ) -> Result<GroupOutcome, AppError> {
        let marker = order_marker(order_number);
        if self.store.find_order_by_notes_marker(&marker).await?.is_some() {
            return Ok(GroupOutcome::SkippedExisting);
        }

        // O grupo nunca é vazio por construção.
        let first = group[0];

        let document = clean_document(&first.document_number);
        let Some(client) = self.store.find_client_by_document(&document).await? else {
            return Ok(GroupOutcome::ClientMissing(document));
        };

        let mut lines = Vec::new();
        for row in group {
            // Linha cujo produto não resolve é excluída em silêncio.
            let Some(product) = self.store.find_product_by_code(&row.product_code).await? else {
                tracing::debug!(
                    "Pedido {}: produto '{}' não encontrado; linha ignorada",
                    order_number,
                    row.product_code
                );
                continue;
            };

            lines.push(NewOrderLine {
                product_id: product.id,
                quantity: parse_brl_float(&row.quantity),
                unit_price: parse_brl_float(&row.unit_price),
                // Total da linha como veio no arquivo, nunca recalculado.
                total: parse_brl_float(&row.line_total),
            });
        }

        if lines.is_empty() {
            return Ok(GroupOutcome::DroppedEmpty);
        }

        let issue_date = match parse_legacy_date(&first.issue_date) {
            Some(date) => date,
            None => {
                // Fallback para hoje, mas visível no relatório: a data ruim é
                // perda de qualidade que o usuário precisa enxergar.
                let today = Utc::now().date_naive();
                tracing::warn!(
                    "Pedido {}: data de emissão '{}' inválida; usando {}",
                    order_number,
                    first.issue_date,
                    today
                );
                errors.push(format!(
                    "Pedido {order_number}: data de emissão '{}' inválida; usada a data de hoje",
                    first.issue_date
                ));
                today
            }
        };

        let payment_terms = if first.payment_terms.is_empty() {
            DEFAULT_PAYMENT_TERMS.to_string()
        } else {
            first.payment_terms.clone()
        };

        let new_order = NewOrder {
            client_id: client.id,
            supplier_id: supplier.id,
            status: OrderStatus::Completed,
            total: lines.iter().map(|line| line.total).sum(),
            price_tier: DEFAULT_PRICE_TIER.to_string(),
            payment_terms,
            notes: Some(marker),
            issue_date,
            lines,
        };

        self.store.create_order(&new_order).await?;

        Ok(GroupOutcome::Created)
    }
}

/// Marcador de idempotência gravado nas observações do pedido. É a única
/// chave de deduplicação entre reimportações do mesmo arquivo.
///
/// A checagem é busca-e-cria: duas importações CONCORRENTES do mesmo
/// arquivo podem passar as duas pela busca e gravar o pedido em duplicata.
/// A proteção contra isso fica no banco (índice único sobre o marcador) ou
/// em serializar a criação por número de pedido; dentro de uma importação,
/// os grupos são processados um por vez e o problema não ocorre.
fn order_marker(order_number: &str) -> String {
    format!("Protheus ID: {order_number}")
}

// =========================================================================
//  Leitor de linhas
// =========================================================================

/// Lê o arquivo como CSV separado por ';': uma linha de banner, uma de
/// cabeçalho (ignorado: as colunas são endereçadas por posição) e o resto
/// são dados. Tolerante a linhas "curtas" e a encoding fora de UTF-8.
/// Falha de leitura do transporte é fatal e aborta a importação inteira.
fn read_rows<R: std::io::Read>(input: R, columns: &ColumnMap) -> Result<Vec<RawRow>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut rows = Vec::new();
    for (index, result) in reader.byte_records().enumerate() {
        let record = result?;
        if index < 2 {
            continue; // banner + cabeçalho
        }
        rows.push(raw_row_from_record(&record, columns));
    }

    Ok(rows)
}

fn raw_row_from_record(record: &csv::ByteRecord, columns: &ColumnMap) -> RawRow {
    // O export legado não é UTF-8 confiável; conversão lossy por campo.
    let field = |index: usize| -> String {
        record
            .get(index)
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
            .unwrap_or_default()
    };

    RawRow {
        order_number: field(columns.order_number),
        issue_date: field(columns.issue_date),
        document_number: field(columns.document_number),
        client_name: field(columns.client_name),
        payment_terms: field(columns.payment_terms),
        product_code: field(columns.product_code),
        product_description: field(columns.product_description),
        unit_price: field(columns.unit_price),
        quantity: field(columns.quantity),
        line_total: field(columns.line_total),
    }
}

// =========================================================================
//  Deduplicação (primeira ocorrência vence)
// =========================================================================

fn dedup_clients(rows: &[RawRow]) -> Vec<ClientIdentity> {
    let mut seen = std::collections::HashSet::new();
    let mut identities = Vec::new();

    for row in rows {
        let document = clean_document(&row.document_number);
        // Linha sem documento não gera cliente.
        if document.is_empty() || !seen.insert(document.clone()) {
            continue;
        }
        identities.push(ClientIdentity {
            document_number: document,
            display_name: row.client_name.clone(),
        });
    }

    identities
}

fn dedup_products(rows: &[RawRow]) -> Vec<ProductIdentity> {
    let mut seen = std::collections::HashSet::new();
    let mut identities = Vec::new();

    for row in rows {
        if row.product_code.is_empty() || !seen.insert(row.product_code.clone()) {
            continue;
        }
        identities.push(ProductIdentity {
            code: row.product_code.clone(),
            name: row.product_description.clone(),
            unit_price: parse_brl_float(&row.unit_price),
        });
    }

    identities
}

fn build_reconciliation_plan(rows: &[RawRow], supplier: &Supplier) -> ReconciliationPlan {
    let clients = dedup_clients(rows)
        .iter()
        .map(|identity| NewClient::from_import(&identity.document_number, &identity.display_name))
        .collect();

    let products = dedup_products(rows)
        .iter()
        .map(|identity| {
            NewProduct::from_import(supplier.id, &identity.code, &identity.name, identity.unit_price)
        })
        .collect();

    ReconciliationPlan { clients, products }
}

// =========================================================================
//  Testes
// =========================================================================

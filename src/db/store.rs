// src/db/store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::catalog::{NewProduct, Product, Supplier};
use crate::models::crm::{Client, NewClient};
use crate::models::import::{ReconcileCounts, ReconciliationPlan};
use crate::models::orders::{NewOrder, Order};

// =========================================================================
//  ImportStore - fronteira de persistência do pipeline de importação
// =========================================================================
// O pipeline não depende de nenhum outro comportamento do banco: nada de
// queries cruas nem migração de schema por aqui.

#[async_trait]
pub trait ImportStore: Send + Sync {
    async fn find_client_by_document(
        &self,
        document_number: &str,
    ) -> Result<Option<Client>, AppError>;

    async fn create_client(&self, new_client: &NewClient) -> Result<Client, AppError>;

    /// Atualiza apenas o `updated_at` do cliente. Os dados cadastrais de um
    /// cliente existente (endereço, telefone...) nunca são sobrescritos
    /// pelos dados da importação.
    async fn touch_client(&self, client_id: Uuid) -> Result<(), AppError>;

    async fn find_supplier_by_name(&self, name: &str) -> Result<Option<Supplier>, AppError>;

    async fn create_supplier(&self, name: &str) -> Result<Supplier, AppError>;

    async fn find_product_by_code(&self, code: &str) -> Result<Option<Product>, AppError>;

    async fn create_product(&self, new_product: &NewProduct) -> Result<Product, AppError>;

    /// Busca um pedido cujo campo de observações contenha o marcador de
    /// idempotência ("Protheus ID: <n>").
    async fn find_order_by_notes_marker(&self, marker: &str) -> Result<Option<Order>, AppError>;

    /// Cria o pedido junto com todas as suas linhas, como uma unidade.
    async fn create_order(&self, new_order: &NewOrder) -> Result<Order, AppError>;

    /// Aplica a fase de reconciliação: busca-antes-de-criar para cada
    /// cliente e produto do plano. Cliente existente recebe só um toque no
    /// timestamp; produto existente não é alterado.
    ///
    /// A versão padrão aplica as operações em sequência, sem atomicidade.
    /// Implementações transacionais devem sobrescrever este método para
    /// garantir tudo-ou-nada na fase inteira (uma falha no meio não pode
    /// deixar clientes criados sem os produtos correspondentes).
    async fn reconcile_entities(
        &self,
        plan: &ReconciliationPlan,
    ) -> Result<ReconcileCounts, AppError> {
        let mut counts = ReconcileCounts::default();

        for new_client in &plan.clients {
            match self.find_client_by_document(&new_client.document_number).await? {
                Some(existing) => {
                    self.touch_client(existing.id).await?;
                    counts.clients_updated += 1;
                }
                None => {
                    self.create_client(new_client).await?;
                    counts.clients_new += 1;
                }
            }
        }

        for new_product in &plan.products {
            if self.find_product_by_code(&new_product.code).await?.is_none() {
                self.create_product(new_product).await?;
                counts.products_new += 1;
            }
        }

        Ok(counts)
    }
}

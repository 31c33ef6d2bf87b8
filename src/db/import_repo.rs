// src/db/import_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::ImportStore,
    models::catalog::{NewProduct, Product, Supplier},
    models::crm::{Client, NewClient},
    models::import::{ReconcileCounts, ReconciliationPlan},
    models::orders::{NewOrder, Order},
};

#[derive(Clone)]
pub struct ImportRepository {
    pool: PgPool,
}

impl ImportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn find_client_by_document_with<'e, E>(
        &self,
        executor: E,
        document_number: &str,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, legal_name, trade_name, document_number,
                   email, phone, address, created_at, updated_at
            FROM clients
            WHERE document_number = $1
            "#,
        )
        .bind(document_number)
        .fetch_optional(executor)
        .await?;

        Ok(client)
    }

    pub async fn insert_client<'e, E>(
        &self,
        executor: E,
        new_client: &NewClient,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (
                id, legal_name, trade_name, document_number,
                email, phone, address, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now())
            RETURNING id, legal_name, trade_name, document_number,
                      email, phone, address, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_client.legal_name)
        .bind(&new_client.trade_name)
        .bind(&new_client.document_number)
        .bind(&new_client.email)
        .bind(&new_client.phone)
        .bind(&new_client.address)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Tratamento de erro de chave duplicada
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "Documento '{}' já cadastrado.",
                        new_client.document_number
                    ));
                }
            }
            e.into()
        })?;

        Ok(client)
    }

    pub async fn touch_client_with<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE clients SET updated_at = now() WHERE id = $1")
            .bind(client_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    // =========================================================================
    //  FÁBRICAS / FORNECEDORES
    // =========================================================================

    pub async fn find_supplier_by_name_with<'e, E>(
        &self,
        executor: E,
        name: &str,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, created_at
            FROM suppliers
            WHERE name = $1
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(executor)
        .await?;

        Ok(supplier)
    }

    pub async fn insert_supplier<'e, E>(
        &self,
        executor: E,
        name: &str,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (id, name, created_at)
            VALUES ($1, $2, now())
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(executor)
        .await?;

        Ok(supplier)
    }

    // =========================================================================
    //  PRODUTOS
    // =========================================================================

    pub async fn find_product_by_code_with<'e, E>(
        &self,
        executor: E,
        code: &str,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, supplier_id, code, name,
                   price_1, price_2, price_3, price_4, price_5,
                   created_at, updated_at
            FROM products
            WHERE code = $1
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(executor)
        .await?;

        Ok(product)
    }

    pub async fn insert_product<'e, E>(
        &self,
        executor: E,
        new_product: &NewProduct,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                id, supplier_id, code, name,
                price_1, price_2, price_3, price_4, price_5,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), now())
            RETURNING id, supplier_id, code, name,
                      price_1, price_2, price_3, price_4, price_5,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_product.supplier_id)
        .bind(&new_product.code)
        .bind(&new_product.name)
        .bind(new_product.price_1)
        .bind(new_product.price_2)
        .bind(new_product.price_3)
        .bind(new_product.price_4)
        .bind(new_product.price_5)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "Produto com código '{}' já cadastrado.",
                        new_product.code
                    ));
                }
            }
            e.into()
        })?;

        Ok(product)
    }

    // =========================================================================
    //  PEDIDOS
    // =========================================================================

    // A busca pelo marcador não tranca nada: contra importações concorrentes
    // do mesmo arquivo, a garantia de unicidade precisa vir de um índice
    // único sobre o marcador no banco.
    pub async fn find_order_by_notes_marker_with<'e, E>(
        &self,
        executor: E,
        marker: &str,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, client_id, supplier_id, status, total,
                   price_tier, payment_terms, notes, issue_date,
                   created_at, updated_at
            FROM orders
            WHERE notes LIKE $1
            LIMIT 1
            "#,
        )
        .bind(format!("%{marker}%"))
        .fetch_optional(executor)
        .await?;

        Ok(order)
    }

    /// Insere o pedido e todas as suas linhas na mesma conexão.
    /// Quem chama decide a transação (ver `create_order` abaixo).
    pub async fn insert_order(
        &self,
        conn: &mut PgConnection,
        new_order: &NewOrder,
    ) -> Result<Order, AppError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, client_id, supplier_id, status, total,
                price_tier, payment_terms, notes, issue_date,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), now())
            RETURNING id, client_id, supplier_id, status, total,
                      price_tier, payment_terms, notes, issue_date,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_order.client_id)
        .bind(new_order.supplier_id)
        .bind(new_order.status)
        .bind(new_order.total)
        .bind(&new_order.price_tier)
        .bind(&new_order.payment_terms)
        .bind(&new_order.notes)
        .bind(new_order.issue_date)
        .fetch_one(&mut *conn)
        .await?;

        for line in &new_order.lines {
            sqlx::query(
                r#"
                INSERT INTO order_lines (id, order_id, product_id, quantity, unit_price, total)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(order.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.total)
            .execute(&mut *conn)
            .await?;
        }

        Ok(order)
    }
}

// =========================================================================
//  ImportStore sobre Postgres
// =========================================================================

#[async_trait]
impl ImportStore for ImportRepository {
    async fn find_client_by_document(
        &self,
        document_number: &str,
    ) -> Result<Option<Client>, AppError> {
        self.find_client_by_document_with(&self.pool, document_number).await
    }

    async fn create_client(&self, new_client: &NewClient) -> Result<Client, AppError> {
        self.insert_client(&self.pool, new_client).await
    }

    async fn touch_client(&self, client_id: Uuid) -> Result<(), AppError> {
        self.touch_client_with(&self.pool, client_id).await
    }

    async fn find_supplier_by_name(&self, name: &str) -> Result<Option<Supplier>, AppError> {
        self.find_supplier_by_name_with(&self.pool, name).await
    }

    async fn create_supplier(&self, name: &str) -> Result<Supplier, AppError> {
        self.insert_supplier(&self.pool, name).await
    }

    async fn find_product_by_code(&self, code: &str) -> Result<Option<Product>, AppError> {
        self.find_product_by_code_with(&self.pool, code).await
    }

    async fn create_product(&self, new_product: &NewProduct) -> Result<Product, AppError> {
        self.insert_product(&self.pool, new_product).await
    }

    async fn find_order_by_notes_marker(&self, marker: &str) -> Result<Option<Order>, AppError> {
        self.find_order_by_notes_marker_with(&self.pool, marker).await
    }

    async fn create_order(&self, new_order: &NewOrder) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;
        let order = self.insert_order(&mut *tx, new_order).await?;
        tx.commit().await?;

        Ok(order)
    }

    /// Versão transacional: a fase inteira de clientes + produtos é aplicada
    /// em tudo-ou-nada. Uma segunda importação concorrente nunca enxerga
    /// clientes criados sem os produtos correspondentes.
    async fn reconcile_entities(
        &self,
        plan: &ReconciliationPlan,
    ) -> Result<ReconcileCounts, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut counts = ReconcileCounts::default();

        for new_client in &plan.clients {
            match self
                .find_client_by_document_with(&mut *tx, &new_client.document_number)
                .await?
            {
                Some(existing) => {
                    self.touch_client_with(&mut *tx, existing.id).await?;
                    counts.clients_updated += 1;
                }
                None => {
                    self.insert_client(&mut *tx, new_client).await?;
                    counts.clients_new += 1;
                }
            }
        }

        for new_product in &plan.products {
            if self
                .find_product_by_code_with(&mut *tx, &new_product.code)
                .await?
                .is_none()
            {
                self.insert_product(&mut *tx, new_product).await?;
                counts.products_new += 1;
            }
        }

        tx.commit().await?;

        Ok(counts)
    }
}

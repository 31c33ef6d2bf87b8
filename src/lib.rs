// src/lib.rs

// Biblioteca de importação do histórico de vendas (export legado Protheus).
// A camada de rotas HTTP é quem chama `ImportService::import_sales_csv` com
// os bytes do arquivo enviado e devolve o relatório ao usuário.

pub mod common;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
//
// Erros fatais da importação (arquivo ilegível, falha na fase atômica de
// reconciliação) sobem como `AppError` para o chamador. Falhas locais a um
// pedido NÃO passam por aqui: viram strings na lista `errors` do relatório.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Arquivo CSV inválido: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Registro duplicado: {0}")]
    UniqueConstraintViolation(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

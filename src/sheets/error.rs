//! Tipos de erro para o cliente da API Google Sheets.
//!
//! Define [`SheetsError`] com variantes para credenciais inválidas, erros da
//! API e erros de rede. Usa `thiserror` para derivar `Display` e `Error`
//! automaticamente a partir dos atributos `#[error(...)]`.

use thiserror::Error;

/// Erros que podem ocorrer ao interagir com a API do Google Sheets.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Credenciais ausentes ou malformadas (fatal na inicialização).
    #[error("credentials error: {0}")]
    Credentials(String),

    /// Erro retornado pela API (ex.: 403 sem permissão, 404 planilha inexistente).
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Planilha ou aba não encontrada durante a resolução inicial.
    #[error("not found: {0}")]
    NotFound(String),

    /// A resposta da API não tinha a forma esperada.
    #[error("unexpected API response: {0}")]
    Shape(String),

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

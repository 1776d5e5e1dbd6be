//! Tipos de erro para o cliente da API Telegram Bot.
//!
//! Define [`TelegramError`] com variantes para rate limiting, erros da API,
//! timeout de envio e erros de rede. Usa `thiserror` para derivar `Display`
//! e `Error` automaticamente a partir dos atributos `#[error(...)]`.

use thiserror::Error;

/// Erros que podem ocorrer ao enviar uma mensagem pelo Telegram.
///
/// As variantes cobrem os cenários mais comuns de falha:
/// - [`RateLimited`](TelegramError::RateLimited) — o servidor retornou HTTP 429
/// - [`Api`](TelegramError::Api) — qualquer outro erro da API (4xx/5xx ou `ok: false`)
/// - [`Timeout`](TelegramError::Timeout) — o envio excedeu o limite configurado
/// - [`Network`](TelegramError::Network) — falha na camada de rede
#[derive(Debug, Error)]
pub enum TelegramError {
    /// O servidor retornou HTTP 429 (rate limit).
    /// O campo `retry_after_ms` indica quantos milissegundos esperar antes de retentar.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Erro retornado pela API (ex.: 400 chat inválido, 401 token inválido).
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// O envio não completou dentro do limite de tempo.
    #[error("send timed out after {after_secs}s")]
    Timeout { after_secs: u64 },

    /// A resposta da API não pôde ser interpretada.
    #[error("failed to parse API response: {0}")]
    Parse(String),

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    /// Encapsula o erro original do `reqwest` via `#[from]`.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

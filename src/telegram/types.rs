//! Tipos de dados para requisições e respostas da API Telegram Bot.
//!
//! Todas as structs derivam `Serialize`/`Deserialize` para conversão JSON
//! conforme o formato esperado pelo método `sendMessage` da API.

use serde::{Deserialize, Serialize};

/// Corpo da requisição para o método `sendMessage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Destino: `@username` de um bot/canal ou um chat id numérico em texto.
    pub chat_id: String,
    /// Conteúdo textual da mensagem (aqui, sempre um único link).
    pub text: String,
    /// Suprime o preview do link na mensagem enviada.
    pub disable_web_page_preview: bool,
}

/// Envelope padrão das respostas da API Bot: `ok` + `result` ou descrição do erro.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<SentMessage>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

/// Mensagem aceita pelo Telegram; o identificador entra no status da linha.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

/// Parâmetros extras em respostas de erro (ex.: `retry_after` em HTTP 429).
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseParameters {
    #[serde(default)]
    pub retry_after: Option<u64>,
}

/// Opções de envio expostas aos despachantes.
#[derive(Debug, Clone)]
pub struct SendOptions {
    pub disable_preview: bool,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            disable_preview: true,
        }
    }
}

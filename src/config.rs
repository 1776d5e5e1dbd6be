//! Configuração do relay carregada a partir de `linkrelay.toml`.
//!
//! A struct [`RelayConfig`] contém o mapeamento de colunas e os parâmetros
//! do loop de observação. Valores não presentes no arquivo usam defaults
//! sensíveis. Credenciais nunca ficam no arquivo: `SERVICE_ACCOUNT_JSON`,
//! `GOOGLE_ACCESS_TOKEN` e `TELEGRAM_BOT_TOKEN` vêm do ambiente.

use serde::Deserialize;
use std::path::Path;

use crate::error::RelayError;

/// Configuração de nível superior carregada de `linkrelay.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Id da planilha. Tem precedência sobre `spreadsheet_name` quando presente.
    #[serde(default)]
    pub spreadsheet_id: String,

    /// Nome da planilha, resolvido via Drive quando não há id.
    #[serde(default = "default_spreadsheet_name")]
    pub spreadsheet_name: String,

    /// Aba a observar; ausente usa a primeira aba.
    #[serde(default)]
    pub worksheet: Option<String>,

    /// Coluna de entrada (links).
    #[serde(default = "default_watch_column")]
    pub watch_column: String,

    /// Coluna de saída (status).
    #[serde(default = "default_status_column")]
    pub status_column: String,

    /// Coluna com a identidade do remetente (variante com quota).
    #[serde(default = "default_email_column")]
    pub email_column: String,

    /// Intervalo entre ciclos, em segundos (mínimo 1).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Destino fixo no Telegram (ex.: "@liveindexbot"). Obrigatório.
    #[serde(default)]
    pub downstream_target: String,

    /// Limite de tempo para cada envio, em segundos.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_seconds: u64,

    /// Pausa entre envios de um mesmo lote (variante com quota), em segundos.
    #[serde(default = "default_send_delay")]
    pub send_delay_seconds: u64,

    /// Espera após uma falha de ciclo antes de tentar de novo, em segundos.
    #[serde(default = "default_error_backoff")]
    pub error_backoff_seconds: u64,

    /// Planilha de quotas (variante com quota).
    #[serde(default)]
    pub quota: QuotaSheetConfig,
}

/// Localização e layout da planilha de quotas.
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaSheetConfig {
    /// Aba com o ledger de quotas.
    #[serde(default = "default_quota_worksheet")]
    pub worksheet: String,

    /// Coluna com a identidade do remetente.
    #[serde(default = "default_quota_email_column")]
    pub email_column: String,

    /// Coluna com o total permitido.
    #[serde(default = "default_quota_allowed_column")]
    pub allowed_column: String,

    /// Coluna com o total consumido (escrita por este processo).
    #[serde(default = "default_quota_used_column")]
    pub used_column: String,
}

// Defaults espelham a instalação de produção original.
fn default_spreadsheet_name() -> String {
    "sheet-bot".to_string()
}

fn default_watch_column() -> String {
    "A".to_string()
}

fn default_status_column() -> String {
    "B".to_string()
}

fn default_email_column() -> String {
    "C".to_string()
}

fn default_poll_interval() -> u64 {
    8
}

fn default_send_timeout() -> u64 {
    20
}

fn default_send_delay() -> u64 {
    2
}

fn default_error_backoff() -> u64 {
    30
}

fn default_quota_worksheet() -> String {
    "Quota".to_string()
}

fn default_quota_email_column() -> String {
    "A".to_string()
}

fn default_quota_allowed_column() -> String {
    "B".to_string()
}

fn default_quota_used_column() -> String {
    "C".to_string()
}

impl Default for QuotaSheetConfig {
    fn default() -> Self {
        Self {
            worksheet: default_quota_worksheet(),
            email_column: default_quota_email_column(),
            allowed_column: default_quota_allowed_column(),
            used_column: default_quota_used_column(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            spreadsheet_name: default_spreadsheet_name(),
            worksheet: None,
            watch_column: default_watch_column(),
            status_column: default_status_column(),
            email_column: default_email_column(),
            poll_interval_seconds: default_poll_interval(),
            downstream_target: String::new(),
            send_timeout_seconds: default_send_timeout(),
            send_delay_seconds: default_send_delay(),
            error_backoff_seconds: default_error_backoff(),
            quota: QuotaSheetConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Carrega a configuração do caminho dado, ou de `linkrelay.toml` no
    /// diretório atual. Usa valores padrão se o arquivo não existir.
    pub fn load(path: Option<&Path>) -> Result<Self, RelayError> {
        let path = path.unwrap_or_else(|| Path::new("linkrelay.toml"));
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<RelayConfig>(&contents)?)
    }

    /// Valida o que é fatal na inicialização: destino obrigatório e
    /// intervalo mínimo de 1 segundo.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.downstream_target.trim().is_empty() {
            return Err(RelayError::Config(
                "downstream_target must be set (e.g. \"@liveindexbot\")".into(),
            ));
        }
        if self.poll_interval_seconds < 1 {
            return Err(RelayError::Config(
                "poll_interval_seconds must be at least 1".into(),
            ));
        }
        if self.spreadsheet_id.trim().is_empty() && self.spreadsheet_name.trim().is_empty() {
            return Err(RelayError::Config(
                "one of spreadsheet_id or spreadsheet_name must be set".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = RelayConfig::default();
        assert_eq!(config.spreadsheet_name, "sheet-bot");
        assert_eq!(config.watch_column, "A");
        assert_eq!(config.status_column, "B");
        assert_eq!(config.poll_interval_seconds, 8);
        assert_eq!(config.send_timeout_seconds, 20);
        assert_eq!(config.send_delay_seconds, 2);
        assert_eq!(config.quota.worksheet, "Quota");
        assert!(config.downstream_target.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            downstream_target = "@liveindexbot"
            poll_interval_seconds = 15

            [quota]
            worksheet = "Allowances"
        "#;
        let config: RelayConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.downstream_target, "@liveindexbot");
        assert_eq!(config.poll_interval_seconds, 15);
        assert_eq!(config.quota.worksheet, "Allowances");
        // Campos omitidos mantêm os defaults.
        assert_eq!(config.watch_column, "A");
        assert_eq!(config.quota.allowed_column, "B");
    }

    #[test]
    fn load_falls_back_to_defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = RelayConfig::load(Some(&dir.path().join("linkrelay.toml"))).unwrap();
        assert_eq!(config.poll_interval_seconds, 8);
    }

    #[test]
    fn load_reads_file_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linkrelay.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "downstream_target = \"@liveindexbot\"").unwrap();
        writeln!(file, "spreadsheet_id = \"abc123\"").unwrap();

        let config = RelayConfig::load(Some(&path)).unwrap();
        assert_eq!(config.downstream_target, "@liveindexbot");
        assert_eq!(config.spreadsheet_id, "abc123");
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linkrelay.toml");
        std::fs::write(&path, "downstream_target = [not toml").unwrap();
        assert!(matches!(
            RelayConfig::load(Some(&path)),
            Err(RelayError::Toml(_))
        ));
    }

    #[test]
    fn validate_requires_target() {
        let config = RelayConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("downstream_target"));
    }

    #[test]
    fn validate_requires_positive_interval() {
        let config = RelayConfig {
            downstream_target: "@liveindexbot".into(),
            poll_interval_seconds: 0,
            ..RelayConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("poll_interval_seconds"));
    }

    #[test]
    fn validate_accepts_minimal_config() {
        let config = RelayConfig {
            downstream_target: "@liveindexbot".into(),
            ..RelayConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}

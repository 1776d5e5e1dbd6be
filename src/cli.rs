//! Interface de linha de comando do relay baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (watch, quota, scan)
//! e flags globais (--config, --interval, --verbose).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// linkrelay — Observa uma planilha e repassa links ao Telegram.
#[derive(Debug, Parser)]
#[command(name = "linkrelay", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração (padrão: ./linkrelay.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Sobrescreve o intervalo de polling, em segundos.
    #[arg(long, global = true)]
    pub interval: Option<u64>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Observa a planilha e envia o primeiro link de cada linha nova.
    Watch,

    /// Observa a planilha aplicando quotas por remetente (lotes de links).
    Quota,

    /// Lê a planilha uma vez e imprime um resumo por status.
    Scan,
}

//! Interface de terminal do relay — spinner e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner do loop de observação e
//! `console` para estilização com cores. A planilha continua sendo a
//! superfície de status autoritativa; tudo aqui é apenas diagnóstico.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::monitor::{CycleStats, ScanSummary};

/// Indicador visual do loop de observação no terminal.
///
/// Exibe um spinner animado entre ciclos e linhas coloridas por resultado:
/// verde para envios, vermelho para falhas, amarelo para avisos.
pub struct WatchProgress {
    // Spinner do indicatif; em modo oculto nada é desenhado.
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
    dim: Style,
}

impl WatchProgress {
    /// Inicia o spinner com a mensagem do banner e retorna a instância.
    pub fn start(banner: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(banner.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self::with_bar(pb)
    }

    /// Instância silenciosa para os testes do monitor.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(pb: ProgressBar) -> Self {
        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
        }
    }

    /// Atualiza a mensagem do spinner (ex.: "dormindo 8s").
    pub fn set_status(&self, message: String) {
        self.pb.set_message(message);
    }

    /// Linha verde: envio concluído.
    pub fn sent(&self, detail: String) {
        self.pb
            .println(format!("  {} {detail}", self.green.apply_to("✓")));
    }

    /// Linha vermelha: falha registrada na planilha ou no protocolo.
    pub fn error(&self, detail: String) {
        self.pb
            .println(format!("  {} {detail}", self.red.apply_to("✗")));
    }

    /// Linha amarela: aviso (claim perdido, quota esgotada, diagnóstico).
    pub fn warn(&self, detail: String) {
        self.pb
            .println(format!("  {} {detail}", self.yellow.apply_to("↻")));
    }

    /// Linha apagada: detalhe visível apenas em modo verbose.
    pub fn note(&self, detail: String) {
        self.pb.println(format!("  {}", self.dim.apply_to(detail)));
    }

    /// Resumo de um ciclo com atividade.
    pub fn cycle_summary(&self, stats: &CycleStats) {
        self.pb.println(format!(
            "  {} {} rows: {} sent, {} errored, {} limited, {} abandoned",
            self.dim.apply_to("cycle:"),
            stats.scanned,
            stats.sent,
            stats.errored,
            stats.limited,
            stats.abandoned,
        ));
    }

    /// Falha do ciclo inteiro (planilha inacessível); o monitor fará backoff.
    pub fn cycle_error(&self, error: String, backoff_secs: u64) {
        self.pb.println(format!(
            "  {} cycle failed: {error} (retrying in {backoff_secs}s)",
            self.red.apply_to("✗")
        ));
    }
}

/// Imprime o resumo do comando `scan` com contagens coloridas por status.
pub fn print_scan_summary(worksheet: &str, summary: &ScanSummary) {
    let bold = Style::new().bold();
    let green = Style::new().green();
    let red = Style::new().red();
    let yellow = Style::new().yellow();
    let dim = Style::new().dim();

    println!("{}", bold.apply_to(format!("─── '{worksheet}' ({} rows) ───", summary.rows)));
    println!("  pending:  {}", bold.apply_to(summary.pending));
    println!("  claimed:  {}", yellow.apply_to(summary.claimed));
    println!("  sent:     {}", green.apply_to(summary.sent));
    println!("  errored:  {}", red.apply_to(summary.errored));
    println!("  limited:  {}", yellow.apply_to(summary.limited));
    println!("  blank:    {}", dim.apply_to(summary.blank));
}

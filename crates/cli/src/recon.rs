//! `scoreline run` / `scoreline validate` — config-driven score reconciliation.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use scoreline_recon::{ReconConfig, ReconOptions, ReconResult, TraceMode};

use crate::exit_codes::{
    EXIT_ERROR, EXIT_RECON_INVALID_CONFIG, EXIT_RECON_MISMATCH, EXIT_RECON_RUNTIME,
};
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Reconcile provider scores against match events from a TOML config file
    #[command(after_help = "\
Examples:
  scoreline run matchday.recon.toml
  scoreline run matchday.recon.toml --json
  scoreline run matchday.recon.toml --output result.json
  SCORELINE_DEV=1 scoreline run matchday.recon.toml --parallel")]
    Run {
        /// Path to the .recon.toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Trace every reconciliation decision (also: SCORELINE_DEV=1)
        #[arg(long)]
        dev: bool,

        /// Reconcile matches in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  scoreline validate matchday.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run { config, json, output, dev, parallel } => {
            cmd_recon_run(config, json, output, dev, parallel)
        }
        ReconCommands::Validate { config } => cmd_recon_validate(config),
    }
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn load_config(config_path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("cannot read config: {e}")))?;

    ReconConfig::from_toml(&config_str).map_err(|e| CliError {
        code: EXIT_RECON_INVALID_CONFIG,
        message: e.to_string(),
        hint: Some(format!("check {} against the recon config format", config_path.display())),
    })
}

/// Config options with CLI flags and `SCORELINE_DEV` layered on top.
fn effective_options(config: &ReconConfig, dev: bool, parallel: bool) -> ReconOptions {
    let base = config.options();
    ReconOptions {
        parallel: base.parallel || parallel,
        trace: base.trace.or(TraceMode::from_flag(dev)).or(TraceMode::from_env()),
    }
}

fn cmd_recon_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    dev: bool,
    parallel: bool,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let options = effective_options(&config, dev, parallel);
    log::debug!("recon options: {options:?}");

    // Resolve input paths relative to the config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let input = scoreline_recon::engine::load_input(&config, base_dir)
        .map_err(|e| recon_err(EXIT_RECON_RUNTIME, e.to_string()))?;

    let result = scoreline_recon::run_with(&config.name, &input, &options);

    // Output
    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| recon_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    print_summary(&result);

    if config.fail_on_mismatch && result.summary.mismatches > 0 {
        return Err(recon_err(EXIT_RECON_MISMATCH, "score mismatches found"));
    }

    Ok(())
}

/// Human summary to stderr.
fn print_summary(result: &ReconResult) {
    let s = &result.summary;
    eprintln!(
        "{}: {} matches, {} mismatches, {} duplicate events, {} orphan events",
        result.meta.config_name, s.total_matches, s.mismatches, s.duplicate_events, s.orphan_events,
    );
    for (source, count) in &s.source_counts {
        if *count > 0 {
            eprintln!("  {source:<22} {count}");
        }
    }
    for m in result.matches.iter().filter(|m| m.score_mismatch) {
        eprintln!(
            "  mismatch {}: provider {}-{}, events {}-{}",
            m.record.id,
            score_label(m.record.home_score),
            score_label(m.record.away_score),
            m.event_score_home,
            m.event_score_away,
        );
    }
}

fn score_label(score: Option<u32>) -> String {
    score.map_or_else(|| "?".to_string(), |s| s.to_string())
}

fn cmd_recon_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    // Already checked by validate()
    let matches_format = config
        .inputs
        .matches
        .resolved_format()
        .map_err(|e| recon_err(EXIT_RECON_INVALID_CONFIG, e.to_string()))?;
    let events_format = config
        .inputs
        .events
        .resolved_format()
        .map_err(|e| recon_err(EXIT_RECON_INVALID_CONFIG, e.to_string()))?;

    eprintln!(
        "ok: \"{}\" (matches: {} [{}], events: {} [{}])",
        config.name,
        config.inputs.matches.file,
        matches_format,
        config.inputs.events.file,
        events_format,
    );
    Ok(())
}

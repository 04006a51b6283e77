//! autoerase command-line runner.

#![forbid(unsafe_code)]

mod cli_config;

use std::sync::Arc;

use autoerase_application::{RetentionRunService, RunOutcome, RunReport, StepStatus};
use autoerase_core::AppError;
use autoerase_infrastructure::SynapseAdminClient;
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use crate::cli_config::{CliArgs, CliConfig, init_tracing};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = CliArgs::parse();
    let config = CliConfig::load(&args)?;
    let policy = config.retention_policy()?;
    let client = Arc::new(SynapseAdminClient::new(
        config.host.as_str(),
        config.token.as_str(),
    )?);

    info!(
        host = %config.host,
        retention_days = policy.retention_days(),
        dry_run = policy.dry_run(),
        redact = policy.redact_on_erase(),
        excluded_prefixes = policy.rules().excluded_prefixes().len(),
        "autoerase started"
    );

    let report = RetentionRunService::new(client.clone(), client)
        .run(&policy, Utc::now())
        .await;
    log_report(&report);

    Ok(())
}

fn log_report(report: &RunReport) {
    match &report.outcome {
        RunOutcome::NoEligibleAccounts => {
            info!(loaded_accounts = report.loaded_accounts, "run finished, nothing to erase");
        }
        RunOutcome::Previewed(entries) => {
            info!(
                loaded_accounts = report.loaded_accounts,
                previewed_accounts = entries.len(),
                "dry run finished"
            );
        }
        RunOutcome::Erased(summary) => {
            for outcome in summary.outcomes.iter().filter(|outcome| !outcome.is_complete()) {
                warn!(
                    account = %outcome.account_name,
                    deactivation = %outcome.deactivation.as_str(),
                    media_deletion = %outcome.media_deletion.as_str(),
                    redaction = %outcome.redaction.as_ref().map_or("disabled", StepStatus::as_str),
                    "account was not fully erased"
                );
            }

            info!(
                loaded_accounts = report.loaded_accounts,
                eligible_accounts = report.eligible_accounts,
                fully_erased = summary.fully_erased(),
                partially_erased = summary.partially_erased(),
                failed = summary.failed(),
                deleted_media = summary.deleted_media(),
                "erasure run finished"
            );
        }
    }
}

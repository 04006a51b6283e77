use std::env;

use autoerase_core::{AppError, AppResult, NonEmptyString};
use autoerase_domain::{ExcludedPrefixes, RetentionPolicy};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Command-line flags. Each one overrides its environment variable.
#[derive(Parser, Debug, Default)]
#[command(
    version,
    about = "Erase Synapse accounts older than a retention window",
    long_about = None
)]
pub struct CliArgs {
    /// Only print the accounts that would be erased (overrides SUAE_DRYRUN)
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub dryrun: Option<bool>,

    /// Redact all messages sent by erased accounts (overrides SUAE_REDACT)
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub redact: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub host: String,
    pub token: String,
    pub ttl_days: u32,
    pub dry_run: bool,
    pub redact: bool,
    pub prefixes: Vec<String>,
}

impl CliConfig {
    pub fn load(args: &CliArgs) -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok(), args)
    }

    fn from_lookup<F>(lookup: F, args: &CliArgs) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = required_non_empty(&lookup, "SUAE_HOST")?
            .trim_end_matches('/')
            .to_owned();
        let token = required_non_empty(&lookup, "SUAE_TOKEN")?;
        let ttl_days = parse_ttl(&lookup, "SUAE_TTL")?;
        let dry_run = match args.dryrun {
            Some(value) => value,
            None => parse_bool(&lookup, "SUAE_DRYRUN", false)?,
        };
        let redact = match args.redact {
            Some(value) => value,
            None => parse_bool(&lookup, "SUAE_REDACT", false)?,
        };
        let prefixes = lookup("SUAE_PREFIXES")
            .map(|value| split_list(value.as_str()))
            .unwrap_or_default();

        Ok(Self {
            host,
            token,
            ttl_days,
            dry_run,
            redact,
            prefixes,
        })
    }

    pub fn retention_policy(&self) -> AppResult<RetentionPolicy> {
        RetentionPolicy::new(
            self.ttl_days,
            ExcludedPrefixes::with_operator_prefixes(&self.prefixes),
            self.dry_run,
            self.redact,
        )
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty<F>(lookup: &F, name: &str) -> AppResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    NonEmptyString::new(value.trim())
        .map(String::from)
        .map_err(|_| AppError::Validation(format!("{name} must not be empty")))
}

fn parse_ttl<F>(lookup: &F, name: &str) -> AppResult<u32>
where
    F: Fn(&str) -> Option<String>,
{
    let value = required_non_empty(lookup, name)?;
    let days = value.parse::<i64>().map_err(|error| {
        AppError::Validation(format!("invalid {name} value '{value}': {error}"))
    })?;
    if days <= 0 {
        return Err(AppError::Validation(format!(
            "{name} must be greater than zero"
        )));
    }

    u32::try_from(days)
        .map_err(|_| AppError::Validation(format!("{name} value '{value}' is too large")))
}

fn parse_bool<F>(lookup: &F, name: &str, default: bool) -> AppResult<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name).filter(|value| !value.trim().is_empty()) else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "invalid {name} value '{value}': expected true or false"
        ))),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(|character: char| character == ',' || character.is_whitespace())
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

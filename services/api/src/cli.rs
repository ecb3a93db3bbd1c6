use crate::report::{run_quota_mapping, run_quota_summary, run_quota_validate};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fund_quota::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Fund Quota Service",
    about = "Resolve research-fund budget tiers and per-user quotas from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect budget tiers and quota usage against a record snapshot
    Quota {
        #[command(subcommand)]
        command: QuotaCommand,
    },
}

#[derive(Subcommand, Debug)]
enum QuotaCommand {
    /// Print the per-tier availability table for a subcategory
    Mapping(MappingArgs),
    /// Validate a single tier claim for a subcategory
    Validate(ValidateArgs),
    /// List the heaviest quota consumers
    Summary(SummaryArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Directory holding the CSV record snapshot
    #[arg(long)]
    pub(crate) snapshot_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct MappingArgs {
    /// Subcategory whose budget lines are mapped
    #[arg(long)]
    pub(crate) subcategory_id: i64,
    /// Reward-rate year (falls back to the global rates when absent)
    #[arg(long)]
    pub(crate) year: Option<String>,
    /// Author status used to price each tier
    #[arg(long)]
    pub(crate) author_status: Option<String>,
    /// Map only the tiers named by the reward-rate table
    #[arg(long)]
    pub(crate) configured: bool,
    /// Directory holding the CSV record snapshot
    #[arg(long)]
    pub(crate) snapshot_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Subcategory the claim is made against
    #[arg(long)]
    pub(crate) subcategory_id: i64,
    /// Claimed tier, e.g. Q1, T5 or "top 10%"
    #[arg(long)]
    pub(crate) code: String,
    /// Reward-rate year
    #[arg(long)]
    pub(crate) year: Option<String>,
    /// Author status used to price the claim
    #[arg(long)]
    pub(crate) author_status: Option<String>,
    /// Directory holding the CSV record snapshot
    #[arg(long)]
    pub(crate) snapshot_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// Comma-separated year ids (all years when omitted)
    #[arg(long, value_delimiter = ',')]
    pub(crate) year_ids: Vec<i64>,
    /// Restrict to one subcategory
    #[arg(long)]
    pub(crate) subcategory_id: Option<i64>,
    /// Restrict to one user
    #[arg(long)]
    pub(crate) user_id: Option<i64>,
    /// Override the configured row limit
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Directory holding the CSV record snapshot
    #[arg(long)]
    pub(crate) snapshot_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Quota {
            command: QuotaCommand::Mapping(args),
        } => run_quota_mapping(args),
        Command::Quota {
            command: QuotaCommand::Validate(args),
        } => run_quota_validate(args),
        Command::Quota {
            command: QuotaCommand::Summary(args),
        } => run_quota_summary(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_accepts_comma_separated_years() {
        let cli = Cli::try_parse_from([
            "fund-quota-api",
            "quota",
            "summary",
            "--year-ids",
            "2567,2568",
            "--limit",
            "5",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Quota {
                command: QuotaCommand::Summary(args),
            }) => {
                assert_eq!(args.year_ids, vec![2567, 2568]);
                assert_eq!(args.limit, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn validate_requires_a_code() {
        let result = Cli::try_parse_from([
            "fund-quota-api",
            "quota",
            "validate",
            "--subcategory-id",
            "10",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["fund-quota-api"]).expect("parses");
        assert!(cli.command.is_none());
    }
}

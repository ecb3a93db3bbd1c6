use crate::cli::{MappingArgs, SummaryArgs, ValidateArgs};
use crate::infra::load_store;
use chrono::{Local, NaiveDate};
use fund_quota::config::AppConfig;
use fund_quota::error::AppError;
use fund_quota::workflows::budget::{
    available_reward_total, BudgetQuotaService, BudgetValidationReport, MappingMode,
    QuotaSummaryRow, TierAvailability, UsageScope,
};
use fund_quota::workflows::snapshot::SnapshotStore;
use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;

fn quota_service(
    snapshot_dir: Option<PathBuf>,
    configure: impl FnOnce(&mut AppConfig),
) -> Result<BudgetQuotaService<SnapshotStore>, AppError> {
    let mut config = AppConfig::load()?;
    configure(&mut config);
    let store = load_store(&config.quota, snapshot_dir)?;
    Ok(BudgetQuotaService::new(Arc::new(store), config.quota.policy))
}

pub(crate) fn run_quota_mapping(args: MappingArgs) -> Result<(), AppError> {
    let MappingArgs {
        subcategory_id,
        year,
        author_status,
        configured,
        snapshot_dir,
    } = args;

    let service = quota_service(snapshot_dir, |config| {
        if configured {
            config.quota.policy.mapping_mode = MappingMode::Configured;
        }
    })?;
    let mapping = service.mapping(subcategory_id, year.as_deref(), author_status.as_deref())?;
    let report = BudgetValidationReport::from_mapping(subcategory_id, &mapping);

    print!(
        "{}",
        render_mapping(subcategory_id, &mapping, &report, Local::now().date_naive())
    );
    Ok(())
}

pub(crate) fn run_quota_validate(args: ValidateArgs) -> Result<(), AppError> {
    let ValidateArgs {
        subcategory_id,
        code,
        year,
        author_status,
        snapshot_dir,
    } = args;

    let service = quota_service(snapshot_dir, |_| {})?;
    let resolved = service.validate(
        subcategory_id,
        &code,
        year.as_deref(),
        author_status.as_deref(),
    )?;

    println!(
        "Claim '{}' for subcategory {} resolves to budget {} ({})",
        code.trim(),
        subcategory_id,
        resolved.budget_id,
        resolved.code
    );
    println!("  Description : {}", resolved.description);
    println!("  Reward      : {}", resolved.reward_amount);
    println!("  Remaining   : {}", resolved.remaining_budget);
    Ok(())
}

pub(crate) fn run_quota_summary(args: SummaryArgs) -> Result<(), AppError> {
    let SummaryArgs {
        year_ids,
        subcategory_id,
        user_id,
        limit,
        snapshot_dir,
    } = args;

    let service = quota_service(snapshot_dir, |config| {
        if let Some(limit) = limit.filter(|limit| *limit > 0) {
            config.quota.policy.summary_limit = limit;
        }
    })?;
    let scope = UsageScope {
        year_ids,
        subcategory_id,
        user_id,
    };
    let rows = service.quota_summary(&scope)?;
    let tally = service.status_tally(&scope)?;

    print!("{}", render_summary(&rows, Local::now().date_naive()));
    println!(
        "Submissions: {} approved, {} pending, {} rejected, {} other",
        tally.approved, tally.pending, tally.rejected, tally.other
    );
    Ok(())
}

pub(crate) fn render_mapping(
    subcategory_id: i64,
    mapping: &[TierAvailability],
    report: &BudgetValidationReport,
    today: NaiveDate,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Budget tiers for subcategory {} (as of {})",
        subcategory_id, today
    );
    for entry in mapping {
        let marker = if entry.is_available { "+" } else { "-" };
        let budget = if entry.budget_id > 0 {
            entry.budget_id.to_string()
        } else {
            "none".to_string()
        };
        let _ = writeln!(
            out,
            "  {} {:<4} budget {:<6} reward {:>10} remaining {:>12}  {}",
            marker,
            entry.code.as_str(),
            budget,
            entry.reward_amount,
            entry.remaining_budget,
            entry.description
        );
    }
    let _ = writeln!(
        out,
        "Available {}/{}; reward total {}",
        report.budget_count,
        report.expected_count,
        available_reward_total(mapping)
    );
    if !report.missing_budgets.is_empty() {
        let missing: Vec<&str> = report.missing_budgets.iter().map(|code| code.as_str()).collect();
        let _ = writeln!(out, "Missing: {}", missing.join(", "));
    }
    out
}

pub(crate) fn render_summary(rows: &[QuotaSummaryRow], today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Quota usage summary (as of {})", today);
    if rows.is_empty() {
        let _ = writeln!(out, "  no usage recorded");
        return out;
    }
    for row in rows {
        let _ = writeln!(
            out,
            "  year {} user {:<6} {} / {}: used {} of {} (remaining {}), grants {}/{}",
            row.year_id,
            row.user_id,
            row.category_name,
            row.subcategory_name,
            row.used_amount,
            row.allocated_amount,
            row.remaining_budget,
            row.used_grants,
            row.max_grants
        );
    }
    out
}

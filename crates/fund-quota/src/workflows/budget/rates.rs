use super::domain::{RewardRate, TierCode};
use super::normalizer::{canonical_tier, normalize_tier};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Price a tier from the active reward rates.
///
/// With an author status only that status's rates count; without one the
/// highest configured amount is used. `None` means no rate exists at all.
pub fn price_for_tier(
    rates: &[RewardRate],
    code: TierCode,
    author_status: Option<&str>,
) -> Option<Decimal> {
    let author_status = author_status
        .map(str::trim)
        .filter(|status| !status.is_empty());

    rates
        .iter()
        .filter(|rate| rate.is_active)
        .filter(|rate| canonical_tier(&rate.journal_quartile) == Some(code))
        .filter(|rate| {
            author_status.map_or(true, |status| {
                rate.author_status.trim().eq_ignore_ascii_case(status)
            })
        })
        .map(|rate| rate.amount)
        .max()
}

/// Tiers that the active rate configuration declares, in presentation order.
pub fn configured_tiers(rates: &[RewardRate]) -> Vec<TierCode> {
    let mut declared = BTreeSet::new();
    for rate in rates.iter().filter(|rate| rate.is_active) {
        match normalize_tier(&rate.journal_quartile).canonical() {
            Some(code) => {
                declared.insert(code);
            }
            None => debug!(
                quartile = %rate.journal_quartile,
                "reward rate does not name a canonical tier; skipped"
            ),
        }
    }

    TierCode::ordered()
        .into_iter()
        .filter(|code| declared.contains(code))
        .collect()
}

/// Rate set effective for a year.
///
/// The year's own active rows win. Every (tier, author status) pair the year
/// leaves uncovered takes the active rows of the most recent year that prices
/// it. With no year rows at all this is simply the latest rate per pair.
pub fn rates_with_fallback(
    year_rates: &[RewardRate],
    all_rates: &[RewardRate],
) -> Vec<RewardRate> {
    let mut effective: Vec<RewardRate> = year_rates
        .iter()
        .filter(|rate| rate.is_active)
        .cloned()
        .collect();
    let covered: BTreeSet<RateKey> = effective.iter().map(rate_key).collect();

    let mut latest: BTreeMap<RateKey, Vec<RewardRate>> = BTreeMap::new();
    for rate in all_rates.iter().filter(|rate| rate.is_active) {
        let key = rate_key(rate);
        if covered.contains(&key) {
            continue;
        }

        let rows = latest.entry(key).or_default();
        match rows.first().map(|held| compare_years(&rate.year, &held.year)) {
            None | Some(Ordering::Equal) => rows.push(rate.clone()),
            Some(Ordering::Greater) => *rows = vec![rate.clone()],
            Some(Ordering::Less) => {}
        }
    }

    for rows in latest.into_values() {
        effective.extend(rows);
    }
    effective
}

type RateKey = (String, String);

fn rate_key(rate: &RewardRate) -> RateKey {
    (
        normalize_tier(&rate.journal_quartile).as_str().to_string(),
        rate.author_status.trim().to_ascii_lowercase(),
    )
}

/// Numeric years compare numerically and rank above anything unparseable.
fn compare_years(left: &str, right: &str) -> Ordering {
    let (left, right) = (left.trim(), right.trim());
    match (left.parse::<i64>(), right.parse::<i64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

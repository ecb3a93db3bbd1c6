use super::domain::{NormalizedTier, TierCode};
use std::collections::HashMap;
use std::sync::OnceLock;

static TIER_SYNONYMS: OnceLock<HashMap<String, TierCode>> = OnceLock::new();

/// Canonicalize a raw tier label.
///
/// Input is trimmed and uppercased; canonical spellings pass through, known
/// variants map via the synonym table and anything else is echoed back as
/// [`NormalizedTier::Unrecognized`]. `normalize(normalize(x)) == normalize(x)`.
pub fn normalize_tier(raw: &str) -> NormalizedTier {
    let cleaned = raw.trim().to_uppercase();

    if let Some(code) = TierCode::from_code(&cleaned) {
        return NormalizedTier::Canonical(code);
    }

    match tier_synonyms().get(&compact(&cleaned)) {
        Some(code) => NormalizedTier::Canonical(*code),
        None => NormalizedTier::Unrecognized(cleaned),
    }
}

/// Convenience for call sites that only care about canonical codes.
pub fn canonical_tier(raw: &str) -> Option<TierCode> {
    normalize_tier(raw).canonical()
}

// Separators and the full-width percent sign are dropped so that "TOP 5%",
// "TOP-5%" and "TOP_5_PERCENT" all share one key.
fn compact(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_whitespace() && !matches!(ch, '-' | '_'))
        .map(|ch| if ch == '\u{ff05}' { '%' } else { ch })
        .collect()
}

fn tier_synonyms() -> &'static HashMap<String, TierCode> {
    TIER_SYNONYMS.get_or_init(|| {
        const SYNONYMS: &[(&str, TierCode)] = &[
            // Top 5 percent
            ("TOP5", TierCode::T5),
            ("TOP5%", TierCode::T5),
            ("TOP5PERCENT", TierCode::T5),
            ("TOP5PCT", TierCode::T5),
            ("T5%", TierCode::T5),
            // Top 10 percent
            ("TOP10", TierCode::T10),
            ("TOP10%", TierCode::T10),
            ("TOP10PERCENT", TierCode::T10),
            ("TOP10PCT", TierCode::T10),
            ("T10%", TierCode::T10),
            // Not applicable
            ("NA", TierCode::NotApplicable),
            ("N/A", TierCode::NotApplicable),
            ("NOTAPPLICABLE", TierCode::NotApplicable),
        ];

        let mut map = HashMap::with_capacity(SYNONYMS.len());
        for (variant, code) in SYNONYMS {
            map.insert(compact(variant), *code);
        }
        map
    })
}

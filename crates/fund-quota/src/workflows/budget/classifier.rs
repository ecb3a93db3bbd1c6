use super::domain::TierCode;

const QUARTILE_SPELLINGS: &[&str] = &[
    "\u{0e04}\u{0e27}\u{0e2d}\u{0e23}\u{0e4c}\u{0e44}\u{0e17}\u{0e25}\u{0e4c}", // ควอร์ไทล์
    "\u{0e04}\u{0e27}\u{0e2d}\u{0e44}\u{0e17}\u{0e25}\u{0e4c}",                 // ควอไทล์
    "\u{0e04}\u{0e27}\u{0e2d}\u{0e17}\u{0e44}\u{0e17}\u{0e25}\u{0e4c}",         // ควอทไทล์
    "\u{0e04}\u{0e27}\u{0e2d}\u{0e15}\u{0e44}\u{0e17}\u{0e25}\u{0e4c}",         // ควอตไทล์
];

/// Infer a tier from a free-text fund description.
///
/// Percentile wording is checked before quartile numbers because real
/// descriptions read like "quartile 1 (top 5%)". Returns `None` when nothing
/// matches; callers exclude such lines rather than defaulting them.
pub fn classify_description(description: &str) -> Option<TierCode> {
    let text = prepare(description);
    if text.is_empty() {
        return None;
    }

    if has_percentile(&text, "5") {
        return Some(TierCode::T5);
    }
    if has_percentile(&text, "10") {
        return Some(TierCode::T10);
    }

    for (digit, code) in [
        ('1', TierCode::Q1),
        ('2', TierCode::Q2),
        ('3', TierCode::Q3),
        ('4', TierCode::Q4),
    ] {
        if has_quartile(&text, digit) {
            return Some(code);
        }
    }

    if text.contains("tci") {
        return Some(TierCode::Tci);
    }

    None
}

// Lowercase, fold typographic variants and the localized quartile spellings,
// then collapse whitespace so the checks below only see one form.
fn prepare(description: &str) -> String {
    let mut text = description.to_lowercase().replace('\u{ff05}', "%");
    for spelling in QUARTILE_SPELLINGS {
        text = text.replace(spelling, " quartile ");
    }
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace(" %", "%")
}

// The number must stand alone: "15%" and "2.5%" are not "5%".
fn has_percentile(text: &str, number: &str) -> bool {
    find_bounded(text, &format!("{number}%"), digit_or_point, never)
        || find_bounded(text, &format!("top {number}"), alphanumeric, digit_or_point)
}

fn has_quartile(text: &str, digit: char) -> bool {
    find_bounded(text, &format!("quartile {digit}"), never, ascii_digit)
        || find_bounded(text, &format!("quartile{digit}"), never, ascii_digit)
        || find_bounded(text, &format!("q{digit}"), alphanumeric, alphanumeric)
}

/// True when `needle` occurs with neither neighbour rejected by its predicate.
fn find_bounded(
    text: &str,
    needle: &str,
    reject_before: fn(char) -> bool,
    reject_after: fn(char) -> bool,
) -> bool {
    text.match_indices(needle).any(|(start, matched)| {
        let before_ok = text[..start]
            .chars()
            .next_back()
            .map_or(true, |ch| !reject_before(ch));
        let after_ok = text[start + matched.len()..]
            .chars()
            .next()
            .map_or(true, |ch| !reject_after(ch));
        before_ok && after_ok
    })
}

fn digit_or_point(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '.'
}

fn ascii_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn alphanumeric(ch: char) -> bool {
    ch.is_alphanumeric()
}

fn never(_: char) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_signals_win_over_quartile_numbers() {
        assert_eq!(
            classify_description("Quartile 1, Top 5%"),
            Some(TierCode::T5)
        );
        assert_eq!(
            classify_description(
                "บทความตีพิมพ์ในวารสารระดับนานาชาติ ควอไทล์ 1 (ลำดับ 10% แรก)"
            ),
            Some(TierCode::T10)
        );
    }

    #[test]
    fn localized_quartile_spellings_are_recognized() {
        assert_eq!(
            classify_description("วารสารระดับนานาชาติ ควอร์ไทล์ 2"),
            Some(TierCode::Q2)
        );
        assert_eq!(
            classify_description("วารสารระดับนานาชาติ ควอไทล์ 3 ที่สามารถสืบค้นได้"),
            Some(TierCode::Q3)
        );
        assert_eq!(classify_description("QUARTILE 4 journal"), Some(TierCode::Q4));
        assert_eq!(classify_description("Journal ranked Q1"), Some(TierCode::Q1));
    }

    #[test]
    fn full_width_percent_and_spacing_are_folded() {
        assert_eq!(classify_description("ลำดับ 5 ％ แรก"), Some(TierCode::T5));
        assert_eq!(classify_description("top 10 percentile"), Some(TierCode::T10));
    }

    #[test]
    fn numbers_embedded_in_larger_values_do_not_match() {
        assert_eq!(classify_description("reward capped at 15%"), None);
        assert_eq!(classify_description("2.5% overhead"), None);
        assert_eq!(classify_description("ลำดับ 15% แรก"), None);
        assert_eq!(classify_description("top 25% of journals"), None);
        assert_eq!(classify_description("ลำดับ 15% แรก (top 5%)"), Some(TierCode::T5));
        assert_eq!(classify_description("top 50 institutions"), None);
        assert_eq!(classify_description("faq12 reference"), None);
        assert_eq!(classify_description("quartile 12"), None);
    }

    #[test]
    fn tci_and_unclassifiable_descriptions() {
        assert_eq!(
            classify_description("Journal indexed in TCI group 1"),
            Some(TierCode::Tci)
        );
        assert_eq!(classify_description("Conference travel support"), None);
        assert_eq!(classify_description("   "), None);
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "ควอร์ไทล์ 1 top 10% TCI";
        let first = classify_description(text);
        for _ in 0..10 {
            assert_eq!(classify_description(text), first);
        }
        assert_eq!(first, Some(TierCode::T10));
    }
}

//! Row label classification.
//!
//! Statement exports label their rows in free text and some labels overlap:
//! "Чистый долг" must stay out of the debt slot, and a footnoted net profit
//! row still contains "Чистая прибыль". Classification is therefore an
//! ordered list of rules where the first match wins.

use quarterly_core::MetricSlot;

/// Row labels present in every export that never carry figures.
pub const SKIPPED_LABELS: [&str; 2] = ["Дата отчета", "Валюта отчета"];

const DEBT: &str = "Долг";
const NET_GUARD: &str = "Чистый";
const PRICE_EARNINGS: &str = "P/E";
const NET_PROFIT: &str = "Чистая прибыль";
const FOOTNOTE_GUARD: &str = "н/с";

/// Labels matched by prefix once the guarded rules have been tried.
///
/// None of these is a prefix of another, so their order cannot change the
/// outcome.
const PREFIX_LABELS: [(&str, MetricSlot); 4] = [
    ("Капитализация", MetricSlot::Capitalization),
    ("Выручка", MetricSlot::Revenue),
    ("EBITDA", MetricSlot::Ebitda),
    ("ROE", MetricSlot::Roe),
];

/// A single classification rule.
#[derive(Debug, Clone, Copy)]
struct Rule {
    matches: fn(&str) -> bool,
    slot: MetricSlot,
}

/// Guarded rules, evaluated top to bottom before the prefix vocabulary.
const RULES: [Rule; 3] = [
    Rule {
        matches: |label| label.contains(DEBT) && !label.contains(NET_GUARD),
        slot: MetricSlot::Debt,
    },
    Rule {
        matches: |label| label.contains(PRICE_EARNINGS),
        slot: MetricSlot::Pe,
    },
    Rule {
        matches: |label| label.contains(NET_PROFIT) && !label.contains(FOOTNOTE_GUARD),
        slot: MetricSlot::NetProfit,
    },
];

/// Returns true for labels that are skipped before classification.
#[must_use]
pub fn is_skipped_label(label: &str) -> bool {
    SKIPPED_LABELS.contains(&label)
}

/// Maps a row label to the slot its figures belong in.
///
/// Returns `None` for rows that should be ignored, including the
/// [`SKIPPED_LABELS`]. The label is matched as given; callers trim it.
///
/// # Example
/// ```
/// use quarterly_core::MetricSlot;
/// use quarterly_csv::classify_label;
///
/// assert_eq!(classify_label("Долг, млрд руб"), Some(MetricSlot::Debt));
/// assert_eq!(classify_label("Чистый долг, млрд руб"), None);
/// ```
#[must_use]
pub fn classify_label(label: &str) -> Option<MetricSlot> {
    if is_skipped_label(label) {
        return None;
    }

    if let Some(rule) = RULES.iter().find(|rule| (rule.matches)(label)) {
        return Some(rule.slot);
    }

    PREFIX_LABELS
        .iter()
        .find(|(prefix, _)| label.starts_with(prefix))
        .map(|(_, slot)| *slot)
}

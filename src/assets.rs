//! Monthly asset tracking.
//!
//! Each month may hold an entry with a list of holdings and two free-form
//! notes. A month with no entry is a gap in the record, which is different
//! from a month whose holdings add up to zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dates::MonthKey;
use crate::models::ItemId;

/// Length of the rolling chart window in months
pub const WINDOW_MONTHS: usize = 12;

/// Name given to the single holding created from a legacy bare-number month
pub const LEGACY_ITEM_NAME: &str = "Total";

const EOK: f64 = 1e8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetItem {
    pub id: ItemId,
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMonthEntry {
    #[serde(default)]
    pub items: Vec<AssetItem>,
    #[serde(default)]
    pub note_up: String,
    #[serde(default)]
    pub note_down: String,
}

impl AssetMonthEntry {
    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.amount).sum()
    }

    fn is_blank(&self) -> bool {
        self.items.is_empty() && self.note_up.is_empty() && self.note_down.is_empty()
    }
}

/// A month value as it may appear in storage: older stores kept a single number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredMonthEntry {
    Legacy(f64),
    Current(AssetMonthEntry),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPoint {
    pub month: MonthKey,
    /// None when the month has no entry
    pub total: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetBook {
    months: BTreeMap<MonthKey, AssetMonthEntry>,
}

impl AssetBook {
    /// Normalize stored month values, wrapping legacy bare numbers into a single
    /// holding. Returns the book and how many months were converted; already
    /// normalized data converts nothing.
    pub fn from_stored(stored: BTreeMap<MonthKey, StoredMonthEntry>) -> (Self, usize) {
        let mut migrated = 0;
        let months = stored
            .into_iter()
            .map(|(month, value)| {
                let entry = match value {
                    StoredMonthEntry::Current(entry) => entry,
                    StoredMonthEntry::Legacy(amount) => {
                        migrated += 1;
                        AssetMonthEntry {
                            items: vec![AssetItem {
                                id: ItemId::from(format!("legacy-{month}")),
                                name: LEGACY_ITEM_NAME.to_string(),
                                amount,
                            }],
                            ..AssetMonthEntry::default()
                        }
                    }
                };
                (month, entry)
            })
            .collect();
        (Self { months }, migrated)
    }

    pub fn entry(&self, month: MonthKey) -> Option<&AssetMonthEntry> {
        self.months.get(&month)
    }

    pub fn total(&self, month: MonthKey) -> Option<f64> {
        self.entry(month).map(AssetMonthEntry::total)
    }

    /// `(noteUp, noteDown)` for the month, shown alongside the chart
    pub fn tooltip(&self, month: MonthKey) -> Option<(&str, &str)> {
        self.entry(month)
            .map(|entry| (entry.note_up.as_str(), entry.note_down.as_str()))
    }

    /// Add a holding. A blank name, an amount that is not a finite number, or an
    /// amount that would push the month's total past `f64` range is ignored.
    pub fn add_item(&self, month: MonthKey, name: &str, amount_text: &str) -> Self {
        let name = name.trim();
        let amount = match amount_text.trim().parse::<f64>() {
            Ok(amount) if amount.is_finite() => amount,
            _ => return self.clone(),
        };
        let current = self.total(month).unwrap_or(0.0);
        if name.is_empty() || !(current + amount).is_finite() {
            return self.clone();
        }
        let mut next = self.clone();
        next.months.entry(month).or_default().items.push(AssetItem {
            id: ItemId::generate(),
            name: name.to_string(),
            amount,
        });
        next
    }

    /// Remove a holding. A month left with no holdings and no notes goes back
    /// to having no entry at all.
    pub fn remove_item(&self, month: MonthKey, id: &ItemId) -> Self {
        let mut next = self.clone();
        if let Some(entry) = next.months.get_mut(&month) {
            entry.items.retain(|item| &item.id != id);
            if entry.is_blank() {
                next.months.remove(&month);
            }
        }
        next
    }

    pub fn set_notes(&self, month: MonthKey, note_up: &str, note_down: &str) -> Self {
        let mut next = self.clone();
        let entry = next.months.entry(month).or_default();
        entry.note_up = note_up.trim().to_string();
        entry.note_down = note_down.trim().to_string();
        if entry.is_blank() {
            next.months.remove(&month);
        }
        next
    }
}

/// Totals for the twelve months starting at `anchor`.
pub fn build_window(anchor: MonthKey, book: &AssetBook) -> Vec<WindowPoint> {
    (0..WINDOW_MONTHS as i32)
        .map(|offset| {
            let month = anchor.add_months(offset);
            WindowPoint {
                month,
                total: book.total(month),
            }
        })
        .collect()
}

/// Split a window into runs of consecutive months that have a total, as
/// `(index, total)` pairs. Drawing one line per run leaves gaps where months
/// have no entry instead of dipping to zero.
pub fn chart_segments(points: &[WindowPoint]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for (index, point) in points.iter().enumerate() {
        match point.total {
            Some(total) => current.push((index as f64, total)),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Format an amount in 억 (hundred-million) units with at most two decimals,
/// e.g. `250_000_000.0` becomes `2.5억`. Missing or non-finite values render as `-`.
pub fn format_eok(value: Option<f64>) -> String {
    let value = match value {
        Some(v) if v.is_finite() => v,
        _ => return "-".to_string(),
    };
    let scaled = (value / EOK * 100.0).round() / 100.0;
    let fixed = format!("{:.2}", scaled.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if scaled < 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out.push('억');
    out
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    fn book_from_json(json: &str) -> (AssetBook, usize) {
        let stored: BTreeMap<MonthKey, StoredMonthEntry> = serde_json::from_str(json).unwrap();
        AssetBook::from_stored(stored)
    }

    #[test]
    fn test_window_rolls_over_year_and_keeps_gaps() {
        let (book, migrated) = book_from_json(
            r#"{"2025-11":{"items":[{"id":"a","name":"bank","amount":100}]},
                "2026-01":{"items":[{"id":"b","name":"bank","amount":50},
                                    {"id":"c","name":"fund","amount":25}]}}"#,
        );
        assert_eq!(migrated, 0);

        let window = build_window(month("2025-11"), &book);
        assert_eq!(window.len(), WINDOW_MONTHS);

        let months: Vec<String> = window.iter().map(|p| p.month.to_string()).collect();
        assert_eq!(months[0], "2025-11");
        assert_eq!(months[1], "2025-12");
        assert_eq!(months[2], "2026-01");
        assert_eq!(months[11], "2026-10");

        let totals: Vec<Option<f64>> = window.iter().map(|p| p.total).collect();
        let mut expected = vec![None; WINDOW_MONTHS];
        expected[0] = Some(100.0);
        expected[2] = Some(75.0);
        assert_eq!(totals, expected);
    }

    #[test]
    fn test_shifting_anchor_recomputes() {
        let book = AssetBook::default().add_item(month("2025-12"), "cash", "10");
        let a = build_window(month("2025-11"), &book);
        let b = build_window(month("2025-12"), &book);
        assert_eq!(a[1].total, Some(10.0));
        assert_eq!(b[0].total, Some(10.0));
        assert_eq!(b[11].month, month("2026-11"));
    }

    #[test]
    fn test_empty_entry_totals_zero_not_gap() {
        let (book, _) = book_from_json(r#"{"2025-03":{"items":[],"noteUp":"up"}}"#);
        assert_eq!(book.total(month("2025-03")), Some(0.0));
        assert_eq!(book.total(month("2025-04")), None);
        assert_eq!(book.tooltip(month("2025-03")), Some(("up", "")));
    }

    #[test]
    fn test_negative_amounts_are_summed() {
        let book = AssetBook::default()
            .add_item(month("2025-05"), "house", "300000000")
            .add_item(month("2025-05"), "loan", "-120000000.5");
        assert_eq!(book.total(month("2025-05")), Some(179_999_999.5));
    }

    #[test]
    fn test_invalid_amount_is_a_noop() {
        let book = AssetBook::default();
        assert_eq!(book.add_item(month("2025-05"), "x", "abc"), book);
        assert_eq!(book.add_item(month("2025-05"), "x", "NaN"), book);
        assert_eq!(book.add_item(month("2025-05"), "x", ""), book);
        assert_eq!(book.add_item(month("2025-05"), "  ", "1"), book);
    }

    #[test]
    fn test_amount_overflowing_month_total_is_a_noop() {
        let book = AssetBook::default().add_item(month("2025-05"), "a", &f64::MAX.to_string());
        assert_eq!(book.total(month("2025-05")), Some(f64::MAX));
        assert_eq!(book.add_item(month("2025-05"), "b", &f64::MAX.to_string()), book);
        // another month is unaffected
        assert_ne!(book.add_item(month("2025-06"), "b", &f64::MAX.to_string()), book);
    }

    #[test]
    fn test_removing_last_item_restores_gap() {
        let book = AssetBook::default().add_item(month("2025-05"), "cash", "5");
        let id = book.entry(month("2025-05")).unwrap().items[0].id.clone();
        let removed = book.remove_item(month("2025-05"), &id);
        assert_eq!(removed.total(month("2025-05")), None);

        let noted = book.set_notes(month("2025-05"), "bonus", "");
        let removed = noted.remove_item(month("2025-05"), &id);
        assert_eq!(removed.total(month("2025-05")), Some(0.0));
    }

    #[test]
    fn test_legacy_migration_is_idempotent() {
        let (book, migrated) = book_from_json(r#"{"2025-01":150000000,"2025-02":{"items":[]}}"#);
        assert_eq!(migrated, 1);
        let entry = book.entry(month("2025-01")).unwrap();
        assert_eq!(entry.items.len(), 1);
        assert_eq!(entry.items[0].name, LEGACY_ITEM_NAME);
        assert_eq!(entry.items[0].id.as_str(), "legacy-2025-01");
        assert_eq!(book.total(month("2025-01")), Some(150_000_000.0));

        let first_pass = serde_json::to_string(&book).unwrap();
        let (again, migrated_again) = book_from_json(&first_pass);
        assert_eq!(migrated_again, 0);
        assert_eq!(again, book);
        assert_eq!(serde_json::to_string(&again).unwrap(), first_pass);
    }

    #[test]
    fn test_chart_segments_break_at_gaps() {
        let points: Vec<WindowPoint> = [Some(1.0), Some(2.0), None, None, Some(5.0), None]
            .into_iter()
            .enumerate()
            .map(|(i, total)| WindowPoint {
                month: month("2025-01").add_months(i as i32),
                total,
            })
            .collect();
        let segments = chart_segments(&points);
        assert_eq!(segments, vec![vec![(0.0, 1.0), (1.0, 2.0)], vec![(4.0, 5.0)]]);
    }

    #[test]
    fn test_format_eok() {
        assert_eq!(format_eok(None), "-");
        assert_eq!(format_eok(Some(f64::NAN)), "-");
        assert_eq!(format_eok(Some(f64::INFINITY)), "-");
        assert_eq!(format_eok(Some(f64::NEG_INFINITY)), "-");
        assert_eq!(format_eok(Some(250_000_000.0)), "2.5억");
        assert_eq!(format_eok(Some(100_000_000.0)), "1억");
        assert_eq!(format_eok(Some(123_456_789.0)), "1.23억");
        assert_eq!(format_eok(Some(-50_000_000.0)), "-0.5억");
        assert_eq!(format_eok(Some(123_456_000_000_000.0)), "1,234,560억");
        assert_eq!(format_eok(Some(0.0)), "0억");
    }
}

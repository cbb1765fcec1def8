//! Derived views over expanded occurrences: flattening across items,
//! per-currency totals, search, sorting and grouping by color or month.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::FinanceItem;
use super::occurrences::{expand, DateWindow, Occurrence};
use crate::currency::CurrencyCode;

/// An occurrence tagged with the display fields of the item it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceEntry {
    /// `<item id>-<occurrence key>`, unique within a window.
    pub id: String,
    pub item_id: Uuid,
    pub name: String,
    pub color: String,
    pub currency: CurrencyCode,
    pub is_expense: bool,
    #[serde(flatten)]
    pub occurrence: Occurrence,
}

impl OccurrenceEntry {
    pub fn new(item: &FinanceItem, occurrence: Occurrence) -> Self {
        Self {
            id: format!("{}-{}", item.id, occurrence.key()),
            item_id: item.id,
            name: item.name.clone(),
            color: item.color.clone(),
            currency: item.currency.clone(),
            is_expense: item.is_expense(),
            occurrence,
        }
    }

    pub fn amount(&self) -> f64 {
        self.occurrence.amount
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortCriteria {
    #[default]
    Date,
    Price,
    Name,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Entries sharing one color, in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorGroup {
    pub color: String,
    pub amount: f64,
    pub entries: Vec<OccurrenceEntry>,
}

impl ColorGroup {
    /// Date of the group's first entry.
    pub fn date(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.entries.first().map(|entry| entry.occurrence.date)
    }
}

/// Entries from one calendar month, titled like `March 2024`.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup {
    pub year: i32,
    pub month: u32,
    pub title: String,
    pub entries: Vec<OccurrenceEntry>,
}

/// Expands every item over `window` and returns the entries ascending by
/// date. Ties keep item order.
pub fn collect_entries<'a, I>(items: I, window: &DateWindow) -> Vec<OccurrenceEntry>
where
    I: IntoIterator<Item = &'a FinanceItem>,
{
    let mut entries: Vec<OccurrenceEntry> = items
        .into_iter()
        .flat_map(|item| {
            expand(item, window)
                .into_iter()
                .map(move |occurrence| OccurrenceEntry::new(item, occurrence))
        })
        .collect();
    entries.sort_by_key(|entry| entry.occurrence.date);
    entries
}

pub fn totals_by_currency(entries: &[OccurrenceEntry]) -> BTreeMap<CurrencyCode, f64> {
    let mut totals = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.currency.clone()).or_insert(0.0) += entry.amount();
    }
    totals
}

/// Case-insensitive substring match on the item name. An empty query keeps
/// everything.
pub fn filter_by_name(entries: &[OccurrenceEntry], query: &str) -> Vec<OccurrenceEntry> {
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| entry.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub fn sort_entries(entries: &mut [OccurrenceEntry], criteria: SortCriteria, order: SortOrder) {
    entries.sort_by(|a, b| {
        let ordering = match criteria {
            SortCriteria::Date => a.occurrence.date.cmp(&b.occurrence.date),
            SortCriteria::Price => a
                .amount()
                .partial_cmp(&b.amount())
                .unwrap_or(Ordering::Equal),
            SortCriteria::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

pub fn group_by_color(entries: &[OccurrenceEntry]) -> Vec<ColorGroup> {
    let mut groups: Vec<ColorGroup> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|group| group.color == entry.color) {
            Some(group) => {
                group.amount += entry.amount();
                group.entries.push(entry.clone());
            }
            None => groups.push(ColorGroup {
                color: entry.color.clone(),
                amount: entry.amount(),
                entries: vec![entry.clone()],
            }),
        }
    }
    groups
}

/// Buckets entries by the UTC calendar month of their date. Groups come in
/// first-seen order and keep the entries' relative order.
pub fn group_by_month(entries: &[OccurrenceEntry]) -> Vec<MonthGroup> {
    let mut groups: Vec<MonthGroup> = Vec::new();
    for entry in entries {
        let date = entry.occurrence.date;
        let (year, month) = (date.year(), date.month());
        match groups
            .iter_mut()
            .find(|group| group.year == year && group.month == month)
        {
            Some(group) => group.entries.push(entry.clone()),
            None => groups.push(MonthGroup {
                year,
                month,
                title: date.format("%B %Y").to_string(),
                entries: vec![entry.clone()],
            }),
        }
    }
    groups
}

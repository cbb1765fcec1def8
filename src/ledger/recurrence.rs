use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::time_interval::{TimeInterval, TimeUnit};
use super::timestamp::iso_millis;
use crate::errors::TrackerError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Once,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
    /// Any tag this build does not recognise. It never advances, so a walk
    /// over it yields at most the start date.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Day,
    Month,
}

/// How an item repeats. `interval` and `interval_unit` only matter for
/// [`RecurrenceKind::Custom`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_unit: Option<IntervalUnit>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "iso_millis::option"
    )]
    pub end_date: Option<DateTime<Utc>>,
}

impl RecurrenceRule {
    pub fn new(kind: RecurrenceKind) -> Self {
        Self {
            kind,
            interval: None,
            interval_unit: None,
            end_date: None,
        }
    }

    pub fn once() -> Self {
        Self::new(RecurrenceKind::Once)
    }

    pub fn custom(interval: u32, unit: IntervalUnit) -> Self {
        Self {
            kind: RecurrenceKind::Custom,
            interval: Some(interval),
            interval_unit: Some(unit),
            end_date: None,
        }
    }

    pub fn ending(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Step count in effect: the rule's interval for custom rules (missing
    /// means 1), otherwise always 1.
    pub fn effective_interval(&self) -> u32 {
        match self.kind {
            RecurrenceKind::Custom => self.interval.unwrap_or(1),
            _ => 1,
        }
    }

    /// The step between consecutive occurrences, or `None` when the rule
    /// does not repeat. A custom rule without a unit steps by months.
    pub fn step(&self) -> Option<TimeInterval> {
        let unit = match self.kind {
            RecurrenceKind::Once | RecurrenceKind::Unknown => return None,
            RecurrenceKind::Daily => TimeUnit::Day,
            RecurrenceKind::Weekly => TimeUnit::Week,
            RecurrenceKind::Monthly => TimeUnit::Month,
            RecurrenceKind::Yearly => TimeUnit::Year,
            RecurrenceKind::Custom => match self.interval_unit {
                Some(IntervalUnit::Day) => TimeUnit::Day,
                Some(IntervalUnit::Month) | None => TimeUnit::Month,
            },
        };
        Some(TimeInterval::new(self.effective_interval(), unit))
    }

    pub fn label(&self) -> String {
        match self.kind {
            RecurrenceKind::Once => "One-time".into(),
            RecurrenceKind::Unknown => "Unknown".into(),
            _ => self
                .step()
                .map(|step| step.label())
                .unwrap_or_else(|| "Unknown".into()),
        }
    }

    /// Rejects rules that would never advance. Used when items are created
    /// or edited; expansion itself tolerates them.
    pub fn validate(&self) -> Result<(), TrackerError> {
        match (self.kind, self.interval) {
            (RecurrenceKind::Custom, Some(0)) => Err(TrackerError::InvalidInterval(0)),
            _ => Ok(()),
        }
    }
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self::once()
    }
}

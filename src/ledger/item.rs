use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::recurrence::RecurrenceRule;
use super::timestamp::{format_iso, iso_millis};
use crate::currency::CurrencyCode;
use crate::errors::TrackerError;

/// Paid/unpaid record for a single expense occurrence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    pub is_paid: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "iso_millis::option"
    )]
    pub paid_date: Option<DateTime<Utc>>,
}

impl PaymentStatus {
    pub fn paid(on: DateTime<Utc>) -> Self {
        Self {
            is_paid: true,
            paid_date: Some(on),
        }
    }

    pub fn unpaid() -> Self {
        Self::default()
    }
}

/// Sparse map from occurrence key to payment status. A missing key means
/// unpaid.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PaymentHistory(BTreeMap<String, PaymentStatus>);

impl PaymentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the status recorded for the occurrence generated at `date`.
    pub fn status_for(&self, date: &DateTime<Utc>) -> PaymentStatus {
        self.get(&format_iso(date)).cloned().unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&PaymentStatus> {
        self.0.get(key)
    }

    pub fn record(&mut self, key: impl Into<String>, status: PaymentStatus) {
        self.0.insert(key.into(), status);
    }

    /// Records `status` for the occurrence generated at `date`, keyed the
    /// same way `status_for` looks it up.
    pub fn record_at(&mut self, date: &DateTime<Utc>, status: PaymentStatus) {
        self.record(format_iso(date), status);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemKind {
    Income,
    Expense {
        #[serde(default, rename = "paymentHistory")]
        payment_history: PaymentHistory,
    },
}

impl ItemKind {
    pub fn expense() -> Self {
        ItemKind::Expense {
            payment_history: PaymentHistory::new(),
        }
    }

    pub fn is_expense(&self) -> bool {
        matches!(self, ItemKind::Expense { .. })
    }

    pub fn payment_history(&self) -> Option<&PaymentHistory> {
        match self {
            ItemKind::Income => None,
            ItemKind::Expense { payment_history } => Some(payment_history),
        }
    }
}

/// User-editable fields of an item, as supplied on create and update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub name: String,
    #[serde(default)]
    pub color: String,
    pub amount: f64,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(with = "iso_millis")]
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub recurrence: RecurrenceRule,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, amount: f64, start_date: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            color: String::new(),
            amount,
            currency: CurrencyCode::default(),
            start_date,
            recurrence: RecurrenceRule::once(),
        }
    }

    pub fn with_recurrence(mut self, recurrence: RecurrenceRule) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(TrackerError::InvalidAmount(self.amount));
        }
        self.recurrence.validate()
    }
}

/// A recurring (or one-time) income or expense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinanceItem {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub color: String,
    pub amount: f64,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(with = "iso_millis")]
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub recurrence: RecurrenceRule,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl FinanceItem {
    pub fn income(draft: ItemDraft) -> Self {
        Self::from_draft(Uuid::new_v4(), draft, ItemKind::Income)
    }

    pub fn expense(draft: ItemDraft) -> Self {
        Self::from_draft(Uuid::new_v4(), draft, ItemKind::expense())
    }

    pub(crate) fn from_draft(id: Uuid, draft: ItemDraft, kind: ItemKind) -> Self {
        Self {
            id,
            name: draft.name,
            color: draft.color,
            amount: draft.amount,
            currency: draft.currency,
            start_date: draft.start_date,
            recurrence: draft.recurrence,
            kind,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind.is_expense()
    }

    pub fn payment_history(&self) -> Option<&PaymentHistory> {
        self.kind.payment_history()
    }

    pub fn payment_history_mut(&mut self) -> Option<&mut PaymentHistory> {
        match &mut self.kind {
            ItemKind::Income => None,
            ItemKind::Expense { payment_history } => Some(payment_history),
        }
    }
}

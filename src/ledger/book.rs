use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::item::{FinanceItem, ItemDraft, ItemKind, PaymentStatus};
use super::occurrences::DateWindow;
use super::summary::{collect_entries, group_by_month, MonthGroup, OccurrenceEntry};
use super::timestamp::iso_millis;
use crate::errors::TrackerError;

pub const DEFAULT_HISTORY_WINDOW_MONTHS: u32 = 6;

/// Session-scoped collection of incomes and expenses. Items only enter
/// through the validating `add_*` methods, and only this type writes
/// payment history; expansion reads it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceBook {
    incomes: Vec<FinanceItem>,
    expenses: Vec<FinanceItem>,
    history_window_months: u32,
    #[serde(with = "iso_millis")]
    updated_at: DateTime<Utc>,
}

impl Default for FinanceBook {
    fn default() -> Self {
        Self::new()
    }
}

impl FinanceBook {
    pub fn new() -> Self {
        Self {
            incomes: Vec::new(),
            expenses: Vec::new(),
            history_window_months: DEFAULT_HISTORY_WINDOW_MONTHS,
            updated_at: Utc::now(),
        }
    }

    pub fn with_history_window(mut self, months: u32) -> Self {
        self.history_window_months = months;
        self
    }

    pub fn add_income(&mut self, draft: ItemDraft) -> Result<Uuid, TrackerError> {
        draft.validate()?;
        let item = FinanceItem::income(draft);
        let id = item.id;
        tracing::debug!(%id, name = %item.name, "income added");
        self.incomes.push(item);
        self.touch();
        Ok(id)
    }

    /// Adds an expense with an empty payment history.
    pub fn add_expense(&mut self, draft: ItemDraft) -> Result<Uuid, TrackerError> {
        draft.validate()?;
        let item = FinanceItem::expense(draft);
        let id = item.id;
        tracing::debug!(%id, name = %item.name, "expense added");
        self.expenses.push(item);
        self.touch();
        Ok(id)
    }

    /// Replaces an item's editable fields. An expense keeps the payment
    /// history it already had.
    pub fn update(&mut self, id: Uuid, draft: ItemDraft) -> Result<(), TrackerError> {
        draft.validate()?;
        let slot = self.item_mut(id).ok_or(TrackerError::ItemNotFound(id))?;
        let kind = match &slot.kind {
            ItemKind::Income => ItemKind::Income,
            ItemKind::Expense { payment_history } => ItemKind::Expense {
                payment_history: payment_history.clone(),
            },
        };
        *slot = FinanceItem::from_draft(id, draft, kind);
        tracing::debug!(%id, "item updated");
        self.touch();
        Ok(())
    }

    pub fn delete(&mut self, id: Uuid) -> Result<FinanceItem, TrackerError> {
        let removed = take_by_id(&mut self.incomes, id)
            .or_else(|| take_by_id(&mut self.expenses, id))
            .ok_or(TrackerError::ItemNotFound(id))?;
        tracing::info!(%id, name = %removed.name, "item deleted");
        self.touch();
        Ok(removed)
    }

    pub fn incomes(&self) -> &[FinanceItem] {
        &self.incomes
    }

    pub fn expenses(&self) -> &[FinanceItem] {
        &self.expenses
    }

    pub fn history_window_months(&self) -> u32 {
        self.history_window_months
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn item(&self, id: Uuid) -> Option<&FinanceItem> {
        self.items().find(|item| item.id == id)
    }

    pub fn items(&self) -> impl Iterator<Item = &FinanceItem> {
        self.incomes.iter().chain(self.expenses.iter())
    }

    /// Records whether the expense occurrence generated at `date` is paid.
    /// A paid record is stamped with `now`; an unpaid one carries no date.
    pub fn set_payment_status(
        &mut self,
        id: Uuid,
        date: DateTime<Utc>,
        is_paid: bool,
        now: DateTime<Utc>,
    ) -> Result<(), TrackerError> {
        let item = self.item_mut(id).ok_or(TrackerError::ItemNotFound(id))?;
        let history = item
            .payment_history_mut()
            .ok_or(TrackerError::NotAnExpense(id))?;
        let status = if is_paid {
            PaymentStatus::paid(now)
        } else {
            PaymentStatus::unpaid()
        };
        history.record_at(&date, status);
        tracing::debug!(%id, %date, is_paid, "payment status recorded");
        self.touch();
        Ok(())
    }

    /// Every occurrence of every item in the calendar month of `reference`.
    pub fn month_entries(&self, reference: DateTime<Utc>) -> Vec<OccurrenceEntry> {
        collect_entries(self.items(), &DateWindow::month_of(reference))
    }

    pub fn month_income_entries(&self, reference: DateTime<Utc>) -> Vec<OccurrenceEntry> {
        collect_entries(&self.incomes, &DateWindow::month_of(reference))
    }

    pub fn month_expense_entries(&self, reference: DateTime<Utc>) -> Vec<OccurrenceEntry> {
        collect_entries(&self.expenses, &DateWindow::month_of(reference))
    }

    /// Occurrences of one item within the history window around `reference`.
    pub fn history_entries(
        &self,
        id: Uuid,
        reference: DateTime<Utc>,
    ) -> Result<Vec<OccurrenceEntry>, TrackerError> {
        let item = self.item(id).ok_or(TrackerError::ItemNotFound(id))?;
        let window = DateWindow::around(reference, self.history_window_months);
        Ok(collect_entries(std::iter::once(item), &window))
    }

    /// `history_entries` bucketed by calendar month for the history screen.
    pub fn history_by_month(
        &self,
        id: Uuid,
        reference: DateTime<Utc>,
    ) -> Result<Vec<MonthGroup>, TrackerError> {
        Ok(group_by_month(&self.history_entries(id, reference)?))
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn item_mut(&mut self, id: Uuid) -> Option<&mut FinanceItem> {
        self.incomes
            .iter_mut()
            .chain(self.expenses.iter_mut())
            .find(|item| item.id == id)
    }
}

fn take_by_id(items: &mut Vec<FinanceItem>, id: Uuid) -> Option<FinanceItem> {
    let index = items.iter().position(|item| item.id == id)?;
    Some(items.remove(index))
}

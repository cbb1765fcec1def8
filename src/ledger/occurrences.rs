//! The occurrence engine: expands one item into the dated occurrences that
//! fall inside a closed query window.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::item::{FinanceItem, PaymentStatus};
use super::recurrence::RecurrenceKind;
use super::timestamp::{format_iso, iso_millis};
use crate::errors::TrackerError;

/// Closed, inclusive range of instants with millisecond precision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    #[serde(with = "iso_millis")]
    pub start: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// Builds a window as given. An inverted window is allowed and simply
    /// contains nothing.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TrackerError> {
        if start > end {
            return Err(TrackerError::InvalidWindow);
        }
        Ok(Self { start, end })
    }

    /// The calendar month containing `reference`: from the first instant of
    /// its first day through one millisecond before the next month starts.
    pub fn month_of(reference: DateTime<Utc>) -> Self {
        let date = reference.date_naive();
        let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
        let next_first = first.checked_add_months(Months::new(1)).unwrap_or(first);
        let start = first.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = next_first.and_time(chrono::NaiveTime::MIN).and_utc() - Duration::milliseconds(1);
        Self { start, end }
    }

    /// `months` calendar months either side of `reference`, keeping its time
    /// of day. Days that do not exist in the target month clamp to its end.
    pub fn around(reference: DateTime<Utc>, months: u32) -> Self {
        let span = Months::new(months);
        Self {
            start: reference.checked_sub_months(span).unwrap_or(reference),
            end: reference.checked_add_months(span).unwrap_or(reference),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// How an expense occurrence reads on the payment-history screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PaymentState {
    Paid,
    Overdue,
    Due,
}

impl PaymentState {
    /// Paid wins; otherwise an occurrence dated strictly before `now` is
    /// overdue and anything else is still due.
    pub fn classify(is_paid: bool, date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if is_paid {
            PaymentState::Paid
        } else if date < now {
            PaymentState::Overdue
        } else {
            PaymentState::Due
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentState::Paid => "PAID",
            PaymentState::Overdue => "OVERDUE",
            PaymentState::Due => "PAY NOW",
        }
    }
}

/// One concrete dated instance of an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,
    pub amount: f64,
    /// Present for expenses only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
}

impl Occurrence {
    /// The payment-history key for this occurrence.
    pub fn key(&self) -> String {
        format_iso(&self.date)
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status
            .as_ref()
            .map(|status| status.is_paid)
            .unwrap_or(false)
    }

    /// Payment state relative to `now`. Income occurrences have none.
    pub fn payment_state(&self, now: DateTime<Utc>) -> Option<PaymentState> {
        self.payment_status
            .as_ref()
            .map(|status| PaymentState::classify(status.is_paid, self.date, now))
    }
}

/// Expands `item` into its occurrences inside `window`, ascending by date.
///
/// One-time items yield their start date if the window holds it, regardless
/// of any recurrence end date. Recurring items walk forward from the start
/// date until the window end or the recurrence end is passed. A step that
/// fails to advance ends the walk with whatever was collected so far.
pub fn expand(item: &FinanceItem, window: &DateWindow) -> Vec<Occurrence> {
    let rule = &item.recurrence;
    let mut occurrences = Vec::new();

    if rule.kind == RecurrenceKind::Once {
        if window.contains(item.start_date) {
            occurrences.push(occurrence_at(item, item.start_date));
        }
        return occurrences;
    }

    let step = rule.step();
    let within_end = |at: DateTime<Utc>| rule.end_date.map_or(true, |end| at <= end);
    let mut current = match step {
        Some(step) => step.fast_forward(item.start_date, window.start),
        None => item.start_date,
    };

    tracing::trace!(item = %item.id, kind = ?rule.kind, "expanding occurrences");

    loop {
        if current > window.end || !within_end(current) {
            break;
        }
        if window.contains(current) {
            occurrences.push(occurrence_at(item, current));
        }
        let next = step.map_or(current, |step| step.next_timestamp(current));
        if next == current {
            tracing::debug!(
                item = %item.id,
                at = %format_iso(&current),
                "recurrence step did not advance; stopping"
            );
            break;
        }
        current = next;
    }

    occurrences
}

fn occurrence_at(item: &FinanceItem, at: DateTime<Utc>) -> Occurrence {
    Occurrence {
        date: at,
        amount: item.amount,
        payment_status: item.payment_history().map(|history| history.status_for(&at)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::item::ItemDraft;
    use crate::ledger::recurrence::{IntervalUnit, RecurrenceRule};
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn income(start: DateTime<Utc>, rule: RecurrenceRule) -> FinanceItem {
        FinanceItem::income(ItemDraft::new("Salary", 100.0, start).with_recurrence(rule))
    }

    fn days(list: &[Occurrence]) -> Vec<(u32, u32)> {
        list.iter().map(|o| (o.date.month(), o.date.day())).collect()
    }

    #[test]
    fn payment_state_follows_paid_flag_then_date() {
        let mut expense = FinanceItem::expense(
            ItemDraft::new("Rent", 500.0, at(2024, 1, 10))
                .with_recurrence(RecurrenceRule::new(RecurrenceKind::Monthly)),
        );
        expense
            .payment_history_mut()
            .unwrap()
            .record("2024-01-10T00:00:00.000Z", PaymentStatus::paid(at(2024, 1, 11)));
        let list = expand(&expense, &DateWindow::new(at(2024, 1, 1), at(2024, 3, 31)));
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap()
            + Duration::milliseconds(1);

        let states: Vec<_> = list.iter().map(|o| o.payment_state(now)).collect();
        assert_eq!(
            states,
            vec![
                Some(PaymentState::Paid),
                Some(PaymentState::Overdue),
                Some(PaymentState::Due),
            ]
        );
        assert_eq!(list[2].payment_state(now).map(PaymentState::label), Some("PAY NOW"));
    }

    #[test]
    fn payment_state_is_due_at_the_exact_instant() {
        assert_eq!(
            PaymentState::classify(false, at(2024, 2, 10), at(2024, 2, 10)),
            PaymentState::Due
        );
        assert_eq!(
            PaymentState::classify(true, at(2024, 2, 10), at(2024, 5, 1)),
            PaymentState::Paid
        );
    }

    #[test]
    fn income_occurrences_have_no_payment_state() {
        let item = income(at(2024, 1, 1), RecurrenceRule::new(RecurrenceKind::Monthly));
        let list = expand(&item, &DateWindow::month_of(at(2024, 1, 1)));
        assert_eq!(list[0].payment_state(at(2030, 1, 1)), None);
    }

    #[test]
    fn month_window_spans_whole_month() {
        let window = DateWindow::month_of(Utc.with_ymd_and_hms(2024, 2, 10, 15, 0, 0).unwrap());
        assert_eq!(window.start, at(2024, 2, 1));
        assert_eq!(format_iso(&window.end), "2024-02-29T23:59:59.999Z");
    }

    #[test]
    fn around_clamps_to_shorter_months() {
        let window = DateWindow::around(at(2024, 8, 31), 6);
        assert_eq!(window.start, at(2024, 2, 29));
        assert_eq!(window.end, at(2025, 2, 28));
    }

    #[test]
    fn try_new_rejects_inverted_windows() {
        assert!(DateWindow::try_new(at(2024, 2, 1), at(2024, 1, 1)).is_err());
        assert!(DateWindow::new(at(2024, 2, 1), at(2024, 1, 1)).is_empty());
    }

    #[test]
    fn daily_walk_fast_forwards_into_late_windows() {
        let item = income(at(2000, 1, 1), RecurrenceRule::new(RecurrenceKind::Daily));
        let list = expand(&item, &DateWindow::new(at(2024, 3, 1), at(2024, 3, 3)));
        assert_eq!(days(&list), vec![(3, 1), (3, 2), (3, 3)]);
    }

    #[test]
    fn weekly_walk_stays_on_the_anchor_weekday() {
        let item = income(at(2024, 1, 3), RecurrenceRule::new(RecurrenceKind::Weekly));
        let list = expand(&item, &DateWindow::new(at(2024, 2, 1), at(2024, 2, 29)));
        assert_eq!(days(&list), vec![(2, 7), (2, 14), (2, 21), (2, 28)]);
    }

    #[test]
    fn unknown_kind_yields_only_the_start_date() {
        let item = income(at(2024, 1, 5), RecurrenceRule::new(RecurrenceKind::Unknown));
        let list = expand(&item, &DateWindow::new(at(2024, 1, 1), at(2024, 12, 31)));
        assert_eq!(days(&list), vec![(1, 5)]);
    }

    #[test]
    fn zero_interval_terminates() {
        let item = income(at(2024, 1, 5), RecurrenceRule::custom(0, IntervalUnit::Day));
        let list = expand(&item, &DateWindow::new(at(2024, 1, 1), at(9999, 12, 31)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn income_occurrences_carry_no_payment_status() {
        let item = income(at(2024, 1, 5), RecurrenceRule::new(RecurrenceKind::Monthly));
        let list = expand(&item, &DateWindow::month_of(at(2024, 2, 1)));
        assert_eq!(list.len(), 1);
        assert!(list[0].payment_status.is_none());
        assert_eq!(list[0].key(), "2024-02-05T00:00:00.000Z");
    }

    #[test]
    fn occurrence_serializes_date_as_key() {
        let item = income(at(2024, 1, 5), RecurrenceRule::once());
        let list = expand(&item, &DateWindow::month_of(at(2024, 1, 1)));
        let value = serde_json::to_value(&list[0]).unwrap();
        assert_eq!(value["date"], "2024-01-05T00:00:00.000Z");
        assert!(value.get("paymentStatus").is_none());
    }
}

use cashflow_core::ledger::{
    expand, format_iso, DateWindow, FinanceItem, IntervalUnit, ItemDraft, Occurrence,
    PaymentHistory, PaymentStatus, RecurrenceKind, RecurrenceRule,
};
use chrono::{DateTime, TimeZone, Utc};

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn end_of(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 23, 59, 59).unwrap() + chrono::Duration::milliseconds(999)
}

fn income(start: DateTime<Utc>, rule: RecurrenceRule) -> FinanceItem {
    FinanceItem::income(ItemDraft::new("Item", 10.0, start).with_recurrence(rule))
}

fn keys(list: &[Occurrence]) -> Vec<String> {
    list.iter().map(Occurrence::key).collect()
}

fn rule(kind: RecurrenceKind) -> RecurrenceRule {
    RecurrenceRule::new(kind)
}

#[test]
fn monthly_from_the_31st_clamps_to_each_month_end() {
    let item = income(at(2024, 1, 31), rule(RecurrenceKind::Monthly));
    let list = expand(&item, &DateWindow::new(at(2024, 2, 1), end_of(2024, 4, 30)));
    assert_eq!(
        keys(&list),
        vec![
            "2024-02-29T00:00:00.000Z",
            "2024-03-31T00:00:00.000Z",
            "2024-04-30T00:00:00.000Z",
        ]
    );
}

#[test]
fn monthly_from_the_15th_keeps_the_day() {
    let item = income(at(2024, 1, 15), rule(RecurrenceKind::Monthly));
    let list = expand(&item, &DateWindow::new(at(2024, 2, 1), end_of(2024, 4, 30)));
    assert_eq!(
        keys(&list),
        vec![
            "2024-02-15T00:00:00.000Z",
            "2024-03-15T00:00:00.000Z",
            "2024-04-15T00:00:00.000Z",
        ]
    );
}

#[test]
fn one_time_item_ignores_recurrence_end() {
    let rule = RecurrenceRule::once().ending(at(2024, 1, 1));
    let item = income(at(2024, 5, 10), rule);

    let inside = expand(&item, &DateWindow::month_of(at(2024, 5, 1)));
    assert_eq!(keys(&inside), vec!["2024-05-10T00:00:00.000Z"]);

    let outside = expand(&item, &DateWindow::month_of(at(2024, 6, 1)));
    assert!(outside.is_empty());
}

#[test]
fn custom_day_interval_steps_by_that_many_days() {
    let item = income(at(2024, 1, 1), RecurrenceRule::custom(2, IntervalUnit::Day));
    let list = expand(&item, &DateWindow::new(at(2024, 1, 1), at(2024, 1, 7)));
    assert_eq!(
        keys(&list),
        vec![
            "2024-01-01T00:00:00.000Z",
            "2024-01-03T00:00:00.000Z",
            "2024-01-05T00:00:00.000Z",
            "2024-01-07T00:00:00.000Z",
        ]
    );
}

#[test]
fn custom_month_matches_monthly_with_interval() {
    let window = DateWindow::new(at(2024, 1, 1), at(2024, 12, 31));
    let custom = income(at(2024, 1, 31), RecurrenceRule::custom(2, IntervalUnit::Month));
    let mut unset = rule(RecurrenceKind::Custom);
    unset.interval = Some(2);
    let unset = income(at(2024, 1, 31), unset);

    let expected = vec![
        "2024-01-31T00:00:00.000Z",
        "2024-03-31T00:00:00.000Z",
        "2024-05-31T00:00:00.000Z",
        "2024-07-31T00:00:00.000Z",
        "2024-09-30T00:00:00.000Z",
        "2024-11-30T00:00:00.000Z",
    ];
    assert_eq!(keys(&expand(&custom, &window)), expected);
    assert_eq!(keys(&expand(&unset, &window)), expected);
}

#[test]
fn weekly_rule_stops_at_recurrence_end() {
    let end = at(2024, 1, 20);
    let item = income(at(2024, 1, 1), rule(RecurrenceKind::Weekly).ending(end));
    let list = expand(&item, &DateWindow::new(at(2024, 1, 1), at(2024, 2, 1)));
    assert_eq!(list.len(), 3);
    assert!(list.iter().all(|o| o.date <= end));
}

#[test]
fn yearly_rule_on_leap_day_uses_last_day_of_february() {
    let item = income(at(2024, 2, 29), rule(RecurrenceKind::Yearly));
    let list = expand(&item, &DateWindow::new(at(2024, 1, 1), at(2028, 12, 31)));
    assert_eq!(
        keys(&list),
        vec![
            "2024-02-29T00:00:00.000Z",
            "2025-02-28T00:00:00.000Z",
            "2026-02-28T00:00:00.000Z",
            "2027-02-28T00:00:00.000Z",
            "2028-02-29T00:00:00.000Z",
        ]
    );
}

#[test]
fn expense_occurrences_join_payment_history_by_key() {
    let mut history = PaymentHistory::new();
    history.record(
        "2024-03-15T00:00:00.000Z",
        PaymentStatus::paid(at(2024, 3, 16)),
    );
    let mut item = FinanceItem::expense(
        ItemDraft::new("Rent", 500.0, at(2024, 1, 15)).with_recurrence(rule(RecurrenceKind::Monthly)),
    );
    *item.payment_history_mut().unwrap() = history;

    let list = expand(&item, &DateWindow::new(at(2024, 2, 1), end_of(2024, 4, 30)));
    assert_eq!(list.len(), 3);
    for occurrence in &list {
        let paid = occurrence.payment_status.as_ref().unwrap().is_paid;
        assert_eq!(paid, occurrence.key() == "2024-03-15T00:00:00.000Z");
    }
}

#[test]
fn expansion_does_not_touch_the_item() {
    let item = FinanceItem::expense(
        ItemDraft::new("Rent", 500.0, at(2024, 1, 15)).with_recurrence(rule(RecurrenceKind::Monthly)),
    );
    let before = item.clone();
    let _ = expand(&item, &DateWindow::new(at(2024, 1, 1), at(2024, 12, 31)));
    assert_eq!(item, before);
    assert!(item.payment_history().unwrap().is_empty());
}

#[test]
fn degenerate_steps_terminate() {
    let huge = DateWindow::new(at(1970, 1, 1), at(9000, 1, 1));
    for unit in [IntervalUnit::Day, IntervalUnit::Month] {
        let item = income(at(2024, 4, 10), RecurrenceRule::custom(0, unit));
        assert_eq!(expand(&item, &huge).len(), 1);
    }
    // A high day with a zero step moves once to the month end, then stalls.
    let item = income(at(2024, 4, 29), RecurrenceRule::custom(0, IntervalUnit::Month));
    assert_eq!(
        keys(&expand(&item, &huge)),
        vec!["2024-04-29T00:00:00.000Z", "2024-04-30T00:00:00.000Z"]
    );
}

#[test]
fn inverted_window_is_empty() {
    let item = income(at(2024, 1, 1), rule(RecurrenceKind::Daily));
    assert!(expand(&item, &DateWindow::new(at(2024, 2, 1), at(2024, 1, 1))).is_empty());
}

#[test]
fn window_bounds_are_inclusive_to_the_millisecond() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let item = income(start, rule(RecurrenceKind::Daily));
    let list = expand(&item, &DateWindow::new(start, start + chrono::Duration::days(2)));
    assert_eq!(list.len(), 3);
    let list = expand(
        &item,
        &DateWindow::new(
            start + chrono::Duration::milliseconds(1),
            start + chrono::Duration::days(2) - chrono::Duration::milliseconds(1),
        ),
    );
    assert_eq!(keys(&list), vec!["2024-01-02T12:00:00.000Z"]);
}

#[test]
fn properties_hold_across_rules_and_windows() {
    let rules = [
        rule(RecurrenceKind::Daily),
        rule(RecurrenceKind::Weekly),
        rule(RecurrenceKind::Monthly),
        rule(RecurrenceKind::Yearly),
        RecurrenceRule::custom(3, IntervalUnit::Day),
        RecurrenceRule::custom(5, IntervalUnit::Month),
        rule(RecurrenceKind::Monthly).ending(at(2024, 8, 15)),
    ];
    let starts = [at(2023, 1, 31), at(2023, 6, 29), at(2024, 2, 29), at(2024, 3, 1)];
    let windows = [
        DateWindow::month_of(at(2024, 2, 1)),
        DateWindow::around(at(2024, 7, 31), 6),
        DateWindow::new(at(2022, 1, 1), at(2026, 1, 1)),
    ];

    for rule in &rules {
        for start in starts {
            let item = income(start, rule.clone());
            for window in &windows {
                let first = expand(&item, window);
                assert_eq!(first, expand(&item, window), "expansion is repeatable");
                assert!(first.windows(2).all(|pair| pair[0].date < pair[1].date));
                for occurrence in &first {
                    assert!(window.contains(occurrence.date));
                    if let Some(end) = rule.end_date {
                        assert!(occurrence.date <= end);
                    }
                    assert_eq!(occurrence.key(), format_iso(&occurrence.date));
                    assert!(occurrence.payment_status.is_none());
                }
            }
        }
    }
}

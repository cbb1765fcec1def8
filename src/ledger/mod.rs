//! Items, recurrence rules, and the occurrence engine that expands them.

pub mod book;
pub mod item;
pub mod occurrences;
pub mod recurrence;
pub mod summary;
pub mod time_interval;
pub mod timestamp;

pub use book::FinanceBook;
pub use item::{FinanceItem, ItemDraft, ItemKind, PaymentHistory, PaymentStatus};
pub use occurrences::{expand, DateWindow, Occurrence, PaymentState};
pub use recurrence::{IntervalUnit, RecurrenceKind, RecurrenceRule};
pub use summary::{
    collect_entries, filter_by_name, group_by_color, group_by_month, sort_entries,
    totals_by_currency, ColorGroup, MonthGroup, OccurrenceEntry, SortCriteria, SortOrder,
};
pub use time_interval::{TimeInterval, TimeUnit};
pub use timestamp::{format_iso, parse_iso};

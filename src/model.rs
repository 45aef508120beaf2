use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::limits::*;

/// 1-based slot position within a booking day.
pub type SlotIndex = u32;

/// Minutes since local midnight.
pub type Minute = u32;

/// Integer currency amount (no minor units).
pub type Amount = i64;

/// Half-open interval `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Minute,
    pub end: Minute,
}

impl Span {
    pub fn new(start: Minute, end: Minute) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// One partition unit of a bookable day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub index: SlotIndex,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Slot {
    /// Display label, e.g. `20:00 - 22:00`.
    pub fn label(&self) -> String {
        format!("{:02}:00 - {:02}:00", self.start_hour, self.end_hour)
    }
}

/// Fixed partition of a day into `count` slots of `hours` each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    pub count: u32,
    pub hours: u32,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            count: DEFAULT_SLOT_COUNT,
            hours: DEFAULT_SLOT_HOURS,
        }
    }
}

impl SlotGrid {
    pub fn new(count: u32, hours: u32) -> Self {
        Self { count, hours }
    }

    pub fn slot_minutes(&self) -> Minute {
        self.hours * 60
    }

    pub fn contains(&self, index: SlotIndex) -> bool {
        (1..=self.count).contains(&index)
    }

    pub fn slot(&self, index: SlotIndex) -> Option<Slot> {
        self.contains(index).then(|| Slot {
            index,
            start_hour: (index - 1) * self.hours,
            end_hour: index * self.hours,
        })
    }

    pub fn slots(&self) -> Vec<Slot> {
        (1..=self.count).filter_map(|i| self.slot(i)).collect()
    }

    /// Slots touched by `span`, rounding the start down and the end up.
    ///
    /// A partial overlap claims the whole slot. Result is clipped to `[1, count]`.
    pub fn slots_covering(&self, span: &Span) -> Vec<SlotIndex> {
        let len = self.slot_minutes();
        if len == 0 || self.count == 0 || span.is_empty() {
            return Vec::new();
        }
        let first = (span.start / len + 1).max(1);
        let last = span.end.div_ceil(len).min(self.count);
        (first..=last).collect()
    }
}

/// Ordered, deduplicated slot indices chosen for one date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet(BTreeSet<SlotIndex>);

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the slot if absent, remove it if present. Returns true when now selected.
    pub fn toggle(&mut self, index: SlotIndex) -> bool {
        if self.0.remove(&index) {
            false
        } else {
            self.0.insert(index);
            true
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn contains(&self, index: SlotIndex) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn min(&self) -> Option<SlotIndex> {
        self.0.first().copied()
    }

    /// Ascending iteration.
    pub fn iter(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<SlotIndex> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = SlotIndex>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Pricing attributes of a performer or bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSchedule {
    #[serde(default)]
    pub per_slot_price: Amount,
    /// Zero means the discounted tier is unavailable.
    #[serde(default)]
    pub per_session_price: Amount,
}

impl PricingSchedule {
    pub fn new(per_slot_price: Amount, per_session_price: Amount) -> Self {
        Self {
            per_slot_price,
            per_session_price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "per-slot")]
    PerSlot,
    #[serde(rename = "per-session")]
    PerSession,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::PerSlot => "per-slot",
            Tier::PerSession => "per-session",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub unit_price: Amount,
    pub total_price: Amount,
    pub tier: Tier,
}

impl PriceQuote {
    /// Returned for empty selections and unpriced schedules.
    pub const ZERO: PriceQuote = PriceQuote {
        unit_price: 0,
        total_price: 0,
        tier: Tier::PerSlot,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingDomain {
    Performer,
    Table,
}

impl BookingDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingDomain::Performer => "performer",
            BookingDomain::Table => "table",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleStatus {
    Pending,
    Confirmed,
    Rejected,
    Canceled,
    Ended,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    /// The backend did not report a payment state.
    #[default]
    Unknown,
}

/// Table identifier compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Booked wall-clock range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Portion of this range that falls on `date`, in minutes since midnight.
    /// An end past midnight extends to the end of `date`.
    pub fn span_on(&self, date: NaiveDate) -> Option<Span> {
        let day_start = date.and_hms_opt(0, 0, 0)?;
        let next_day = date.succ_opt()?.and_hms_opt(0, 0, 0)?;
        if self.end <= day_start || self.start >= next_day || self.end <= self.start {
            return None;
        }
        let start = if self.start < day_start { 0 } else { minute_of_day(&self.start) };
        let end = if self.end >= next_day { MINUTES_PER_DAY } else { minute_of_day(&self.end) };
        (start < end).then(|| Span::new(start, end))
    }
}

fn minute_of_day(t: &NaiveDateTime) -> Minute {
    t.hour() * 60 + t.minute()
}

/// What part of a venue or schedule a reservation holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupancy {
    Slots(BTreeSet<SlotIndex>),
    Tables(BTreeSet<TableId>),
    Range(TimeRange),
    /// No slot, table, or time information.
    Unspecified,
}

/// Canonical reservation shape consumed by the availability filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Option<String>,
    pub status: ScheduleStatus,
    pub payment: PaymentStatus,
    pub date: Option<NaiveDate>,
    pub occupancy: Occupancy,
}

impl Reservation {
    pub fn new(status: ScheduleStatus, payment: PaymentStatus, date: Option<NaiveDate>, occupancy: Occupancy) -> Self {
        Self {
            id: None,
            status,
            payment,
            date,
            occupancy,
        }
    }

    /// Calendar day the reservation belongs to: explicit date first, then range start.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        self.date.or(match &self.occupancy {
            Occupancy::Range(range) => Some(range.start.date()),
            _ => None,
        })
    }
}

/// Slots or tables that must not be selectable on `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedSet {
    pub date: NaiveDate,
    pub slots: BTreeSet<SlotIndex>,
    pub tables: BTreeSet<TableId>,
}

impl BlockedSet {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            slots: BTreeSet::new(),
            tables: BTreeSet::new(),
        }
    }

    pub fn is_slot_blocked(&self, index: SlotIndex) -> bool {
        self.slots.contains(&index)
    }

    pub fn is_table_blocked(&self, raw_id: &str) -> bool {
        self.tables.contains(&TableId::new(raw_id))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.tables.is_empty()
    }
}

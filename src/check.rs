use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{Engine, deposit_remainder, max_consecutive_run, open_slots, table_quote};
use crate::model::*;
use crate::normalize::normalize_all;

/// One availability + pricing question, as read by the `nightbook` binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub date: NaiveDate,
    #[serde(default = "default_domain")]
    pub domain: BookingDomain,
    #[serde(default)]
    pub selected: SelectionSet,
    /// Bar tables for a table-domain check.
    #[serde(default)]
    pub tables: Vec<String>,
    #[serde(default)]
    pub schedule: PricingSchedule,
    #[serde(default)]
    pub deposit: Amount,
    /// Raw backend records; normalized before use.
    #[serde(default)]
    pub reservations: Vec<Value>,
}

fn default_domain() -> BookingDomain {
    BookingDomain::Performer
}

/// One grid slot with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotView {
    pub index: SlotIndex,
    pub label: String,
    pub blocked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub blocked: BlockedSet,
    pub slots: Vec<SlotView>,
    pub open_slots: Vec<SlotIndex>,
    /// Selected slots that are already taken.
    pub conflicts: Vec<SlotIndex>,
    /// Selected tables that are already taken.
    pub table_conflicts: Vec<TableId>,
    pub max_run: u32,
    pub quote: PriceQuote,
    pub remainder: Amount,
    pub risk_warning: bool,
    pub dropped_records: usize,
}

pub fn run_check(engine: &Engine, request: &CheckRequest) -> CheckReport {
    let reservations = normalize_all(&request.reservations);
    let dropped_records = request.reservations.len().saturating_sub(reservations.len());

    let blocked = engine.blocked(request.date, &reservations, request.domain);
    let confirmed = engine.confirmed(request.date, &reservations, request.domain);
    let conflicts = request
        .selected
        .iter()
        .filter(|i| blocked.is_slot_blocked(*i))
        .collect();

    let tables: BTreeSet<TableId> = request.tables.iter().map(|raw| TableId::new(raw)).collect();
    let table_conflicts = tables.iter().filter(|t| blocked.tables.contains(*t)).cloned().collect();

    let quote = match request.domain {
        BookingDomain::Performer => engine.quote(&request.selected, &request.schedule),
        BookingDomain::Table => table_quote(tables.len(), &request.schedule),
    };

    let slots = engine
        .slots()
        .into_iter()
        .map(|slot| SlotView {
            index: slot.index,
            label: slot.label(),
            blocked: blocked.is_slot_blocked(slot.index),
        })
        .collect();

    CheckReport {
        slots,
        open_slots: open_slots(&engine.grid, &blocked),
        conflicts,
        table_conflicts,
        max_run: max_consecutive_run(&request.selected),
        remainder: deposit_remainder(quote.total_price, request.deposit),
        risk_warning: engine.risk_warning(request.date, &request.selected, &confirmed),
        quote,
        blocked,
        dropped_records,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn report_from_json_request() {
        let request: CheckRequest = serde_json::from_value(json!({
            "date": "2024-05-01",
            "selected": [5, 6, 7, 8],
            "schedule": { "perSlotPrice": 100000, "perSessionPrice": 80000 },
            "deposit": 50000,
            "reservations": [
                { "ScheduleStatus": "Confirmed", "BookingDate": "2024-05-01", "Slots": [2] },
                { "scheduleStatus": "Pending", "paymentStatus": "Unpaid", "bookingDate": "2024-05-01", "slots": [9] },
                { "scheduleStatus": "Confirmed", "bookingDate": "2024-05-02", "slots": [10] },
                { "scheduleStatus": "???" }
            ]
        }))
        .unwrap();

        let report = run_check(&Engine::default(), &request);
        assert_eq!(report.blocked.slots.iter().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(report.open_slots.len(), 11);
        assert!(report.conflicts.is_empty());
        assert_eq!(report.max_run, 4);
        assert_eq!(report.quote.tier, Tier::PerSession);
        assert_eq!(report.quote.total_price, 320_000);
        assert_eq!(report.remainder, 270_000);
        assert!(report.risk_warning);
        assert_eq!(report.dropped_records, 1);
    }

    #[test]
    fn conflicts_reported() {
        let request: CheckRequest = serde_json::from_value(json!({
            "date": "2024-05-01",
            "selected": [1, 2],
            "reservations": [
                { "scheduleStatus": "Pending", "bookingDate": "2024-05-01", "slots": [2] }
            ]
        }))
        .unwrap();
        let report = run_check(&Engine::default(), &request);
        assert_eq!(report.conflicts, vec![2]);
        assert_eq!(report.quote, PriceQuote::ZERO);
        // Pending is not confirmed, so no overrun risk.
        assert!(!report.risk_warning);
    }

    #[test]
    fn slots_carry_labels_and_blocked_flags() {
        let request: CheckRequest = serde_json::from_value(json!({
            "date": "2024-05-01",
            "reservations": [
                { "scheduleStatus": "Confirmed", "startTime": "2024-05-01T20:00:00", "endTime": "2024-05-01T22:00:00" }
            ]
        }))
        .unwrap();
        let report = run_check(&Engine::default(), &request);
        assert_eq!(report.slots.len(), 12);
        assert_eq!(report.slots[0].label, "00:00 - 02:00");
        assert_eq!(
            report.slots[10],
            SlotView { index: 11, label: "20:00 - 22:00".into(), blocked: true }
        );
        assert!(!report.slots[11].blocked);
    }

    #[test]
    fn table_conflicts_reported() {
        let request: CheckRequest = serde_json::from_value(json!({
            "date": "2024-05-01",
            "domain": "table",
            "tables": ["VIP-1", "vip-2", " VIP-3 "],
            "schedule": { "perSlotPrice": 300000, "perSessionPrice": 100000 },
            "deposit": 100000,
            "reservations": [
                { "ScheduleStatus": "Confirmed", "BookingDate": "2024-05-01", "TableMap": { "vip-1": {} } },
                { "scheduleStatus": "Pending", "isPaid": true, "bookingDate": "2024-05-01", "tableIds": ["VIP-3"] },
                { "scheduleStatus": "Pending", "isPaid": false, "bookingDate": "2024-05-01", "tableIds": ["VIP-2"] }
            ]
        }))
        .unwrap();
        let report = run_check(&Engine::default(), &request);
        assert_eq!(report.table_conflicts, vec![TableId::new("vip-1"), TableId::new("vip-3")]);
        assert!(report.conflicts.is_empty());
        assert_eq!(report.quote.tier, Tier::PerSlot);
        assert_eq!(report.quote.total_price, 900_000);
        assert_eq!(report.remainder, 800_000);
    }
}

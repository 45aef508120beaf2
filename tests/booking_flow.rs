use chrono::NaiveDate;
use serde_json::json;

use nightbook::config::Config;
use nightbook::flow::{BookingFlow, FlowState, Role, SessionContext};
use nightbook::model::*;
use nightbook::normalize::normalize_all;
use nightbook::{Engine, EngineError};

// ── Test infrastructure ──────────────────────────────────────

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

fn customer(target: &str) -> SessionContext {
    SessionContext {
        account_id: "acc-42".into(),
        role: Role::Customer,
        target_id: target.into(),
    }
}

/// What the backend returns for a performer's bookings, casing and all.
fn performer_records() -> Vec<serde_json::Value> {
    vec![
        json!({ "Id": 1, "ScheduleStatus": "Confirmed", "PaymentStatus": "Paid",
                "BookingDate": "2024-06-01T00:00:00", "Slots": [1, 2] }),
        json!({ "id": 2, "scheduleStatus": "Pending", "paymentStatus": "Unpaid",
                "bookingDate": "2024-06-01", "slots": [6] }),
        json!({ "id": 3, "scheduleStatus": "Pending",
                "startTime": "2024-06-01T18:30:00", "endTime": "2024-06-01T20:00:00" }),
        json!({ "id": 4, "scheduleStatus": "Canceled", "bookingDate": "2024-06-01", "slots": [11] }),
        json!({ "id": 5, "scheduleStatus": "Confirmed", "bookingDate": "2024-06-02", "slots": [3] }),
        json!({ "id": 6, "scheduleStatus": "Confirmed" }),
        json!({ "id": 7, "scheduleStatus": "Confirmed", "startTime": "soon", "endTime": "later" }),
    ]
}

// ── Performer booking ───────────────────────────────────────

#[test]
fn performer_booking_end_to_end() {
    let reservations = normalize_all(&performer_records());
    // Record 7 has unparseable times; record 6 normalizes but carries no date.
    assert_eq!(reservations.len(), 6);

    let engine = Engine::from_config(&Config::default());
    let mut flow = BookingFlow::new(customer("dj-1"), BookingDomain::Performer, engine);

    flow.select_date(day(1)).unwrap();
    let blocked = flow.load_reservations(&reservations).unwrap().clone();
    // 1, 2 confirmed; 10 from the pending 18:30-20:00 range; 6 is pending but unpaid.
    assert_eq!(blocked.slots.iter().copied().collect::<Vec<_>>(), vec![1, 2, 10]);

    assert_eq!(flow.toggle_slot(10), Err(EngineError::SlotUnavailable(10)));
    for i in [4, 5, 7, 8, 9, 12] {
        flow.toggle_slot(i).unwrap();
    }
    assert_eq!(flow.state(), FlowState::SlotsChosen);

    flow.set_schedule(PricingSchedule::new(1_000_000, 850_000));
    let quote = flow.quote().unwrap();
    // Runs are 2, 3, 1; six slots qualify by count alone.
    assert_eq!(quote.tier, Tier::PerSession);
    assert_eq!(quote.total_price, 6 * 850_000);

    let request = flow.submit(2_000_000).unwrap();
    assert_eq!(request.remainder, 6 * 850_000 - 2_000_000);
    assert!(request.risk_warning);
    assert_eq!(request.account_id, "acc-42");

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["quote"]["tier"], "per-session");
    assert_eq!(json["date"], "2024-06-01");
}

#[test]
fn switching_dates_recomputes_availability() {
    let reservations = normalize_all(&performer_records());
    let mut flow = BookingFlow::new(customer("dj-1"), BookingDomain::Performer, Engine::default());

    flow.select_date(day(1)).unwrap();
    flow.load_reservations(&reservations).unwrap();
    flow.toggle_slot(3).unwrap();

    flow.select_date(day(2)).unwrap();
    assert!(flow.selection().is_empty());
    let blocked = flow.load_reservations(&reservations).unwrap();
    assert_eq!(blocked.date, day(2));
    assert_eq!(blocked.slots.iter().copied().collect::<Vec<_>>(), vec![3]);

    assert_eq!(flow.toggle_slot(3), Err(EngineError::SlotUnavailable(3)));
    assert!(flow.toggle_slot(4).unwrap());
    // Confirmed slot 3 on the new date sits right before the selection.
    assert!(flow.risk_warning());
}

// ── Table booking ───────────────────────────────────────────

#[test]
fn bar_table_booking_end_to_end() {
    let records = vec![
        json!({ "ScheduleStatus": "Pending", "PaymentStatus": "Paid", "BookingDate": "2024-06-01",
                "TableMap": { "0F1E-AA": { "TableName": "VIP 1" } } }),
        json!({ "scheduleStatus": "Pending", "paymentStatus": "Unpaid", "bookingDate": "2024-06-01",
                "tables": [{ "barTableId": "0f1e-bb" }] }),
        json!({ "scheduleStatus": "Confirmed", "bookingDate": "2024-06-01", "tableIds": ["0f1e-cc"] }),
        json!({ "scheduleStatus": "Rejected", "bookingDate": "2024-06-01", "tableIds": ["0f1e-dd"] }),
    ];
    let reservations = normalize_all(&records);
    assert_eq!(reservations.len(), 4);

    let mut flow = BookingFlow::new(customer("bar-9"), BookingDomain::Table, Engine::default());
    flow.select_date(day(1)).unwrap();
    let blocked = flow.load_reservations(&reservations).unwrap();
    assert!(blocked.is_table_blocked("0f1e-aa"));
    assert!(!blocked.is_table_blocked("0F1E-BB"));
    assert!(blocked.is_table_blocked("0F1E-CC"));
    assert!(!blocked.is_table_blocked("0f1e-dd"));

    assert!(matches!(flow.toggle_table("0F1E-AA"), Err(EngineError::TableUnavailable(_))));
    flow.toggle_table("0f1e-bb").unwrap();
    flow.toggle_table("0f1e-dd").unwrap();

    flow.set_schedule(PricingSchedule::new(300_000, 0));
    let quote = flow.quote().unwrap();
    assert_eq!(quote.total_price, 600_000);

    let request = flow.submit(0).unwrap();
    assert_eq!(request.tables.len(), 2);
    assert_eq!(request.remainder, 600_000);
}

//! Boundary conversion from backend reservation records to [`Reservation`].
//!
//! The backend is inconsistent about casing (`ScheduleStatus` vs
//! `scheduleStatus`) and about how tables are listed (an id → info object,
//! a list of ids, or a list of table objects). Everything is folded into one
//! canonical shape here so the availability filter never sees the variation.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::debug;

use crate::engine::EngineError;
use crate::limits::*;
use crate::model::*;

/// Accepted spellings per field, in lookup order. The first key present with a
/// non-null value wins, so a record carrying both `scheduleStatus` and
/// `status` is read from `scheduleStatus`.
const ID_KEYS: &[&str] = &["id", "Id", "bookingId", "BookingId"];
const STATUS_KEYS: &[&str] = &["scheduleStatus", "ScheduleStatus", "status", "Status"];
const PAYMENT_KEYS: &[&str] = &["paymentStatus", "PaymentStatus", "isPaid", "IsPaid"];
const DATE_KEYS: &[&str] = &["bookingDate", "BookingDate", "date", "Date"];
const START_KEYS: &[&str] = &["startTime", "StartTime"];
const END_KEYS: &[&str] = &["endTime", "EndTime"];
const SLOT_KEYS: &[&str] = &["slots", "Slots", "occupiedSlots", "OccupiedSlots"];
const TABLE_KEYS: &[&str] = &["tables", "Tables", "tableMap", "TableMap", "tableIds", "TableIds"];

/// A reservation record exactly as the backend sent it, one value per field.
#[derive(Debug, Clone, Default)]
pub struct RawReservation {
    pub id: Option<Value>,
    pub schedule_status: Option<Value>,
    pub payment_status: Option<Value>,
    pub booking_date: Option<Value>,
    pub start_time: Option<Value>,
    pub end_time: Option<Value>,
    pub slots: Option<Value>,
    pub tables: Option<Value>,
}

impl RawReservation {
    pub fn from_value(value: &Value) -> Result<Self, EngineError> {
        let obj = value.as_object().ok_or(EngineError::Malformed("record is not an object"))?;
        Ok(Self::from_map(obj))
    }

    fn from_map(obj: &Map<String, Value>) -> Self {
        let field = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| obj.get(*key))
                .find(|v| !v.is_null())
                .cloned()
        };
        Self {
            id: field(ID_KEYS),
            schedule_status: field(STATUS_KEYS),
            payment_status: field(PAYMENT_KEYS),
            booking_date: field(DATE_KEYS),
            start_time: field(START_KEYS),
            end_time: field(END_KEYS),
            slots: field(SLOT_KEYS),
            tables: field(TABLE_KEYS),
        }
    }
}

pub fn normalize(raw: &RawReservation) -> Result<Reservation, EngineError> {
    let status = raw
        .schedule_status
        .as_ref()
        .ok_or(EngineError::Malformed("missing status"))
        .and_then(parse_status)?;
    let payment = raw.payment_status.as_ref().map_or(Ok(PaymentStatus::Unknown), parse_payment)?;
    let date = raw.booking_date.as_ref().map(parse_date).transpose()?;

    let start = raw.start_time.as_ref().map(parse_datetime).transpose()?;
    let end = raw.end_time.as_ref().map(parse_datetime).transpose()?;
    let range = match (start, end) {
        (Some(s), Some(e)) => Some(TimeRange::new(s, e)),
        (None, None) => None,
        _ => return Err(EngineError::Malformed("incomplete time range")),
    };

    let slots = raw.slots.as_ref().map(parse_slots).transpose()?;
    let tables = raw.tables.as_ref().map(parse_tables).transpose()?;

    let occupancy = if let Some(slots) = slots.filter(|s| !s.is_empty()) {
        Occupancy::Slots(slots)
    } else if let Some(tables) = tables.filter(|t| !t.is_empty()) {
        Occupancy::Tables(tables)
    } else if let Some(range) = range {
        Occupancy::Range(range)
    } else {
        Occupancy::Unspecified
    };

    Ok(Reservation {
        id: raw.id.as_ref().and_then(scalar_string),
        status,
        payment,
        date,
        occupancy,
    })
}

/// Normalize a batch, dropping records that cannot be understood.
///
/// Every record is examined; a batch is never cut short, since a skipped
/// confirmed booking would show its slots as open.
pub fn normalize_all(records: &[Value]) -> Vec<Reservation> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, value)| {
            let result = RawReservation::from_value(value).and_then(|raw| normalize(&raw));
            match result {
                Ok(r) => Some(r),
                Err(e) => {
                    debug!("dropping reservation record {i}: {e}");
                    let reason = match e {
                        EngineError::Malformed(reason) => reason,
                        _ => "other",
                    };
                    metrics::counter!(crate::observability::RESERVATIONS_DROPPED_TOTAL, "reason" => reason)
                        .increment(1);
                    None
                }
            }
        })
        .collect()
}

// ── Field parsers ─────────────────────────────────────────────

fn parse_status(value: &Value) -> Result<ScheduleStatus, EngineError> {
    let s = value.as_str().ok_or(EngineError::Malformed("status is not a string"))?;
    match s.trim().to_ascii_lowercase().as_str() {
        "pending" => Ok(ScheduleStatus::Pending),
        "confirmed" => Ok(ScheduleStatus::Confirmed),
        "rejected" => Ok(ScheduleStatus::Rejected),
        "canceled" | "cancelled" => Ok(ScheduleStatus::Canceled),
        "ended" => Ok(ScheduleStatus::Ended),
        _ => Err(EngineError::Malformed("unknown status")),
    }
}

fn parse_payment(value: &Value) -> Result<PaymentStatus, EngineError> {
    match value {
        Value::Null => Ok(PaymentStatus::Unknown),
        Value::Bool(true) => Ok(PaymentStatus::Paid),
        Value::Bool(false) => Ok(PaymentStatus::Unpaid),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(PaymentStatus::Paid),
            "unpaid" | "notpaid" | "not_paid" => Ok(PaymentStatus::Unpaid),
            "" => Ok(PaymentStatus::Unknown),
            _ => Err(EngineError::Malformed("unknown payment status")),
        },
        _ => Err(EngineError::Malformed("payment status is not a string")),
    }
}

fn parse_date(value: &Value) -> Result<NaiveDate, EngineError> {
    let s = value.as_str().ok_or(EngineError::Malformed("date is not a string"))?.trim();
    // Datetimes carry the calendar day in their first ten characters.
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| EngineError::Malformed("unparseable date"))
}

fn parse_datetime(value: &Value) -> Result<NaiveDateTime, EngineError> {
    let s = value.as_str().ok_or(EngineError::Malformed("time is not a string"))?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        // Wall-clock time at the venue, as written by the backend.
        return Ok(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or(EngineError::Malformed("unparseable time"))
}

fn parse_slots(value: &Value) -> Result<BTreeSet<SlotIndex>, EngineError> {
    let items = value.as_array().ok_or(EngineError::Malformed("slots is not a list"))?;
    items
        .iter()
        .map(|item| {
            let n = match item {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            n.and_then(|n| SlotIndex::try_from(n).ok())
                .ok_or(EngineError::Malformed("bad slot index"))
        })
        .collect()
}

fn parse_tables(value: &Value) -> Result<BTreeSet<TableId>, EngineError> {
    let raw_ids: Vec<String> = match value {
        Value::Object(map) => map.keys().cloned().collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(obj) => ["tableId", "TableId", "barTableId", "BarTableId", "id", "Id"]
                    .iter()
                    .find_map(|key| obj.get(*key).and_then(scalar_string))
                    .ok_or(EngineError::Malformed("table entry without id")),
                other => scalar_string(other).ok_or(EngineError::Malformed("bad table id")),
            })
            .collect::<Result<_, _>>()?,
        Value::String(s) => vec![s.clone()],
        _ => return Err(EngineError::Malformed("tables is not a map or list")),
    };

    let mut ids = BTreeSet::new();
    for raw in raw_ids {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.len() > MAX_TABLE_ID_LEN {
            return Err(EngineError::Malformed("table id too long"));
        }
        ids.insert(TableId::new(trimmed));
    }
    Ok(ids)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

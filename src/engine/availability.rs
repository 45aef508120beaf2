use chrono::NaiveDate;

use crate::model::*;

use super::conflict::{is_blocking, is_confirmed};

// ── Availability Filter ───────────────────────────────────────────

/// Slots or tables held on `target_date` by reservations that pass the
/// domain's status gate.
///
/// 1. Status gate (see [`is_blocking`]).
/// 2. Calendar-day match; undated reservations are skipped.
/// 3. Explicit slots/tables are taken as-is. Any other reservation with a time
///    range is mapped onto the grid with [`SlotGrid::slots_covering`], in
///    both domains.
pub fn filter_blocking_reservations(
    target_date: NaiveDate,
    reservations: &[Reservation],
    domain: BookingDomain,
    grid: &SlotGrid,
) -> BlockedSet {
    collect_blocked(target_date, reservations, domain, grid, |r| {
        is_blocking(domain, r.status, r.payment)
    })
}

/// Like [`filter_blocking_reservations`] but only confirmed reservations count.
/// Feeds the earlier-engagement risk warning.
pub fn confirmed_only(
    target_date: NaiveDate,
    reservations: &[Reservation],
    domain: BookingDomain,
    grid: &SlotGrid,
) -> BlockedSet {
    collect_blocked(target_date, reservations, domain, grid, |r| is_confirmed(r.status))
}

fn collect_blocked(
    target_date: NaiveDate,
    reservations: &[Reservation],
    domain: BookingDomain,
    grid: &SlotGrid,
    gate: impl Fn(&Reservation) -> bool,
) -> BlockedSet {
    let mut blocked = BlockedSet::empty(target_date);

    for r in reservations {
        if !gate(r) {
            continue;
        }
        if r.calendar_date() != Some(target_date) {
            continue;
        }
        match (&r.occupancy, domain) {
            (Occupancy::Slots(slots), _) => {
                blocked.slots.extend(slots.iter().copied().filter(|i| grid.contains(*i)));
            }
            (Occupancy::Tables(tables), BookingDomain::Table) => {
                blocked.tables.extend(tables.iter().cloned());
            }
            (Occupancy::Range(range), _) => {
                if let Some(span) = range.span_on(target_date) {
                    blocked.slots.extend(grid.slots_covering(&span));
                }
            }
            // Table maps carry no slot information.
            (Occupancy::Tables(_), BookingDomain::Performer) | (Occupancy::Unspecified, _) => {}
        }
    }

    blocked
}

/// Slots on the grid still open after `blocked`.
pub fn open_slots(grid: &SlotGrid, blocked: &BlockedSet) -> Vec<SlotIndex> {
    (1..=grid.count).filter(|i| !blocked.is_slot_blocked(*i)).collect()
}

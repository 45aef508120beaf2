use chrono::NaiveDate;

use crate::model::*;

/// Whether a reservation in this state holds its slots or tables.
///
/// Performer: confirmed always blocks; pending blocks unless known unpaid.
/// Table: confirmed always blocks; pending blocks only once paid.
pub fn is_blocking(domain: BookingDomain, status: ScheduleStatus, payment: PaymentStatus) -> bool {
    match (status, domain) {
        (ScheduleStatus::Confirmed, _) => true,
        (ScheduleStatus::Pending, BookingDomain::Performer) => payment != PaymentStatus::Unpaid,
        (ScheduleStatus::Pending, BookingDomain::Table) => payment == PaymentStatus::Paid,
        (ScheduleStatus::Rejected | ScheduleStatus::Canceled | ScheduleStatus::Ended, _) => false,
    }
}

pub fn is_confirmed(status: ScheduleStatus) -> bool {
    status == ScheduleStatus::Confirmed
}

/// True if a blocked slot starts before the earliest selected slot.
///
/// An earlier confirmed engagement may overrun into the selection. Blocked
/// sets for another date never warn.
pub fn compute_risk_warning(target_date: NaiveDate, selected: &SelectionSet, blocked: &BlockedSet) -> bool {
    if blocked.date != target_date {
        return false;
    }
    let Some(first_selected) = selected.min() else {
        return false;
    };
    blocked
        .slots
        .first()
        .is_some_and(|&earliest| earliest < first_selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn blocked(slots: &[SlotIndex]) -> BlockedSet {
        let mut b = BlockedSet::empty(day());
        b.slots.extend(slots.iter().copied());
        b
    }

    fn sel(slots: &[SlotIndex]) -> SelectionSet {
        slots.iter().copied().collect()
    }

    #[test]
    fn performer_gate() {
        use PaymentStatus::*;
        use ScheduleStatus::*;
        let d = BookingDomain::Performer;
        assert!(is_blocking(d, Confirmed, Unpaid));
        assert!(is_blocking(d, Pending, Paid));
        assert!(is_blocking(d, Pending, Unknown));
        assert!(!is_blocking(d, Pending, Unpaid));
        for status in [Rejected, Canceled, Ended] {
            assert!(!is_blocking(d, status, Paid));
        }
    }

    #[test]
    fn table_gate() {
        use PaymentStatus::*;
        use ScheduleStatus::*;
        let d = BookingDomain::Table;
        assert!(is_blocking(d, Confirmed, Unpaid));
        assert!(is_blocking(d, Pending, Paid));
        assert!(!is_blocking(d, Pending, Unpaid));
        assert!(!is_blocking(d, Pending, Unknown));
        for status in [Rejected, Canceled, Ended] {
            assert!(!is_blocking(d, status, Paid));
        }
    }

    #[test]
    fn risk_when_confirmed_slot_precedes_selection() {
        assert!(compute_risk_warning(day(), &sel(&[3, 4]), &blocked(&[2])));
    }

    #[test]
    fn no_risk_when_nothing_precedes() {
        assert!(!compute_risk_warning(day(), &sel(&[1, 2]), &blocked(&[2])));
        assert!(!compute_risk_warning(day(), &sel(&[2, 3]), &blocked(&[2, 7])));
    }

    #[test]
    fn no_risk_for_empty_inputs() {
        assert!(!compute_risk_warning(day(), &sel(&[]), &blocked(&[1])));
        assert!(!compute_risk_warning(day(), &sel(&[5]), &blocked(&[])));
    }

    #[test]
    fn no_risk_across_dates() {
        let other = day().succ_opt().unwrap();
        assert!(!compute_risk_warning(other, &sel(&[5]), &blocked(&[1])));
    }
}

use crate::limits::*;
use crate::model::*;

// ── Tiered slot pricing ───────────────────────────────────────────

/// Thresholds that unlock the per-session price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    pub min_consecutive: u32,
    pub min_total: u32,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            min_consecutive: SESSION_MIN_CONSECUTIVE,
            min_total: SESSION_MIN_TOTAL,
        }
    }
}

impl TierPolicy {
    /// Either condition qualifies on its own.
    pub fn qualifies(&self, max_run: u32, total: u32) -> bool {
        max_run >= self.min_consecutive || total >= self.min_total
    }
}

/// Length of the longest run of consecutive slot indices. 0 for an empty set.
pub fn max_consecutive_run(selected: &SelectionSet) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<SlotIndex> = None;
    for idx in selected.iter() {
        run = match prev {
            Some(p) if idx == p + 1 => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(idx);
    }
    best
}

pub fn compute_quote(selected: &SelectionSet, schedule: &PricingSchedule) -> PriceQuote {
    compute_quote_with(selected, schedule, &TierPolicy::default())
}

/// Price a selection. Never fails; unpriced schedules produce [`PriceQuote::ZERO`].
pub fn compute_quote_with(
    selected: &SelectionSet,
    schedule: &PricingSchedule,
    policy: &TierPolicy,
) -> PriceQuote {
    let per_slot = schedule.per_slot_price.max(0);
    let per_session = schedule.per_session_price.max(0);
    if selected.is_empty() || (per_slot == 0 && per_session == 0) {
        return PriceQuote::ZERO;
    }

    let count = selected.len() as u32;
    let (unit_price, tier) = if per_session > 0 && policy.qualifies(max_consecutive_run(selected), count) {
        (per_session, Tier::PerSession)
    } else {
        (per_slot, Tier::PerSlot)
    };

    PriceQuote {
        unit_price,
        total_price: unit_price.saturating_mul(count as Amount),
        tier,
    }
}

/// Price a bar table booking: each table at the per-slot rate, no session tier.
pub fn table_quote(table_count: usize, schedule: &PricingSchedule) -> PriceQuote {
    let unit_price = schedule.per_slot_price.max(0);
    if table_count == 0 || unit_price == 0 {
        return PriceQuote::ZERO;
    }
    PriceQuote {
        unit_price,
        total_price: unit_price.saturating_mul(table_count as Amount),
        tier: Tier::PerSlot,
    }
}

/// Amount still owed after the deposit, floored at zero.
pub fn deposit_remainder(total_price: Amount, deposit: Amount) -> Amount {
    total_price.saturating_sub(deposit).max(0)
}

mod availability;
mod conflict;
mod error;
mod pricing;

pub use availability::{confirmed_only, filter_blocking_reservations, open_slots};
pub use conflict::{compute_risk_warning, is_blocking, is_confirmed};
pub use error::EngineError;
pub use pricing::{
    TierPolicy, compute_quote, compute_quote_with, deposit_remainder, max_consecutive_run, table_quote,
};

use chrono::NaiveDate;

use crate::config::Config;
use crate::model::*;

/// Slot grid and tier policy shared by every computation of one booking flow.
///
/// All methods are pure over their arguments; the engine only carries
/// configuration and records metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engine {
    pub grid: SlotGrid,
    pub policy: TierPolicy,
}

impl Engine {
    pub fn new(grid: SlotGrid, policy: TierPolicy) -> Self {
        Self { grid, policy }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            grid: SlotGrid::new(config.slot_count, config.slot_hours),
            policy: TierPolicy {
                min_consecutive: config.session_min_run,
                min_total: config.session_min_total,
            },
        }
    }

    pub fn quote(&self, selected: &SelectionSet, schedule: &PricingSchedule) -> PriceQuote {
        let quote = compute_quote_with(selected, schedule, &self.policy);
        metrics::counter!(crate::observability::QUOTES_TOTAL, "tier" => quote.tier.as_str()).increment(1);
        quote
    }

    pub fn blocked(
        &self,
        target_date: NaiveDate,
        reservations: &[Reservation],
        domain: BookingDomain,
    ) -> BlockedSet {
        filter_blocking_reservations(target_date, reservations, domain, &self.grid)
    }

    pub fn confirmed(
        &self,
        target_date: NaiveDate,
        reservations: &[Reservation],
        domain: BookingDomain,
    ) -> BlockedSet {
        confirmed_only(target_date, reservations, domain, &self.grid)
    }

    pub fn risk_warning(&self, target_date: NaiveDate, selected: &SelectionSet, blocked: &BlockedSet) -> bool {
        compute_risk_warning(target_date, selected, blocked)
    }

    pub fn slots(&self) -> Vec<Slot> {
        self.grid.slots()
    }
}

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ulid::Ulid;

use crate::engine::{Engine, EngineError, deposit_remainder, table_quote};
use crate::model::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Performer,
    Bar,
}

/// Who is booking what. Resolved by the caller and passed in; the flow never
/// looks up session state on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub account_id: String,
    pub role: Role,
    /// Performer or bar being booked.
    pub target_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    DateSelected,
    SlotsSelectable,
    SlotsChosen,
    QuoteReady,
    Submitted,
}

impl FlowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::DateSelected => "date selected",
            FlowState::SlotsSelectable => "slots selectable",
            FlowState::SlotsChosen => "slots chosen",
            FlowState::QuoteReady => "quote ready",
            FlowState::Submitted => "submitted",
        }
    }
}

/// Payload handed to the backend when the flow is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub draft_id: Ulid,
    pub account_id: String,
    pub target_id: String,
    pub domain: BookingDomain,
    pub date: NaiveDate,
    pub slots: Vec<SlotIndex>,
    pub tables: Vec<TableId>,
    pub quote: PriceQuote,
    pub deposit: Amount,
    pub remainder: Amount,
    pub risk_warning: bool,
}

/// One customer's booking form, from opening to submission.
pub struct BookingFlow {
    pub id: Ulid,
    session: SessionContext,
    domain: BookingDomain,
    engine: Engine,
    state: FlowState,
    date: Option<NaiveDate>,
    selection: SelectionSet,
    tables: BTreeSet<TableId>,
    blocked: Option<BlockedSet>,
    confirmed: Option<BlockedSet>,
    schedule: PricingSchedule,
    quote: Option<PriceQuote>,
}

impl BookingFlow {
    pub fn new(session: SessionContext, domain: BookingDomain, engine: Engine) -> Self {
        Self {
            id: Ulid::new(),
            session,
            domain,
            engine,
            state: FlowState::Idle,
            date: None,
            selection: SelectionSet::new(),
            tables: BTreeSet::new(),
            blocked: None,
            confirmed: None,
            schedule: PricingSchedule::default(),
            quote: None,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn tables(&self) -> &BTreeSet<TableId> {
        &self.tables
    }

    pub fn blocked(&self) -> Option<&BlockedSet> {
        self.blocked.as_ref()
    }

    fn transition(&mut self, next: FlowState) {
        if self.state != next {
            debug!(flow = %self.id, "{} -> {}", self.state.as_str(), next.as_str());
            self.state = next;
        }
    }

    fn ensure_open(&self, action: &'static str) -> Result<(), EngineError> {
        if self.state == FlowState::Submitted {
            return Err(EngineError::InvalidTransition {
                state: self.state.as_str(),
                action,
            });
        }
        Ok(())
    }

    fn ensure_selectable(&self, action: &'static str) -> Result<(), EngineError> {
        match self.state {
            FlowState::SlotsSelectable | FlowState::SlotsChosen | FlowState::QuoteReady => Ok(()),
            state => Err(EngineError::InvalidTransition {
                state: state.as_str(),
                action,
            }),
        }
    }

    /// Pick (or change) the target date. Any previous selection and
    /// availability are discarded.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), EngineError> {
        self.ensure_open("select a date")?;
        self.date = Some(date);
        self.selection.clear();
        self.tables.clear();
        self.blocked = None;
        self.confirmed = None;
        self.quote = None;
        self.transition(FlowState::DateSelected);
        Ok(())
    }

    /// Feed the reservations fetched for the current date.
    ///
    /// May be called again with a fresher list; choices that became blocked
    /// are removed from the selection.
    pub fn load_reservations(&mut self, reservations: &[Reservation]) -> Result<&BlockedSet, EngineError> {
        self.ensure_open("load reservations")?;
        let date = self.date.ok_or(EngineError::InvalidTransition {
            state: self.state.as_str(),
            action: "load reservations",
        })?;

        let blocked = self.engine.blocked(date, reservations, self.domain);
        let confirmed = self.engine.confirmed(date, reservations, self.domain);

        let stale: Vec<SlotIndex> = self.selection.iter().filter(|i| blocked.is_slot_blocked(*i)).collect();
        for i in stale {
            self.selection.toggle(i);
        }
        self.tables.retain(|t| !blocked.tables.contains(t));

        self.confirmed = Some(confirmed);
        self.after_selection_change();
        Ok(&*self.blocked.insert(blocked))
    }

    fn after_selection_change(&mut self) {
        self.quote = None;
        let chosen = match self.domain {
            BookingDomain::Performer => !self.selection.is_empty(),
            BookingDomain::Table => !self.tables.is_empty(),
        };
        self.transition(if chosen {
            FlowState::SlotsChosen
        } else {
            FlowState::SlotsSelectable
        });
    }

    /// Toggle one performer slot. Returns true when the slot is now selected.
    pub fn toggle_slot(&mut self, index: SlotIndex) -> Result<bool, EngineError> {
        self.ensure_selectable("toggle a slot")?;
        if self.domain != BookingDomain::Performer {
            return Err(EngineError::WrongDomain("slots belong to performer bookings"));
        }
        if !self.engine.grid.contains(index) {
            return Err(EngineError::SlotOutOfRange(index));
        }
        let is_blocked = self.blocked.as_ref().is_some_and(|b| b.is_slot_blocked(index));
        if is_blocked && !self.selection.contains(index) {
            return Err(EngineError::SlotUnavailable(index));
        }
        let selected = self.selection.toggle(index);
        self.after_selection_change();
        Ok(selected)
    }

    /// Toggle one bar table. Returns true when the table is now selected.
    pub fn toggle_table(&mut self, raw_id: &str) -> Result<bool, EngineError> {
        self.ensure_selectable("toggle a table")?;
        if self.domain != BookingDomain::Table {
            return Err(EngineError::WrongDomain("tables belong to bar bookings"));
        }
        let id = TableId::new(raw_id);
        let selected = if self.tables.remove(&id) {
            false
        } else {
            if self.blocked.as_ref().is_some_and(|b| b.tables.contains(&id)) {
                return Err(EngineError::TableUnavailable(id.to_string()));
            }
            self.tables.insert(id);
            true
        };
        self.after_selection_change();
        Ok(selected)
    }

    pub fn set_schedule(&mut self, schedule: PricingSchedule) {
        self.schedule = schedule;
        if self.state == FlowState::QuoteReady {
            self.quote = None;
            self.transition(FlowState::SlotsChosen);
        }
    }

    /// Price the current selection.
    ///
    /// Table bookings are priced per selected table using the per-slot rate.
    pub fn quote(&mut self) -> Result<PriceQuote, EngineError> {
        match self.state {
            FlowState::SlotsChosen | FlowState::QuoteReady => {}
            FlowState::SlotsSelectable => return Err(EngineError::EmptySelection),
            state => {
                return Err(EngineError::InvalidTransition {
                    state: state.as_str(),
                    action: "quote",
                });
            }
        }
        let quote = match self.domain {
            BookingDomain::Performer => self.engine.quote(&self.selection, &self.schedule),
            BookingDomain::Table => table_quote(self.tables.len(), &self.schedule),
        };
        self.quote = Some(quote);
        self.transition(FlowState::QuoteReady);
        Ok(quote)
    }

    /// An earlier confirmed engagement on the same day may overrun into the selection.
    pub fn risk_warning(&self) -> bool {
        match (self.date, &self.confirmed) {
            (Some(date), Some(confirmed)) => self.engine.risk_warning(date, &self.selection, confirmed),
            _ => false,
        }
    }

    pub fn submit(&mut self, deposit: Amount) -> Result<BookingRequest, EngineError> {
        let (Some(date), Some(quote), FlowState::QuoteReady) = (self.date, self.quote, self.state) else {
            return Err(EngineError::InvalidTransition {
                state: self.state.as_str(),
                action: "submit",
            });
        };
        let risk_warning = self.risk_warning();
        let request = BookingRequest {
            draft_id: self.id,
            account_id: self.session.account_id.clone(),
            target_id: self.session.target_id.clone(),
            domain: self.domain,
            date,
            slots: self.selection.iter().collect(),
            tables: self.tables.iter().cloned().collect(),
            quote,
            deposit,
            remainder: deposit_remainder(quote.total_price, deposit),
            risk_warning,
        };
        self.transition(FlowState::Submitted);
        metrics::counter!(crate::observability::FLOW_SUBMITTED_TOTAL, "domain" => self.domain.as_str()).increment(1);
        if risk_warning {
            metrics::counter!(crate::observability::RISK_WARNINGS_TOTAL).increment(1);
        }
        Ok(request)
    }
}

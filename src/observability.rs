/// Counter: quotes computed. Labels: tier.
pub const QUOTES_TOTAL: &str = "nightbook_quotes_total";

/// Counter: raw reservation records dropped during normalization. Labels: reason.
pub const RESERVATIONS_DROPPED_TOTAL: &str = "nightbook_reservations_dropped_total";

/// Counter: booking flows that reached submission. Labels: domain.
pub const FLOW_SUBMITTED_TOTAL: &str = "nightbook_flow_submitted_total";

/// Counter: risk warnings raised for a submitted selection.
pub const RISK_WARNINGS_TOTAL: &str = "nightbook_risk_warnings_total";

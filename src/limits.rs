/// Slots per performer booking day.
pub const DEFAULT_SLOT_COUNT: u32 = 12;

/// Length of one slot in hours.
pub const DEFAULT_SLOT_HOURS: u32 = 2;

/// Longest consecutive run that unlocks the per-session price.
pub const SESSION_MIN_CONSECUTIVE: u32 = 4;

/// Total selected slots that unlock the per-session price, consecutive or not.
pub const SESSION_MIN_TOTAL: u32 = 6;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Upper bound for a configured grid (15-minute slots).
pub const MAX_SLOT_COUNT: u32 = 96;

pub const MAX_TABLE_ID_LEN: usize = 128;

use crate::model::SlotIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    SlotOutOfRange(SlotIndex),
    SlotUnavailable(SlotIndex),
    TableUnavailable(String),
    EmptySelection,
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    WrongDomain(&'static str),
    Malformed(&'static str),
    InvalidConfig(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::SlotOutOfRange(i) => write!(f, "slot {i} is outside the booking grid"),
            EngineError::SlotUnavailable(i) => write!(f, "slot {i} is already taken"),
            EngineError::TableUnavailable(id) => write!(f, "table {id} is already taken"),
            EngineError::EmptySelection => write!(f, "nothing selected"),
            EngineError::InvalidTransition { state, action } => {
                write!(f, "cannot {action} while {state}")
            }
            EngineError::WrongDomain(msg) => write!(f, "wrong booking domain: {msg}"),
            EngineError::Malformed(msg) => write!(f, "malformed reservation: {msg}"),
            EngineError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

use thiserror::Error;

/// Erreurs structurelles du moteur (mauvaise configuration) : fatales.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimesheetError {
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
    #[error("duplicate template: {0}")]
    DuplicateTemplate(String),
    #[error("invalid template {id}: {reason}")]
    InvalidTemplate { id: String, reason: String },
    #[error("day {day} out of range 1..={days_in_month}")]
    DayOutOfRange { day: u8, days_in_month: u8 },
}

#![forbid(unsafe_code)]
//! Tabel — génération et validation de tabels de présence (sans BD).
//!
//! - Gabarits de rotation cycliques, surcharges jour par jour (exceptions, absences).
//! - Totaux d'heures et écart à la norme, recalculés depuis le calendrier.
//! - Validation des cellules contre une liste de marqueurs autorisés.
//! - Roster déclaratif (JSON) ; exports CSV/JSON/XLSX.

pub mod audit;
pub mod config;
pub mod io;
pub mod model;
pub mod scheduler;
pub mod storage;
pub mod template;
pub mod validation;
pub mod view;

pub use audit::{AuditContext, AuditLog};
pub use config::TimesheetConfig;
pub use model::{
    Cell, DaySchedule, GroupTag, NumericRule, RosterTable, TemplateId, Worker, WorkerRecord,
};
pub use scheduler::{RosterBuilder, ScheduleGenerator, TimesheetError};
pub use template::{ShiftTemplate, TemplateRegistry};
pub use validation::{Diagnostic, ValidationRule, Validator};
pub use view::{CellChange, Filter, SortKey, Summary};

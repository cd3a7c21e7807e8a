use crate::model::{Cell, RosterTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::info;

/// Règle d'acceptation d'une cellule.
///
/// `Legacy` ne tolère que les marqueurs autorisés : toute cellule en heures
/// est signalée, comme dans l'outil historique. `HoursOrMarker` est la
/// correction (opt-in) qui accepte aussi les heures positives ou nulles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    #[default]
    Legacy,
    HoursOrMarker,
}

/// Anomalie relevée sur une cellule (non bloquante).
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub worker: String,
    pub day: u8,
    pub value: Cell,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} day {}: invalid value '{}'",
            self.worker, self.day, self.value
        )
    }
}

/// Validateur de cellules, en lecture seule.
#[derive(Debug, Clone)]
pub struct Validator {
    markers: BTreeSet<String>,
    rule: ValidationRule,
}

impl Validator {
    pub fn new<I, S>(markers: I, rule: ValidationRule) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
            rule,
        }
    }

    pub fn rule(&self) -> ValidationRule {
        self.rule
    }

    pub fn is_valid(&self, cell: &Cell) -> bool {
        match (cell, self.rule) {
            (Cell::Marker(m), _) => self.markers.contains(m),
            (Cell::Hours(_), ValidationRule::Legacy) => false,
            (Cell::Hours(h), ValidationRule::HoursOrMarker) => h.is_finite() && *h >= 0.0,
        }
    }

    /// Parcourt toutes les lignes puis tous les jours ; collecte tout.
    pub fn validate(&self, table: &RosterTable) -> Vec<Diagnostic> {
        let out: Vec<Diagnostic> = table
            .rows
            .iter()
            .flat_map(|row| {
                row.schedule()
                    .days()
                    .filter(|(_, cell)| !self.is_valid(cell))
                    .map(|(day, cell)| Diagnostic {
                        worker: row.worker.clone(),
                        day,
                        value: cell.clone(),
                    })
            })
            .collect();
        info!(
            rows = table.len(),
            diagnostics = out.len(),
            rule = ?self.rule,
            "table validated"
        );
        out
    }
}

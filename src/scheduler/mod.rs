mod generator;
mod roster;
mod types;

pub use types::TimesheetError;

use crate::model::{NumericRule, RosterTable, Worker, WorkerRecord};
use crate::template::TemplateRegistry;

/// Générateur de calendrier pour un salarié.
///
/// Le curseur du gabarit ne progresse que sur les jours sans surcharge ;
/// chaque appel repart de zéro.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleGenerator<'a> {
    registry: &'a TemplateRegistry,
    days_in_month: u8,
    norm_hours: f64,
    numeric_rule: NumericRule,
}

impl<'a> ScheduleGenerator<'a> {
    pub fn new(registry: &'a TemplateRegistry, days_in_month: u8, norm_hours: f64) -> Self {
        Self {
            registry,
            days_in_month,
            norm_hours,
            numeric_rule: NumericRule::default(),
        }
    }

    pub fn with_numeric_rule(mut self, rule: NumericRule) -> Self {
        self.numeric_rule = rule;
        self
    }

    pub fn days_in_month(&self) -> u8 {
        self.days_in_month
    }

    pub fn norm_hours(&self) -> f64 {
        self.norm_hours
    }

    pub fn numeric_rule(&self) -> NumericRule {
        self.numeric_rule
    }

    pub fn generate(&self, worker: &Worker) -> Result<WorkerRecord, TimesheetError> {
        generator::generate(self, worker)
    }
}

/// Construit le tabel complet, ligne par ligne, dans l'ordre de définition.
#[derive(Debug, Clone, Copy)]
pub struct RosterBuilder<'a> {
    generator: ScheduleGenerator<'a>,
}

impl<'a> RosterBuilder<'a> {
    pub fn new(generator: ScheduleGenerator<'a>) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &ScheduleGenerator<'a> {
        &self.generator
    }

    /// Échoue dès le premier gabarit inconnu, sans tabel partiel.
    pub fn build(&self, workers: &[Worker]) -> Result<RosterTable, TimesheetError> {
        roster::build(self, workers)
    }
}

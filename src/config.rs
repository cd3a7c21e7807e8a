use crate::model::{GroupTag, NumericRule, RosterTable, Worker};
use crate::scheduler::{RosterBuilder, ScheduleGenerator};
use crate::template::{ShiftTemplate, TemplateRegistry};
use crate::validation::{ValidationRule, Validator};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Roster par défaut, embarqué dans le binaire.
pub const DEFAULT_CONFIG_JSON: &str = include_str!("../data/default_roster.json");

fn default_days_in_month() -> u8 {
    28
}

fn default_norm_hours() -> f64 {
    160.0
}

fn default_markers() -> Vec<String> {
    vec![String::new()]
}

/// Description déclarative d'un tabel : constantes, gabarits et salariés.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetConfig {
    #[serde(default = "default_days_in_month")]
    pub days_in_month: u8,
    #[serde(default = "default_norm_hours")]
    pub norm_hours: f64,
    #[serde(default)]
    pub numeric_rule: NumericRule,
    #[serde(default)]
    pub validation_rule: ValidationRule,
    pub groups: Vec<GroupTag>,
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,
    pub templates: Vec<ShiftTemplate>,
    #[serde(default)]
    pub workers: Vec<Worker>,
}

impl TimesheetConfig {
    pub fn from_json(data: &str) -> Result<Self> {
        let config: TimesheetConfig =
            serde_json::from_str(data).context("parsing timesheet configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("loading config {}", path.display()))
    }

    /// Charge le fichier donné, ou le roster embarqué.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Self::from_json(DEFAULT_CONFIG_JSON),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Vérifie les constantes et les salariés. Les références de gabarit
    /// sont laissées au constructeur de roster.
    pub fn validate(&self) -> Result<()> {
        if self.days_in_month == 0 || self.days_in_month > 31 {
            bail!("days_in_month must be within 1..=31");
        }
        if !self.norm_hours.is_finite() || self.norm_hours < 0.0 {
            bail!("norm_hours must be a non-negative number");
        }
        if self.groups.is_empty() {
            bail!("at least one group must be declared");
        }
        for (i, group) in self.groups.iter().enumerate() {
            if group.as_str().trim().is_empty() {
                bail!("group tag cannot be empty");
            }
            if self.groups[..i].contains(group) {
                bail!("duplicate group: {group}");
            }
        }
        if !self.markers.iter().any(String::is_empty) {
            bail!("markers must include the empty marker \"\"");
        }
        for worker in &self.workers {
            if worker.name.trim().is_empty() {
                bail!("worker name cannot be empty");
            }
            if !self.groups.contains(&worker.group) {
                bail!("unknown group {} for worker {}", worker.group, worker.name);
            }
            let days = worker.exceptions.keys().chain(worker.absences.keys());
            for day in days {
                if *day == 0 || *day > self.days_in_month {
                    bail!(
                        "override day {day} out of range 1..={} for worker {}",
                        self.days_in_month,
                        worker.name
                    );
                }
            }
        }
        Ok(())
    }

    pub fn registry(&self) -> Result<TemplateRegistry> {
        TemplateRegistry::new(self.templates.clone()).context("building template registry")
    }

    pub fn generator<'a>(&self, registry: &'a TemplateRegistry) -> ScheduleGenerator<'a> {
        ScheduleGenerator::new(registry, self.days_in_month, self.norm_hours)
            .with_numeric_rule(self.numeric_rule)
    }

    /// Génère le tabel complet des salariés déclarés.
    pub fn build_table(&self) -> Result<RosterTable> {
        let registry = self.registry()?;
        let table = RosterBuilder::new(self.generator(&registry)).build(&self.workers)?;
        Ok(table)
    }

    pub fn validator(&self) -> Validator {
        Validator::new(self.markers.iter().cloned(), self.validation_rule)
    }
}

use crate::scheduler::TimesheetError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifiant fort pour un gabarit de rotation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Étiquette de groupe (brigade, bureau...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupTag(String);

impl GroupTag {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Règle de reconnaissance des valeurs numériques d'une cellule.
///
/// `Loose` reproduit le test historique « chiffres + au plus un point » :
/// `-3` ou `1e3` ne sont pas des heures. `Strict` accepte tout flottant fini.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericRule {
    #[default]
    Loose,
    Strict,
}

impl NumericRule {
    /// Heures comptabilisées pour une cellule (0 pour un marqueur).
    pub fn hours_of(self, cell: &Cell) -> f64 {
        match self {
            NumericRule::Strict => match cell {
                Cell::Hours(h) => *h,
                Cell::Marker(_) => 0.0,
            },
            NumericRule::Loose => {
                let text = cell.to_string();
                if is_loose_numeric(&text) {
                    text.parse().unwrap_or(0.0)
                } else {
                    0.0
                }
            }
        }
    }
}

/// Test historique : uniquement des chiffres, au plus un point, au moins un chiffre.
///
/// Seuls les chiffres ASCII sont reconnus : `"٣"` ou `"²"` restent des marqueurs
/// et ne comptent pas dans le total.
pub fn is_loose_numeric(raw: &str) -> bool {
    let mut digits = 0usize;
    let mut dots = 0usize;
    for c in raw.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

/// Valeur d'une cellule jour : des heures ou un code court (congé, arrêt...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Hours(f64),
    Marker(String),
}

impl Cell {
    /// Marqueur vide : pas de poste ce jour-là.
    pub fn empty() -> Self {
        Cell::Marker(String::new())
    }

    pub fn marker<S: Into<String>>(s: S) -> Self {
        Cell::Marker(s.into())
    }

    /// Interprète une saisie texte selon la règle numérique.
    pub fn parse(raw: &str, rule: NumericRule) -> Self {
        let numeric = match rule {
            NumericRule::Loose => is_loose_numeric(raw),
            NumericRule::Strict => true,
        };
        if numeric {
            if let Ok(h) = raw.parse::<f64>() {
                if h.is_finite() {
                    return Cell::Hours(h);
                }
            }
        }
        Cell::Marker(raw.to_owned())
    }

    pub fn is_hours(&self) -> bool {
        matches!(self, Cell::Hours(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Hours(h) => write!(f, "{h}"),
            Cell::Marker(m) => f.write_str(m),
        }
    }
}

/// Définition d'un salarié telle que déclarée dans la configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub name: String,
    pub group: GroupTag,
    pub template: TemplateId,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exceptions: BTreeMap<u8, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub absences: BTreeMap<u8, String>,
}

impl Worker {
    pub fn new<N: Into<String>>(name: N, group: GroupTag, template: TemplateId) -> Self {
        Self {
            name: name.into(),
            group,
            template,
            exceptions: BTreeMap::new(),
            absences: BTreeMap::new(),
        }
    }

    pub fn with_exception<V: Into<String>>(mut self, day: u8, value: V) -> Self {
        self.exceptions.insert(day, value.into());
        self
    }

    pub fn with_absence<V: Into<String>>(mut self, day: u8, value: V) -> Self {
        self.absences.insert(day, value.into());
        self
    }

    /// Surcharge applicable au jour : exception d'abord, puis absence.
    pub fn override_for(&self, day: u8) -> Option<&str> {
        self.exceptions
            .get(&day)
            .or_else(|| self.absences.get(&day))
            .map(String::as_str)
    }
}

/// Calendrier complet : le jour `d` est stocké à l'indice `d - 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule(Vec<Cell>);

impl DaySchedule {
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self(cells)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, day: u8) -> Option<&Cell> {
        usize::from(day).checked_sub(1).and_then(|i| self.0.get(i))
    }

    pub fn get_mut(&mut self, day: u8) -> Option<&mut Cell> {
        usize::from(day).checked_sub(1).and_then(move |i| self.0.get_mut(i))
    }

    /// Itère `(jour, cellule)` dans l'ordre des jours.
    pub fn days(&self) -> impl Iterator<Item = (u8, &Cell)> + '_ {
        self.0.iter().enumerate().map(|(i, c)| (i as u8 + 1, c))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.0
    }
}

/// Arrondi à une décimale, au pair le plus proche sur la valeur binaire exacte
/// (`0.25` donne `0.2`, `0.35` donne `0.3`).
pub fn round1(x: f64) -> f64 {
    format!("{x:.1}").parse().unwrap_or(x)
}

/// Ligne du tabel. Le total et l'écart sont recalculés à chaque appel.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerRecord {
    pub worker: String,
    pub group: GroupTag,
    schedule: DaySchedule,
    rule: NumericRule,
    norm_hours: f64,
}

impl WorkerRecord {
    pub fn new(
        worker: String,
        group: GroupTag,
        schedule: DaySchedule,
        rule: NumericRule,
        norm_hours: f64,
    ) -> Self {
        Self {
            worker,
            group,
            schedule,
            rule,
            norm_hours,
        }
    }

    pub fn schedule(&self) -> &DaySchedule {
        &self.schedule
    }

    pub fn cell(&self, day: u8) -> Option<&Cell> {
        self.schedule.get(day)
    }

    /// Modifie une cellule d'une copie éditée (sans effet sur la définition du salarié).
    pub fn set_cell(&mut self, day: u8, value: Cell) -> Result<(), TimesheetError> {
        let days_in_month = self.schedule.len() as u8;
        let slot = self
            .schedule
            .get_mut(day)
            .ok_or(TimesheetError::DayOutOfRange { day, days_in_month })?;
        *slot = value;
        Ok(())
    }

    pub fn numeric_rule(&self) -> NumericRule {
        self.rule
    }

    pub fn norm_hours(&self) -> f64 {
        self.norm_hours
    }

    fn raw_total(&self) -> f64 {
        self.schedule
            .cells()
            .iter()
            .map(|c| self.rule.hours_of(c))
            .sum()
    }

    /// Heures effectuées (« Fact »), arrondies à une décimale.
    pub fn fact_hours(&self) -> f64 {
        round1(self.raw_total())
    }

    /// Écart à la norme : `round(total - norme, 1)`.
    pub fn deviation(&self) -> f64 {
        round1(self.raw_total() - self.norm_hours)
    }
}

/// Tabel complet, dans l'ordre de définition du roster.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RosterTable {
    pub days_in_month: u8,
    pub rows: Vec<WorkerRecord>,
}

impl RosterTable {
    pub fn new(days_in_month: u8, rows: Vec<WorkerRecord>) -> Self {
        Self {
            days_in_month,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find_by_worker<'a>(&'a self, name: &str) -> Option<&'a WorkerRecord> {
        self.rows.iter().find(|r| r.worker == name)
    }

    pub fn find_mut_by_worker(&mut self, name: &str) -> Option<&mut WorkerRecord> {
        self.rows.iter_mut().find(|r| r.worker == name)
    }
}

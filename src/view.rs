//! Vues du tabel : filtres, tris, indicateurs et détection des modifications.
//!
//! Rien ici ne modifie le tabel d'origine ; chaque vue renvoie des références
//! ou des données dérivées.

use crate::model::{Cell, GroupTag, RosterTable, WorkerRecord};
use std::cmp::Ordering;

/// Critères de filtrage (tous optionnels, combinés en ET).
#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// Sous-chaîne du nom, insensible à la casse.
    pub search: Option<String>,
    /// Groupes retenus ; vide = tous.
    pub groups: Vec<GroupTag>,
    /// Seulement les lignes en dépassement (`deviation > 0`).
    pub overtime_only: bool,
}

impl Filter {
    pub fn matches(&self, row: &WorkerRecord) -> bool {
        if let Some(query) = &self.search {
            if !row.worker.to_lowercase().contains(&query.to_lowercase()) {
                return false;
            }
        }
        if !self.groups.is_empty() && !self.groups.contains(&row.group) {
            return false;
        }
        if self.overtime_only && row.deviation() <= 0.0 {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, table: &'a RosterTable) -> Vec<&'a WorkerRecord> {
        table.rows.iter().filter(|r| self.matches(r)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Worker,
    Group,
    Day(u8),
    Fact,
    Deviation,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "worker" | "name" => Ok(SortKey::Worker),
            "group" => Ok(SortKey::Group),
            "fact" => Ok(SortKey::Fact),
            "deviation" => Ok(SortKey::Deviation),
            other => other
                .strip_prefix("day:")
                .and_then(|d| d.parse::<u8>().ok())
                .map(SortKey::Day)
                .ok_or_else(|| format!("unknown sort key: {other}")),
        }
    }
}

/// Ordre des cellules : heures par valeur, puis marqueurs par texte.
pub fn compare_cells(a: &Cell, b: &Cell) -> Ordering {
    match (a, b) {
        (Cell::Hours(x), Cell::Hours(y)) => x.total_cmp(y),
        (Cell::Hours(_), Cell::Marker(_)) => Ordering::Less,
        (Cell::Marker(_), Cell::Hours(_)) => Ordering::Greater,
        (Cell::Marker(x), Cell::Marker(y)) => x.cmp(y),
    }
}

fn compare_rows(key: SortKey, a: &WorkerRecord, b: &WorkerRecord) -> Ordering {
    match key {
        SortKey::Worker => a.worker.cmp(&b.worker),
        SortKey::Group => a.group.cmp(&b.group),
        SortKey::Fact => a.fact_hours().total_cmp(&b.fact_hours()),
        SortKey::Deviation => a.deviation().total_cmp(&b.deviation()),
        SortKey::Day(day) => match (a.cell(day), b.cell(day)) {
            (Some(x), Some(y)) => compare_cells(x, y),
            (x, y) => x.is_some().cmp(&y.is_some()),
        },
    }
}

/// Tri stable des lignes.
pub fn sort_rows(rows: &mut [&WorkerRecord], key: SortKey, descending: bool) {
    rows.sort_by(|a, b| {
        let ord = compare_rows(key, a, b);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

/// Indicateurs clés du tabel.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub workers: usize,
    pub average_fact: Option<f64>,
    pub overtime: usize,
    /// Effectif par groupe, du plus grand au plus petit.
    pub per_group: Vec<(GroupTag, usize)>,
}

pub fn summarize<'a, I>(rows: I) -> Summary
where
    I: IntoIterator<Item = &'a WorkerRecord>,
{
    let mut workers = 0usize;
    let mut fact_sum = 0.0;
    let mut overtime = 0usize;
    let mut per_group: Vec<(GroupTag, usize)> = Vec::new();

    for row in rows {
        workers += 1;
        fact_sum += row.fact_hours();
        if row.deviation() > 0.0 {
            overtime += 1;
        }
        match per_group.iter_mut().find(|(g, _)| *g == row.group) {
            Some((_, n)) => *n += 1,
            None => per_group.push((row.group.clone(), 1)),
        }
    }
    // tri stable : à effectif égal, ordre d'apparition
    per_group.sort_by(|a, b| b.1.cmp(&a.1));

    Summary {
        workers,
        average_fact: (workers > 0).then(|| fact_sum / workers as f64),
        overtime,
        per_group,
    }
}

/// Modification d'une cellule entre deux versions du tabel.
#[derive(Debug, Clone, PartialEq)]
pub struct CellChange {
    pub worker: String,
    pub day: u8,
    pub before: Cell,
    pub after: Cell,
}

/// Compare un tabel édité à sa version générée, salarié par salarié.
/// Les salariés absents de l'une des deux versions sont ignorés.
pub fn diff(before: &RosterTable, after: &RosterTable) -> Vec<CellChange> {
    let mut out = Vec::new();
    for row in &before.rows {
        let Some(edited) = after.find_by_worker(&row.worker) else {
            continue;
        };
        for (day, cell) in row.schedule().days() {
            if let Some(new) = edited.cell(day) {
                if new != cell {
                    out.push(CellChange {
                        worker: row.worker.clone(),
                        day,
                        before: cell.clone(),
                        after: new.clone(),
                    });
                }
            }
        }
    }
    out
}

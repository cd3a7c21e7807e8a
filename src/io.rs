use crate::model::{Cell, DaySchedule, GroupTag, NumericRule, RosterTable, WorkerRecord};
use crate::storage::write_atomic;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use rust_xlsxwriter::{Format, Workbook};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const COL_WORKER: &str = "worker";
pub const COL_GROUP: &str = "group";
pub const COL_FACT: &str = "fact";
pub const COL_DEVIATION: &str = "deviation";

/// En-tête du tabel : `worker,group,1..N,fact,deviation`
pub fn table_header(days_in_month: u8) -> Vec<String> {
    let mut buf = itoa::Buffer::new();
    let mut out = Vec::with_capacity(usize::from(days_in_month) + 4);
    out.push(COL_WORKER.to_string());
    out.push(COL_GROUP.to_string());
    out.extend((1..=days_in_month).map(|d| buf.format(d).to_string()));
    out.push(COL_FACT.to_string());
    out.push(COL_DEVIATION.to_string());
    out
}

fn row_fields(row: &WorkerRecord) -> Vec<String> {
    let mut out = Vec::with_capacity(row.schedule().len() + 4);
    out.push(row.worker.clone());
    out.push(row.group.as_str().to_string());
    out.extend(row.schedule().cells().iter().map(Cell::to_string));
    out.push(row.fact_hours().to_string());
    out.push(row.deviation().to_string());
    out
}

/// Rendu CSV du tabel (en mémoire).
pub fn table_to_csv(table: &RosterTable) -> anyhow::Result<Vec<u8>> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    w.write_record(table_header(table.days_in_month))?;
    for row in &table.rows {
        w.write_record(row_fields(row))?;
    }
    w.into_inner()
        .map_err(|e| anyhow::anyhow!("flushing csv writer: {}", e.error()))
}

pub fn export_table_csv<P: AsRef<Path>>(path: P, table: &RosterTable) -> anyhow::Result<()> {
    write_atomic(path, &table_to_csv(table)?)
}

/// Import d'un tabel édité : header `worker,group,1..N[,fact,deviation]`.
/// Les colonnes `fact` et `deviation` sont ignorées et recalculées.
pub fn import_table_csv<P: AsRef<Path>>(
    path: P,
    rule: NumericRule,
    norm_hours: f64,
) -> anyhow::Result<RosterTable> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let headers = rdr.headers()?.clone();
    if headers.get(0).map(str::trim) != Some(COL_WORKER)
        || headers.get(1).map(str::trim) != Some(COL_GROUP)
    {
        bail!("table header must start with `{COL_WORKER},{COL_GROUP}`");
    }
    let mut days_in_month = 0u8;
    for (i, h) in headers.iter().skip(2).enumerate() {
        match u8::from_str(h.trim()) {
            Ok(d) if usize::from(d) == i + 1 => days_in_month = d,
            Ok(d) => bail!("unexpected day column {d} at position {}", i + 3),
            Err(_) => break,
        }
    }
    if days_in_month == 0 {
        bail!("table has no day columns");
    }

    let mut rows = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let worker = rec.get(0).context("missing worker")?.trim();
        let group = rec.get(1).context("missing group")?.trim();
        if worker.is_empty() {
            bail!("empty worker name on row {}", line + 1);
        }
        let cells = (1..=usize::from(days_in_month))
            .map(|d| {
                rec.get(d + 1)
                    .map(|raw| Cell::parse(raw, rule))
                    .with_context(|| format!("missing day {d} for worker {worker}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        rows.push(WorkerRecord::new(
            worker.to_string(),
            GroupTag::new(group),
            DaySchedule::from_cells(cells),
            rule,
            norm_hours,
        ));
    }
    Ok(RosterTable::new(days_in_month, rows))
}

fn cell_value(cell: &Cell) -> Value {
    match cell {
        Cell::Hours(h) => Value::from(*h),
        Cell::Marker(m) => Value::from(m.as_str()),
    }
}

/// Lignes JSON à plat, mêmes colonnes que le CSV.
pub fn table_to_json(table: &RosterTable) -> Value {
    let mut buf = itoa::Buffer::new();
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut obj = Map::new();
            obj.insert(COL_WORKER.into(), Value::from(row.worker.as_str()));
            obj.insert(COL_GROUP.into(), Value::from(row.group.as_str()));
            for (day, cell) in row.schedule().days() {
                obj.insert(buf.format(day).to_string(), cell_value(cell));
            }
            obj.insert(COL_FACT.into(), Value::from(row.fact_hours()));
            obj.insert(COL_DEVIATION.into(), Value::from(row.deviation()));
            Value::Object(obj)
        })
        .collect();
    Value::Array(rows)
}

/// Export JSON du tabel (jolie mise en forme)
pub fn export_table_json<P: AsRef<Path>>(path: P, table: &RosterTable) -> anyhow::Result<()> {
    let s = serde_json::to_vec_pretty(&table_to_json(table))?;
    write_atomic(path, &s)
}

/// Classeur XLSX d'une feuille, en mémoire.
pub fn table_to_xlsx(table: &RosterTable) -> anyhow::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Timesheet")?;

    for (col, title) in table_header(table.days_in_month).iter().enumerate() {
        sheet.write_with_format(0, col as u16, title.as_str(), &header)?;
    }
    for (i, row) in table.rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write(r, 0, row.worker.as_str())?;
        sheet.write(r, 1, row.group.as_str())?;
        for (day, cell) in row.schedule().days() {
            let col = u16::from(day) + 1;
            match cell {
                Cell::Hours(h) => sheet.write(r, col, *h)?,
                Cell::Marker(m) => sheet.write(r, col, m.as_str())?,
            };
        }
        let last = row.schedule().len() as u16 + 2;
        sheet.write(r, last, row.fact_hours())?;
        sheet.write(r, last + 1, row.deviation())?;
    }

    let buffer = workbook
        .save_to_buffer()
        .context("rendering xlsx workbook")?;
    Ok(buffer)
}

pub fn export_table_xlsx<P: AsRef<Path>>(path: P, table: &RosterTable) -> anyhow::Result<()> {
    write_atomic(path, &table_to_xlsx(table)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// Nom de fichier horodaté : `<prefix>_<YYYYMMDD>.<ext>`
pub fn dated_file_name(prefix: &str, date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "{prefix}_{}.{}",
        date.format("%Y%m%d"),
        format.extension()
    )
}

/// Exporte le tabel dans `dir` sous un nom daté ; renvoie le chemin écrit.
pub fn export_table<P: AsRef<Path>>(
    dir: P,
    prefix: &str,
    date: NaiveDate,
    format: ExportFormat,
    table: &RosterTable,
) -> anyhow::Result<PathBuf> {
    let path = dir.as_ref().join(dated_file_name(prefix, date, format));
    match format {
        ExportFormat::Csv => export_table_csv(&path, table)?,
        ExportFormat::Json => export_table_json(&path, table)?,
        ExportFormat::Xlsx => export_table_xlsx(&path, table)?,
    }
    Ok(path)
}

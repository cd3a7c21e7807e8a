use super::{ScheduleGenerator, TimesheetError};
use crate::model::{Cell, DaySchedule, Worker, WorkerRecord};
use tracing::debug;

pub(super) fn generate(
    generator: &ScheduleGenerator<'_>,
    worker: &Worker,
) -> Result<WorkerRecord, TimesheetError> {
    let pattern = generator.registry.lookup(&worker.template)?;
    let len = pattern.len();
    let mut cursor = 0usize;

    let cells = (1..=generator.days_in_month)
        .map(|day| match worker.override_for(day) {
            Some(raw) => Cell::parse(raw, generator.numeric_rule),
            None => {
                let cell = pattern[cursor % len].clone();
                cursor += 1;
                cell
            }
        })
        .collect();

    let record = WorkerRecord::new(
        worker.name.clone(),
        worker.group.clone(),
        DaySchedule::from_cells(cells),
        generator.numeric_rule,
        generator.norm_hours,
    );
    debug!(
        worker = %record.worker,
        template = worker.template.as_str(),
        fact = record.fact_hours(),
        deviation = record.deviation(),
        "schedule generated"
    );
    Ok(record)
}

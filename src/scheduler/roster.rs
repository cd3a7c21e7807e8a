use super::{RosterBuilder, TimesheetError};
use crate::model::{RosterTable, Worker, WorkerRecord};
use tracing::info;

pub(super) fn build(
    builder: &RosterBuilder<'_>,
    workers: &[Worker],
) -> Result<RosterTable, TimesheetError> {
    let rows = workers
        .iter()
        .map(|w| builder.generator.generate(w))
        .collect::<Result<Vec<WorkerRecord>, _>>()?;

    info!(workers = rows.len(), "roster built");
    Ok(RosterTable::new(builder.generator.days_in_month(), rows))
}

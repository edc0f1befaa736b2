//! Snapshot export and import commands.
//!
//! # Usage
//!
//! ```bash
//! cadastro snapshot export backup.json
//! cadastro snapshot import backup.json
//! ```

use std::path::Path;

use cadastro_core::{Notice, Registry};
use tracing::instrument;

use super::Outcome;
use crate::data;
use crate::error::CliError;

/// Write the whole registry to `path`.
///
/// # Errors
///
/// Returns `CliError::Io` if the file cannot be written.
pub async fn export(registry: &Registry, path: &Path) -> Result<Outcome, CliError> {
    let records = data::write_snapshot(registry, path).await?;
    Ok(Outcome::unchanged(Notice::success(format!(
        "Exported {records} records to {}",
        path.display()
    ))))
}

/// Replace the registry's contents with the snapshot at `path`.
///
/// # Errors
///
/// Returns `CliError` if the file cannot be read or the document is malformed;
/// the registry is unchanged in that case.
#[instrument(skip(registry))]
pub async fn import(registry: &mut Registry, path: &Path) -> Result<Outcome, CliError> {
    let snapshot = data::read_snapshot(path).await?;
    let report = registry.import_snapshot(snapshot)?;

    let summary = format!(
        "Imported {} users, {} customers and {} addresses from {}",
        report.users,
        report.customers,
        report.addresses,
        path.display()
    );
    let notice = if report.repaired.is_empty() && report.orphaned.is_empty() {
        Notice::success(summary)
    } else {
        Notice::warning(format!(
            "{summary} ({} principal flags repaired, {} addresses without customer)",
            report.repaired.len(),
            report.orphaned.len()
        ))
    };
    Ok(Outcome::changed(notice))
}

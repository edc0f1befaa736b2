//! Loading and saving the registry's data file.

use std::io::ErrorKind;
use std::path::Path;

use cadastro_core::{Registry, Snapshot};
use tracing::{debug, info, instrument, warn};

use crate::config::CliConfig;
use crate::error::CliError;

/// Load the registry from the configured data file.
///
/// A missing file starts a fresh registry, seeded when enabled.
///
/// # Errors
///
/// Returns `CliError` if the file cannot be read or holds an invalid snapshot.
#[instrument(skip_all, fields(path = %config.data_file.display()))]
pub async fn load(config: &CliConfig) -> Result<Registry, CliError> {
    match tokio::fs::read_to_string(&config.data_file).await {
        Ok(json) => {
            let mut registry = Registry::new();
            let report = registry.import_snapshot(Snapshot::from_json(&json)?)?;
            debug!(
                users = report.users,
                customers = report.customers,
                addresses = report.addresses,
                "Data file loaded"
            );
            Ok(registry)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if config.seed {
                info!("Data file not found, starting from seed data");
                Ok(Registry::with_seed_data()?)
            } else {
                warn!("Data file not found, starting empty");
                Ok(Registry::new())
            }
        }
        Err(e) => Err(CliError::io(&config.data_file, e)),
    }
}

/// Read a snapshot document from `path`.
///
/// # Errors
///
/// Returns `CliError` if the file cannot be read or is not a snapshot.
pub async fn read_snapshot(path: &Path) -> Result<Snapshot, CliError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::io(path, e))?;
    Ok(Snapshot::from_json(&json)?)
}

/// Write the registry's snapshot to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns `CliError` if the file cannot be written.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn write_snapshot(registry: &Registry, path: &Path) -> Result<usize, CliError> {
    let snapshot = registry.export_snapshot();
    let mut json = snapshot.to_json()?;
    json.push('\n');

    tokio::fs::write(path, json)
        .await
        .map_err(|e| CliError::io(path, e))?;

    debug!(records = snapshot.record_count(), "Snapshot written");
    Ok(snapshot.record_count())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use cadastro_core::AddressFields;

    use super::*;
    use crate::config::LogFormat;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cadastro-{}-{name}.json", std::process::id()))
    }

    fn config(data_file: PathBuf, seed: bool) -> CliConfig {
        CliConfig {
            data_file,
            seed,
            log_format: LogFormat::Text,
        }
    }

    #[tokio::test]
    async fn test_missing_file_seeds_when_enabled() {
        let registry = load(&config(temp_path("absent-seed"), true)).await.unwrap();
        assert!(registry.login("admin", "123456").is_some());
    }

    #[tokio::test]
    async fn test_missing_file_without_seed_is_empty() {
        let registry = load(&config(temp_path("absent-empty"), false))
            .await
            .unwrap();
        assert!(registry.store().is_empty());
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let path = temp_path("roundtrip");
        let seeded = Registry::with_seed_data().unwrap();

        assert_eq!(write_snapshot(&seeded, &path).await.unwrap(), 3);
        let loaded = load(&config(path.clone(), false)).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(loaded.export_snapshot(), seeded.export_snapshot());
    }

    #[tokio::test]
    async fn test_reload_does_not_reuse_deleted_ids() {
        let path = temp_path("reload-ids");
        let mut registry = Registry::with_seed_data().unwrap();
        let customer = registry.list_customers()[0].id;
        let newest = registry
            .create_address(customer, &seed_address(), false)
            .unwrap();
        registry.delete_address(newest).unwrap();

        write_snapshot(&registry, &path).await.unwrap();
        let mut reloaded = load(&config(path.clone(), false)).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        let next = reloaded
            .create_address(customer, &seed_address(), false)
            .unwrap();
        assert!(next > newest);
    }

    fn seed_address() -> AddressFields {
        AddressFields {
            postal_code: "01310-100".to_owned(),
            street: "Av. Paulista".to_owned(),
            neighborhood: "Bela Vista".to_owned(),
            city: "São Paulo".to_owned(),
            state: "SP".to_owned(),
            country: "Brasil".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let result = load(&config(path.clone(), true)).await;
        tokio::fs::remove_file(&path).await.unwrap();

        assert!(matches!(result, Err(CliError::Snapshot(_))));
    }
}

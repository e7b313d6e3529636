//! Handler for the `import` command.
//!
//! Loads a JSON document of institutions and statements into the
//! configured store. Statements replace any existing document for the
//! same (institution, period).

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::adapter::inbound::cli::command::ImportArgs;
use crate::adapter::inbound::cli::{config, output};
use crate::adapter::outbound::sqlite::SqliteStore;
use crate::domain::{FinancialStatement, Institution};
use crate::error::Result;
use crate::port::StatementCatalog;

/// Import file layout.
#[derive(Debug, Deserialize)]
pub struct ImportFile {
    #[serde(default)]
    pub institutions: Vec<Institution>,
    #[serde(default)]
    pub statements: Vec<FinancialStatement>,
}

impl ImportFile {
    /// Read and parse an import file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Write every entry of `file` through the catalog port.
///
/// Returns the number of institutions and statements written.
///
/// # Errors
/// Stops at the first store error.
pub async fn load_into<C: StatementCatalog>(catalog: &C, file: &ImportFile) -> Result<(usize, usize)> {
    for institution in &file.institutions {
        catalog.upsert_institution(institution).await?;
    }
    for statement in &file.statements {
        debug!(
            institution = %statement.institution_id,
            period = %statement.period,
            "Importing statement"
        );
        catalog.upsert_statement(statement).await?;
    }
    Ok((file.institutions.len(), file.statements.len()))
}

/// Execute the `import` command.
pub async fn execute(args: ImportArgs) -> Result<()> {
    let config = config::load(&args.config)?;
    let file = ImportFile::read(&args.file)?;
    let store = SqliteStore::open(&config.database, config.analysis.size_metric)?;

    let spinner = output::spinner("Importing statements...");
    let result = load_into(&store, &file).await;
    store.close();

    let (institutions, statements) = match result {
        Ok(counts) => {
            output::spinner_success(&spinner, "Import complete");
            counts
        }
        Err(e) => {
            output::spinner_fail(&spinner, "Import failed");
            return Err(e);
        }
    };

    if output::is_json() {
        output::json_output(json!({
            "command": "import",
            "institutions": institutions,
            "statements": statements,
        }));
        return Ok(());
    }

    output::field("Institutions", institutions);
    output::field("Statements", statements);
    output::field("Database", &config.database);
    Ok(())
}

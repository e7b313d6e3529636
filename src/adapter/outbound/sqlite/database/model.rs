//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{financial_statements, institutions};

/// Database row for an institution.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = institutions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstitutionRow {
    pub id: String,
    pub name: String,
}

/// Database row for a statement.
///
/// `document` holds the statement JSON without its analysis; the analysis
/// lives in its own column so the batch run can replace it in place.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = financial_statements)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StatementRow {
    pub institution_id: String,
    pub period: String,
    pub document: String,
    pub peer_analysis: Option<String>,
}

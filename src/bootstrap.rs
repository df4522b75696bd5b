//! Creates or migrates the session table before the store is used.

use sea_orm_migration::SchemaManager;
use tracing::{debug, info, warn};

use crate::adaptor::DatabaseAdaptor;
use crate::error::Result;
use crate::schema::SessionTableSchema;

/// Ensures the session table, its max interval column and both indexes exist.
///
/// Every step checks for the structure first and only ever adds to it, so
/// running this against an up-to-date database changes nothing. A table
/// created before the max interval column existed gets the column with the
/// "not set" default. DDL failures are returned to the caller.
pub async fn prepare_tables(schema: &SessionTableSchema, adaptor: &DatabaseAdaptor) -> Result<()> {
    let manager = SchemaManager::new(adaptor.connection());
    let dialect = adaptor.dialect();
    let table = schema.table_name();

    if !manager.has_table(table).await? {
        info!(table, dialect = adaptor.dialect_name(), "creating session table");
        manager
            .create_table(schema.create_table_statement(&dialect))
            .await?;
    } else if !manager
        .has_column(table, schema.max_interval_column())
        .await?
    {
        info!(
            table,
            column = schema.max_interval_column(),
            "adding max interval column to session table"
        );
        if let Err(e) = manager
            .alter_table(schema.add_max_interval_column_statement(&dialect))
            .await
        {
            warn!(
                table,
                column = schema.max_interval_column(),
                error = %e,
                "failed to add max interval column; the table needs a `{} {} not null default -999` column",
                schema.max_interval_column(),
                dialect.long_type,
            );
            return Err(e.into());
        }
    } else {
        debug!(table, "session table is up to date");
    }

    let expiry_index = schema.expiry_index_name();
    if !manager.has_index(table, &expiry_index).await? {
        info!(table, index = %expiry_index, "creating expiry index");
        manager
            .create_index(schema.create_expiry_index_statement())
            .await?;
    }

    let session_index = schema.session_index_name();
    if !manager.has_index(table, &session_index).await? {
        info!(table, index = %session_index, "creating session index");
        manager
            .create_index(schema.create_session_index_statement())
            .await?;
    }

    Ok(())
}

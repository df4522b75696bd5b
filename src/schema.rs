//! Table layout and SQL generation for the session table.
//!
//! All identifiers come from [`SessionTableSchema`]; no other module names a
//! column. Statements are built with `sea_query` and rendered for the
//! connection's backend, with values bound as parameters.
//!
//! The one dialect branch lives in the key predicate:
//! when the database stores empty strings as NULL, the root context path is
//! matched with `IS NULL` instead of an equality parameter.

use sea_orm::sea_query::{
    Alias, ColumnDef, Condition, Expr, Index, IndexCreateStatement, Query, SelectStatement,
    SimpleExpr, Table, TableAlterStatement, TableCreateStatement, Value,
};
use sea_orm::Statement;

use crate::adaptor::Dialect;
use crate::context::SessionContext;
use crate::error::{Result, StoreError};
use crate::record::{SessionData, MAX_INTERVAL_NOT_SET};

/// Names of the session table and its columns.
///
/// # Database Schema
///
/// | Column (default)   | Type              | Description                                |
/// |--------------------|-------------------|--------------------------------------------|
/// | `session_id`       | VARCHAR(120)      | Session ID (key)                           |
/// | `context_path`     | VARCHAR(60)       | Canonical context path (key)               |
/// | `virtual_host`     | VARCHAR(60)       | Virtual host (key)                         |
/// | `last_node`        | VARCHAR(60)       | Node that last saved the session           |
/// | `access_time`      | long type         | Current access time                        |
/// | `last_access_time` | long type         | Previous access time                       |
/// | `create_time`      | long type         | Creation time                              |
/// | `cookie_time`      | long type         | Time the session cookie was set            |
/// | `last_saved_time`  | long type         | Time of the last save                      |
/// | `expiry_time`      | long type         | Expiry time, 0 for never                   |
/// | `max_interval`     | long type         | Max inactive interval in ms, -999 if unset |
/// | `attributes`       | blob type         | MessagePack encoded attributes             |
///
/// Times are epoch milliseconds. The long and blob types come from the
/// [`Dialect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTableSchema {
    table_name: String,
    id_column: String,
    context_path_column: String,
    virtual_host_column: String,
    last_node_column: String,
    access_time_column: String,
    last_access_time_column: String,
    create_time_column: String,
    cookie_time_column: String,
    last_saved_time_column: String,
    expiry_time_column: String,
    max_interval_column: String,
    map_column: String,
}

impl Default for SessionTableSchema {
    fn default() -> Self {
        Self {
            table_name: "cluster_sessions".to_string(),
            id_column: "session_id".to_string(),
            context_path_column: "context_path".to_string(),
            virtual_host_column: "virtual_host".to_string(),
            last_node_column: "last_node".to_string(),
            access_time_column: "access_time".to_string(),
            last_access_time_column: "last_access_time".to_string(),
            create_time_column: "create_time".to_string(),
            cookie_time_column: "cookie_time".to_string(),
            last_saved_time_column: "last_saved_time".to_string(),
            expiry_time_column: "expiry_time".to_string(),
            max_interval_column: "max_interval".to_string(),
            map_column: "attributes".to_string(),
        }
    }
}

macro_rules! schema_name {
    ($field:ident, $with:ident, $doc:literal) => {
        #[doc = concat!("Name of the ", $doc, ".")]
        pub fn $field(&self) -> &str {
            &self.$field
        }

        #[doc = concat!("Sets the name of the ", $doc, ".")]
        pub fn $with(mut self, name: impl Into<String>) -> Self {
            self.$field = name.into();
            self
        }
    };
}

impl SessionTableSchema {
    /// The default layout: table `cluster_sessions` with the default column
    /// names.
    ///
    /// # Examples
    ///
    /// ```
    /// use seaorm_cluster_session_store::SessionTableSchema;
    ///
    /// let schema = SessionTableSchema::new()
    ///     .with_table_name("web_sessions")
    ///     .with_map_column("payload");
    /// assert_eq!(schema.id_column(), "session_id");
    /// assert_eq!(schema.expiry_index_name(), "idx_web_sessions_expiry");
    /// assert!(schema.validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    schema_name!(table_name, with_table_name, "session table");
    schema_name!(id_column, with_id_column, "session id column");
    schema_name!(context_path_column, with_context_path_column, "context path column");
    schema_name!(virtual_host_column, with_virtual_host_column, "virtual host column");
    schema_name!(last_node_column, with_last_node_column, "last node column");
    schema_name!(access_time_column, with_access_time_column, "access time column");
    schema_name!(
        last_access_time_column,
        with_last_access_time_column,
        "last access time column"
    );
    schema_name!(create_time_column, with_create_time_column, "create time column");
    schema_name!(cookie_time_column, with_cookie_time_column, "cookie set time column");
    schema_name!(
        last_saved_time_column,
        with_last_saved_time_column,
        "last saved time column"
    );
    schema_name!(expiry_time_column, with_expiry_time_column, "expiry time column");
    schema_name!(
        max_interval_column,
        with_max_interval_column,
        "max inactive interval column"
    );
    schema_name!(map_column, with_map_column, "attribute blob column");

    /// Checks that every configured name is usable.
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("table name", &self.table_name),
            ("id column", &self.id_column),
            ("context path column", &self.context_path_column),
            ("virtual host column", &self.virtual_host_column),
            ("last node column", &self.last_node_column),
            ("access time column", &self.access_time_column),
            ("last access time column", &self.last_access_time_column),
            ("create time column", &self.create_time_column),
            ("cookie time column", &self.cookie_time_column),
            ("last saved time column", &self.last_saved_time_column),
            ("expiry time column", &self.expiry_time_column),
            ("max interval column", &self.max_interval_column),
            ("map column", &self.map_column),
        ];
        for (what, name) in names {
            if name.trim().is_empty() {
                return Err(StoreError::Config(format!("{what} must not be empty")));
            }
        }
        Ok(())
    }

    /// Name of the index on the expiry time column.
    pub fn expiry_index_name(&self) -> String {
        format!("idx_{}_expiry", self.table_name)
    }

    /// Name of the index on the session id and context path columns.
    pub fn session_index_name(&self) -> String {
        format!("idx_{}_session", self.table_name)
    }

    fn table(&self) -> Alias {
        Alias::new(&self.table_name)
    }

    fn col(name: &str) -> Alias {
        Alias::new(name)
    }

    fn val(value: impl Into<Value>) -> SimpleExpr {
        SimpleExpr::Value(value.into())
    }

    fn all_columns(&self) -> Vec<Alias> {
        [
            &self.id_column,
            &self.context_path_column,
            &self.virtual_host_column,
            &self.last_node_column,
            &self.access_time_column,
            &self.last_access_time_column,
            &self.create_time_column,
            &self.cookie_time_column,
            &self.last_saved_time_column,
            &self.expiry_time_column,
            &self.max_interval_column,
            &self.map_column,
        ]
        .into_iter()
        .map(|name| Self::col(name))
        .collect()
    }

    // DDL

    /// Creates the session table keyed by id, context path and virtual host.
    pub fn create_table_statement(&self, dialect: &Dialect) -> TableCreateStatement {
        let long = || Alias::new(&dialect.long_type);
        Table::create()
            .table(self.table())
            .col(ColumnDef::new(Self::col(&self.id_column)).string_len(120))
            .col(ColumnDef::new(Self::col(&self.context_path_column)).string_len(60))
            .col(ColumnDef::new(Self::col(&self.virtual_host_column)).string_len(60))
            .col(ColumnDef::new(Self::col(&self.last_node_column)).string_len(60))
            .col(ColumnDef::new(Self::col(&self.access_time_column)).custom(long()))
            .col(ColumnDef::new(Self::col(&self.last_access_time_column)).custom(long()))
            .col(ColumnDef::new(Self::col(&self.create_time_column)).custom(long()))
            .col(ColumnDef::new(Self::col(&self.cookie_time_column)).custom(long()))
            .col(ColumnDef::new(Self::col(&self.last_saved_time_column)).custom(long()))
            .col(ColumnDef::new(Self::col(&self.expiry_time_column)).custom(long()))
            .col(ColumnDef::new(Self::col(&self.max_interval_column)).custom(long()))
            .col(
                ColumnDef::new(Self::col(&self.map_column))
                    .custom(Alias::new(&dialect.blob_type)),
            )
            .primary_key(
                Index::create()
                    .col(Self::col(&self.id_column))
                    .col(Self::col(&self.context_path_column))
                    .col(Self::col(&self.virtual_host_column)),
            )
            .to_owned()
    }

    /// Adds the max interval column to a table created before it existed.
    pub fn add_max_interval_column_statement(&self, dialect: &Dialect) -> TableAlterStatement {
        Table::alter()
            .table(self.table())
            .add_column(
                ColumnDef::new(Self::col(&self.max_interval_column))
                    .custom(Alias::new(&dialect.long_type))
                    .not_null()
                    .default(MAX_INTERVAL_NOT_SET),
            )
            .to_owned()
    }

    pub fn create_expiry_index_statement(&self) -> IndexCreateStatement {
        Index::create()
            .name(self.expiry_index_name())
            .table(self.table())
            .col(Self::col(&self.expiry_time_column))
            .to_owned()
    }

    pub fn create_session_index_statement(&self) -> IndexCreateStatement {
        Index::create()
            .name(self.session_index_name())
            .table(self.table())
            .col(Self::col(&self.id_column))
            .col(Self::col(&self.context_path_column))
            .to_owned()
    }

    // Key predicates

    /// Whether the root context path must be matched with `IS NULL`.
    fn null_context_path(context: &SessionContext, dialect: &Dialect) -> bool {
        context.is_root() && dialect.empty_string_null
    }

    /// The stored value of the context path column for `context`.
    fn context_path_value(context: &SessionContext, dialect: &Dialect) -> SimpleExpr {
        if Self::null_context_path(context, dialect) {
            Self::val(Option::<String>::None)
        } else {
            Self::val(context.canonical_context_path())
        }
    }

    /// Matches the rows owned by `context`.
    fn context_condition(&self, context: &SessionContext, dialect: &Dialect) -> Condition {
        let path = Expr::col(Self::col(&self.context_path_column));
        let path = if Self::null_context_path(context, dialect) {
            path.is_null()
        } else {
            path.eq(context.canonical_context_path())
        };
        Condition::all()
            .add(path)
            .add(Expr::col(Self::col(&self.virtual_host_column)).eq(context.vhost()))
    }

    /// Matches the single row keyed by `id` within `context`.
    fn key_condition(&self, id: &str, context: &SessionContext, dialect: &Dialect) -> Condition {
        Condition::all()
            .add(Expr::col(Self::col(&self.id_column)).eq(id))
            .add(self.context_condition(context, dialect))
    }

    fn expired_condition(&self, upper_bound: i64) -> Condition {
        Condition::all()
            .add(Expr::col(Self::col(&self.expiry_time_column)).gt(0))
            .add(Expr::col(Self::col(&self.expiry_time_column)).lte(upper_bound))
    }

    // DML

    /// Inserts a full row for `id`, keyed within `context`.
    pub fn insert_statement(
        &self,
        id: &str,
        context: &SessionContext,
        data: &SessionData,
        blob: Vec<u8>,
        dialect: &Dialect,
    ) -> Result<Statement> {
        let values = vec![
            Self::val(id),
            Self::context_path_value(context, dialect),
            Self::val(context.vhost()),
            Self::val(data.last_node.as_str()),
            Self::val(data.access_time),
            Self::val(data.last_access_time),
            Self::val(data.create_time),
            Self::val(data.cookie_set_time),
            Self::val(data.last_saved_time),
            Self::val(data.expiry_time),
            Self::val(data.max_inactive_ms),
            Self::val(blob),
        ];
        let stmt = Query::insert()
            .into_table(self.table())
            .columns(self.all_columns())
            .values(values)
            .map_err(|e| StoreError::Config(e.to_string()))?
            .to_owned();
        Ok(dialect.backend.build(&stmt))
    }

    /// Updates the mutable columns of the row keyed by `id` within `context`.
    pub fn update_statement(
        &self,
        id: &str,
        context: &SessionContext,
        data: &SessionData,
        blob: Vec<u8>,
        dialect: &Dialect,
    ) -> Statement {
        let stmt = Query::update()
            .table(self.table())
            .values([
                (Self::col(&self.last_node_column), Self::val(data.last_node.as_str())),
                (Self::col(&self.access_time_column), Self::val(data.access_time)),
                (Self::col(&self.last_access_time_column), Self::val(data.last_access_time)),
                (Self::col(&self.last_saved_time_column), Self::val(data.last_saved_time)),
                (Self::col(&self.expiry_time_column), Self::val(data.expiry_time)),
                (Self::col(&self.max_interval_column), Self::val(data.max_inactive_ms)),
                (Self::col(&self.map_column), Self::val(blob)),
            ])
            .cond_where(self.key_condition(id, context, dialect))
            .to_owned();
        dialect.backend.build(&stmt)
    }

    /// Selects every column of the row keyed by `id` within `context`.
    pub fn load_statement(&self, id: &str, context: &SessionContext, dialect: &Dialect) -> Statement {
        let stmt = Query::select()
            .columns(self.all_columns())
            .from(self.table())
            .cond_where(self.key_condition(id, context, dialect))
            .to_owned();
        dialect.backend.build(&stmt)
    }

    /// Deletes the row keyed by `id` within `context`.
    pub fn delete_statement(&self, id: &str, context: &SessionContext, dialect: &Dialect) -> Statement {
        let stmt = Query::delete()
            .from_table(self.table())
            .cond_where(self.key_condition(id, context, dialect))
            .to_owned();
        dialect.backend.build(&stmt)
    }

    /// Deletes the row keyed by `id` within `context`, but only while it is
    /// still expired at `upper_bound`.
    pub fn delete_expired_statement(
        &self,
        id: &str,
        context: &SessionContext,
        upper_bound: i64,
        dialect: &Dialect,
    ) -> Statement {
        let stmt = Query::delete()
            .from_table(self.table())
            .cond_where(
                self.key_condition(id, context, dialect)
                    .add(self.expired_condition(upper_bound)),
            )
            .to_owned();
        dialect.backend.build(&stmt)
    }

    /// Deletes sessions of any context that expired at or before `upper_bound`.
    pub fn delete_all_ancient_expired_statement(&self, upper_bound: i64, dialect: &Dialect) -> Statement {
        let stmt = Query::delete()
            .from_table(self.table())
            .cond_where(self.expired_condition(upper_bound))
            .to_owned();
        dialect.backend.build(&stmt)
    }

    pub fn exists_statement(&self, id: &str, context: &SessionContext, dialect: &Dialect) -> Statement {
        let stmt = Query::select()
            .columns([
                Self::col(&self.id_column),
                Self::col(&self.expiry_time_column),
            ])
            .from(self.table())
            .cond_where(self.key_condition(id, context, dialect))
            .to_owned();
        dialect.backend.build(&stmt)
    }

    /// Selects the sessions of `context` that expired at or before `upper_bound`.
    pub fn my_expired_statement(
        &self,
        context: &SessionContext,
        upper_bound: i64,
        dialect: &Dialect,
    ) -> Statement {
        let stmt = self
            .expired_select([
                Self::col(&self.id_column),
                Self::col(&self.expiry_time_column),
            ])
            .cond_where(
                self.context_condition(context, dialect)
                    .add(self.expired_condition(upper_bound)),
            )
            .to_owned();
        dialect.backend.build(&stmt)
    }

    /// Selects sessions of any context that expired at or before `upper_bound`.
    pub fn all_ancient_expired_statement(&self, upper_bound: i64, dialect: &Dialect) -> Statement {
        let stmt = self
            .expired_select([
                Self::col(&self.id_column),
                Self::col(&self.context_path_column),
                Self::col(&self.virtual_host_column),
            ])
            .cond_where(self.expired_condition(upper_bound))
            .to_owned();
        dialect.backend.build(&stmt)
    }

    fn expired_select<const N: usize>(&self, columns: [Alias; N]) -> SelectStatement {
        Query::select()
            .columns(columns)
            .from(self.table())
            .to_owned()
    }
}

#![allow(dead_code)]

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};
use seaorm_cluster_session_store::{
    DatabaseAdaptor, SessionContext, SessionData, SessionDataStore,
};
use serde_json::json;

/// A fresh in-memory SQLite database.
///
/// The pool is limited to one connection so every statement sees the same
/// database.
pub async fn connect() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    Database::connect(opt).await.expect("connect to sqlite")
}

pub fn app_context() -> SessionContext {
    SessionContext::new("/app", Some("v1")).with_worker_name("node1")
}

pub async fn started(conn: &DatabaseConnection, context: SessionContext) -> SessionDataStore {
    let store = SessionDataStore::new(DatabaseAdaptor::new(conn.clone()), context);
    store.start().await.expect("start store");
    store
}

pub fn session(id: &str, context: &SessionContext, expiry_time: i64) -> SessionData {
    let mut data = SessionData::new(id, context, 1_000, 2_000, 1_500, 60_000);
    data.cookie_set_time = 1_100;
    data.last_saved_time = 2_500;
    data.expiry_time = expiry_time;
    data.set_attribute("user", json!("alice"));
    data.set_attribute("visits", json!(3));
    data
}

/// Overwrites the attribute blob of `id` with bytes that are not MessagePack.
pub async fn corrupt(conn: &DatabaseConnection, id: &str) {
    conn.execute_unprepared(&format!(
        "UPDATE cluster_sessions SET attributes = x'c1c1c1' WHERE session_id = '{id}'"
    ))
    .await
    .expect("corrupt blob");
}

pub async fn remove_row(conn: &DatabaseConnection, id: &str) {
    conn.execute_unprepared(&format!("DELETE FROM cluster_sessions WHERE session_id = '{id}'"))
        .await
        .expect("delete row");
}

pub async fn count(conn: &DatabaseConnection, sql: &str) -> i64 {
    let row = conn
        .query_one(Statement::from_string(DbBackend::Sqlite, sql.to_string()))
        .await
        .expect("count query")
        .expect("count row");
    row.try_get::<i64>("", "n").expect("count column")
}

//! The persisted unit of session state.

use serde_json::Value;

use crate::codec::Attributes;
use crate::context::SessionContext;

/// Value stored in the max-interval column for rows written before the
/// column existed.
pub const MAX_INTERVAL_NOT_SET: i64 = -999;

/// One session row, keyed by id, context path and virtual host.
///
/// All times are epoch milliseconds. An `expiry_time` of 0 means the session
/// never expires.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionData {
    pub id: String,
    pub context_path: String,
    pub vhost: String,
    pub last_node: String,
    pub access_time: i64,
    pub last_access_time: i64,
    pub create_time: i64,
    pub cookie_set_time: i64,
    pub last_saved_time: i64,
    pub expiry_time: i64,
    pub max_inactive_ms: i64,
    pub attributes: Attributes,
}

impl SessionData {
    /// Creates session data owned by `context`, with its expiry derived from
    /// `max_inactive_ms`.
    pub fn new(
        id: impl Into<String>,
        context: &SessionContext,
        created: i64,
        accessed: i64,
        last_accessed: i64,
        max_inactive_ms: i64,
    ) -> Self {
        let mut data = Self {
            id: id.into(),
            context_path: context.canonical_context_path().to_string(),
            vhost: context.vhost().to_string(),
            last_node: context.worker_name().to_string(),
            access_time: accessed,
            last_access_time: last_accessed,
            create_time: created,
            cookie_set_time: 0,
            last_saved_time: 0,
            expiry_time: 0,
            max_inactive_ms,
            attributes: Attributes::new(),
        };
        data.expiry_time = data.calc_expiry(created);
        data
    }

    /// Expiry time for an access at `now`, or 0 if the session never idles out.
    pub fn calc_expiry(&self, now: i64) -> i64 {
        if self.max_inactive_ms <= 0 {
            0
        } else {
            now.saturating_add(self.max_inactive_ms)
        }
    }

    /// Whether the session has expired at `now`. Never true for sessions
    /// with no expiry.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expiry_time > 0 && self.expiry_time <= now
    }

    /// The attribute stored under `name`.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Sets an attribute, returning the previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.attributes.insert(name.into(), value)
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }
}

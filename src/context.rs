//! Ownership context of stored sessions.

use std::fmt;

/// Virtual host used when an application is not bound to any host name.
pub const DEFAULT_VHOST: &str = "0.0.0.0";

/// Node id used when none is configured.
pub const DEFAULT_WORKER_NAME: &str = "node0";

/// Identifies the application instance that owns a set of sessions.
///
/// Every row is scoped by the canonical context path and the virtual host,
/// so two applications sharing a table never see each other's sessions
/// through `load`, `store` or `delete`. The worker name identifies this node
/// and is written to each row it saves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    canonical_context_path: String,
    vhost: String,
    worker_name: String,
}

impl SessionContext {
    /// Creates a context from a raw context path and an optional virtual host.
    ///
    /// ```
    /// use seaorm_cluster_session_store::SessionContext;
    ///
    /// let ctx = SessionContext::new("/shop/v1.2", Some("example.com"));
    /// assert_eq!(ctx.canonical_context_path(), "_shop_v1_2");
    /// assert_eq!(ctx.vhost(), "example.com");
    ///
    /// let root = SessionContext::new("/", None);
    /// assert_eq!(root.canonical_context_path(), "");
    /// assert_eq!(root.vhost(), "0.0.0.0");
    /// ```
    pub fn new(context_path: &str, vhost: Option<&str>) -> Self {
        let vhost = match vhost {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => DEFAULT_VHOST.to_string(),
        };
        Self {
            canonical_context_path: canonicalize(context_path),
            vhost,
            worker_name: DEFAULT_WORKER_NAME.to_string(),
        }
    }

    /// Sets the id of the node this store runs on.
    pub fn with_worker_name(mut self, worker_name: impl Into<String>) -> Self {
        self.worker_name = worker_name.into();
        self
    }

    /// The context path as stored in the context path column.
    ///
    /// Separators are replaced with `_` and the root context is `""`.
    pub fn canonical_context_path(&self) -> &str {
        &self.canonical_context_path
    }

    /// The virtual host as stored in the virtual host column.
    pub fn vhost(&self) -> &str {
        &self.vhost
    }

    /// The node id written as the last node of every saved session.
    pub fn worker_name(&self) -> &str {
        &self.worker_name
    }

    /// Whether this is the root context, stored with an empty path.
    pub fn is_root(&self) -> bool {
        self.canonical_context_path.is_empty()
    }
}

impl fmt::Display for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.canonical_context_path, self.vhost)
    }
}

fn canonicalize(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return String::new();
    }
    path.replace(['/', '.', '\\'], "_")
}

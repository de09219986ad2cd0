//! Declarative proxy rules.

use serde::Deserialize;
use url::Url;

use crate::error::Result;
use crate::transport::websocket_scheme;

/// Path prefix of the default realtime rule.
pub const DEFAULT_PREFIX: &str = "/ws";

/// Backend origin of the default realtime rule.
pub const DEFAULT_TARGET: &str = "http://localhost:8000";

/// Forward every request whose path starts with `prefix` to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyRule {
    /// Path prefix, matched with `starts_with`.
    pub prefix: String,
    /// Backend origin. The original path is appended to its path.
    pub target: Url,
    /// Also proxy WebSocket upgrades.
    #[serde(default)]
    pub ws: bool,
}

impl ProxyRule {
    pub fn new(prefix: impl Into<String>, target: Url, ws: bool) -> Self {
        Self {
            prefix: prefix.into(),
            target,
            ws,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Backend URL for a request, keeping the full path and query.
    pub fn target_url(&self, path_and_query: &str) -> Url {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };

        let mut url = self.target.clone();
        let base = self.target.path().trim_end_matches('/');
        url.set_path(&format!("{base}{path}"));
        url.set_query(query);
        url
    }

    /// Backend URL for an upgrade request, with a `ws`/`wss` scheme.
    pub fn websocket_url(&self, path_and_query: &str) -> Result<Url> {
        let mut url = self.target_url(path_and_query);
        websocket_scheme(&mut url)?;
        Ok(url)
    }
}

/// The realtime endpoint rule used when no rules are configured.
pub fn default_rules() -> Vec<ProxyRule> {
    match Url::parse(DEFAULT_TARGET) {
        Ok(target) => vec![ProxyRule::new(DEFAULT_PREFIX, target, true)],
        Err(_) => Vec::new(),
    }
}

/// Ordered rule set. The first matching rule wins.
#[derive(Debug, Clone, Default)]
pub struct ProxyTable {
    rules: Vec<ProxyRule>,
}

impl ProxyTable {
    pub fn new(rules: Vec<ProxyRule>) -> Self {
        Self { rules }
    }

    pub fn find(&self, path: &str) -> Option<&ProxyRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    pub fn rules(&self) -> &[ProxyRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

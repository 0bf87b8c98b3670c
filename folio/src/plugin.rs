//! Event-adapter plugin: subscribes storage operations to named host
//! events.
//!
//! Content-management hosts drive their storage over an event bus. This
//! module is the wiring between that bus and a [`MemoryStorage`]: a
//! capability map from operation names to host event names, registered
//! through the [`EventHooks`] seam, plus a JSON-payload dispatcher for
//! hosts that deliver event arguments as JSON.
//!
//! Registration is the one place in the system that fails loudly: an
//! empty event map means the host is mis-wired and cannot be recovered
//! from silently. Everything past registration inherits the store's
//! absorb-and-log failure contract.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use bson::Document;

use folio_core::{
    document::{self as fields, DocumentExt},
    error::{FolioError, FolioResult},
    provider::{StorageConfig, StorageProvider},
    query::QueryParser,
    revision::RevisionKey,
};
use folio_memory::MemoryStorage;

/// The configuration key hosts use to address this plugin.
pub const CONFIG_KEY: &str = "folio-storage-memory";

/// The closed set of storage operations a host may subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOp {
    All,
    GetQuery,
    Get,
    GetHistory,
    GetRevision,
    Add,
    Update,
    Delete,
    Reset,
}

impl StorageOp {
    /// The operation's wire name, as it appears in plugin configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageOp::All => "all",
            StorageOp::GetQuery => "getQuery",
            StorageOp::Get => "get",
            StorageOp::GetHistory => "getHistory",
            StorageOp::GetRevision => "getRevision",
            StorageOp::Add => "add",
            StorageOp::Update => "update",
            StorageOp::Delete => "delete",
            StorageOp::Reset => "reset",
        }
    }

    /// Resolves a configured operation name, or `None` for an unknown one.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "all" => Some(StorageOp::All),
            "getQuery" => Some(StorageOp::GetQuery),
            "get" => Some(StorageOp::Get),
            "getHistory" => Some(StorageOp::GetHistory),
            "getRevision" => Some(StorageOp::GetRevision),
            "add" => Some(StorageOp::Add),
            "update" => Some(StorageOp::Update),
            "delete" => Some(StorageOp::Delete),
            "reset" => Some(StorageOp::Reset),
            _ => None,
        }
    }
}

/// The host hook-system seam.
///
/// The adapter registers `(event, operation)` pairs through this trait;
/// the host resolves each fired event back to the operation via its own
/// lookup, then drives [`StoragePlugin::dispatch`].
pub trait EventHooks {
    /// Subscribes `op` to the named event.
    fn on(&mut self, event: &str, op: StorageOp);
}

/// Plugin configuration: operation name → host event names, plus the
/// storage options forwarded to the backing store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Events to listen for, keyed by operation name.
    #[serde(default)]
    pub events: HashMap<String, Vec<String>>,
    /// Storage options for the backing store.
    #[serde(flatten)]
    pub storage: StorageConfig,
}

impl PluginConfig {
    /// The default event table: every operation bound to its conventional
    /// `storage-*` event name.
    pub fn default_events() -> HashMap<String, Vec<String>> {
        [
            ("add", "storage-add"),
            ("delete", "storage-delete"),
            ("get", "storage-get"),
            ("getHistory", "storage-get-history"),
            ("getRevision", "storage-get-revision"),
            ("getQuery", "storage-query"),
            ("update", "storage-update"),
        ]
        .into_iter()
        .map(|(method, event)| (method.to_string(), vec![event.to_string()]))
        .collect()
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            events: Self::default_events(),
            storage: StorageConfig::default(),
        }
    }
}

/// The adapter itself: owns the backing store and, optionally, the query
/// parser used to resolve `getQuery` strings.
pub struct StoragePlugin {
    storage: MemoryStorage,
    parser: Option<Box<dyn QueryParser>>,
}

impl StoragePlugin {
    /// Wraps an existing store.
    pub fn new(storage: MemoryStorage) -> Self {
        Self {
            storage,
            parser: None,
        }
    }

    /// Creates the plugin and its backing store from configuration.
    pub fn from_config(config: &PluginConfig) -> Self {
        Self::new(MemoryStorage::with_config(config.storage.clone()))
    }

    /// Attaches the parser collaborator that resolves query strings.
    pub fn with_parser(mut self, parser: Box<dyn QueryParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// The backing store.
    pub fn storage(&self) -> &MemoryStorage {
        &self.storage
    }

    /// Registers every configured `(event, operation)` pair on the host's
    /// hook system.
    ///
    /// Unknown operation names are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Configuration`] when the event map is empty,
    /// which indicates a mis-wired host rather than a recoverable condition.
    pub fn register(&self, hooks: &mut dyn EventHooks, config: &PluginConfig) -> FolioResult<()> {
        if config.events.is_empty() {
            return Err(FolioError::Configuration(
                "missing events to listen for in 'events'".to_string(),
            ));
        }

        for (method, events) in &config.events {
            let Some(op) = StorageOp::from_name(method) else {
                debug!(%method, "no operation for configured event key");
                continue;
            };

            for event in events {
                hooks.on(event, op);
            }
        }

        Ok(())
    }

    /// Resolves a query string through the attached parser and executes it
    /// against the store.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Configuration`] when no parser is attached,
    /// or the parser's error when the query string is invalid.
    pub async fn get_query(&self, query: &str) -> FolioResult<Vec<Document>> {
        let parser = self.parser.as_ref().ok_or_else(|| {
            FolioError::Configuration("missing query parser for 'getQuery'".to_string())
        })?;

        let plan = parser.parse(query)?;
        Ok(self.storage.query(plan).await)
    }

    /// Drives one operation from a JSON event payload and returns its JSON
    /// result.
    ///
    /// Lookup misses come back as `null`, mirroring the store's silent
    /// not-found contract; only payload shape problems and `getQuery`
    /// without a parser surface errors.
    pub async fn dispatch(&self, op: StorageOp, payload: Value) -> FolioResult<Value> {
        match op {
            StorageOp::All => {
                let documents = self.storage.all().await;
                let mut map = serde_json::Map::new();
                for (slug, document) in documents {
                    map.insert(slug, document.to_json()?);
                }
                Ok(Value::Object(map))
            }
            StorageOp::GetQuery => {
                let query = payload_str(&payload, "query")?;
                let results = self.get_query(query).await?;
                let results = results
                    .iter()
                    .map(DocumentExt::to_json)
                    .collect::<FolioResult<Vec<_>>>()?;
                Ok(Value::Array(results))
            }
            StorageOp::Get => {
                let slug = payload_str(&payload, fields::SLUG)?;
                match self.storage.get(slug).await {
                    Some(document) => document.to_json(),
                    None => Ok(Value::Null),
                }
            }
            StorageOp::GetHistory => {
                let slug = payload_str(&payload, fields::SLUG)?;
                match self.storage.get_history(slug).await {
                    Some(history) => Ok(json!(
                        history
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                    )),
                    None => Ok(Value::Null),
                }
            }
            StorageOp::GetRevision => {
                let slug = payload_str(&payload, fields::SLUG)?.to_string();
                let revision = payload_str(&payload, "revision")?.parse::<RevisionKey>()?;
                match self.storage.get_revision(&slug, &revision).await {
                    Some(document) => document.to_json(),
                    None => Ok(Value::Null),
                }
            }
            StorageOp::Add => {
                self.storage.add(Document::from_json(payload)?).await;
                Ok(Value::Null)
            }
            StorageOp::Update => {
                let original_slug = payload
                    .get("originalSlug")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let document = payload
                    .get("document")
                    .cloned()
                    .ok_or_else(|| FolioError::Serialization("missing 'document'".to_string()))?;
                self.storage
                    .update(Document::from_json(document)?, original_slug.as_deref())
                    .await;
                Ok(Value::Null)
            }
            StorageOp::Delete => {
                let slug = payload_str(&payload, fields::SLUG)?;
                self.storage.delete(slug).await;
                Ok(Value::Null)
            }
            StorageOp::Reset => {
                self.storage.reset().await;
                Ok(Value::Null)
            }
        }
    }
}

/// Reads a named string out of an object payload, also accepting a bare
/// string for single-argument operations.
fn payload_str<'a>(payload: &'a Value, key: &str) -> FolioResult<&'a str> {
    match payload {
        Value::String(value) => Ok(value),
        Value::Object(map) => map
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| FolioError::Serialization(format!("missing '{key}'"))),
        _ => Err(FolioError::Serialization(format!(
            "expected a string or an object with '{key}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingHooks {
        subscriptions: Vec<(String, StorageOp)>,
    }

    impl EventHooks for RecordingHooks {
        fn on(&mut self, event: &str, op: StorageOp) {
            self.subscriptions.push((event.to_string(), op));
        }
    }

    #[test]
    fn default_config_covers_the_conventional_events() {
        let config = PluginConfig::default();
        assert_eq!(config.events.len(), 7);
        assert_eq!(
            config.events.get("getQuery"),
            Some(&vec!["storage-query".to_string()])
        );
        assert!(config.storage.use_history);
    }

    #[test]
    fn register_subscribes_every_configured_pair() {
        let plugin = StoragePlugin::from_config(&PluginConfig::default());
        let mut hooks = RecordingHooks::default();

        plugin
            .register(&mut hooks, &PluginConfig::default())
            .unwrap();

        assert_eq!(hooks.subscriptions.len(), 7);
        assert!(
            hooks
                .subscriptions
                .contains(&("storage-add".to_string(), StorageOp::Add))
        );
    }

    #[test]
    fn register_fails_loudly_without_events() {
        let plugin = StoragePlugin::from_config(&PluginConfig::default());
        let mut hooks = RecordingHooks::default();
        let config = PluginConfig {
            events: HashMap::new(),
            storage: StorageConfig::default(),
        };

        let error = plugin.register(&mut hooks, &config).unwrap_err();
        assert!(matches!(error, FolioError::Configuration(_)));
    }

    #[test]
    fn register_skips_unknown_operation_names() {
        let plugin = StoragePlugin::from_config(&PluginConfig::default());
        let mut hooks = RecordingHooks::default();
        let mut events = HashMap::new();
        events.insert("explode".to_string(), vec!["storage-explode".to_string()]);
        events.insert("get".to_string(), vec!["storage-get".to_string()]);
        let config = PluginConfig {
            events,
            storage: StorageConfig::default(),
        };

        plugin.register(&mut hooks, &config).unwrap();
        assert_eq!(
            hooks.subscriptions,
            vec![("storage-get".to_string(), StorageOp::Get)]
        );
    }

    #[test]
    fn operation_names_round_trip() {
        for op in [
            StorageOp::All,
            StorageOp::GetQuery,
            StorageOp::Get,
            StorageOp::GetHistory,
            StorageOp::GetRevision,
            StorageOp::Add,
            StorageOp::Update,
            StorageOp::Delete,
            StorageOp::Reset,
        ] {
            assert_eq!(StorageOp::from_name(op.as_str()), Some(op));
        }
        assert_eq!(StorageOp::from_name("nonsense"), None);
    }

    #[tokio::test]
    async fn dispatch_add_get_delete_round_trip() {
        let plugin = StoragePlugin::from_config(&PluginConfig::default());

        plugin
            .dispatch(
                StorageOp::Add,
                json!({ "slug": "wired", "title": "Over the bus" }),
            )
            .await
            .unwrap();

        let fetched = plugin
            .dispatch(StorageOp::Get, json!({ "slug": "wired" }))
            .await
            .unwrap();
        assert_eq!(fetched["title"], json!("Over the bus"));

        let history = plugin
            .dispatch(StorageOp::GetHistory, json!("wired"))
            .await
            .unwrap();
        assert_eq!(history.as_array().unwrap().len(), 1);

        plugin
            .dispatch(StorageOp::Delete, json!({ "slug": "wired" }))
            .await
            .unwrap();
        let gone = plugin
            .dispatch(StorageOp::Get, json!({ "slug": "wired" }))
            .await
            .unwrap();
        assert_eq!(gone, Value::Null);
    }

    #[tokio::test]
    async fn dispatch_update_honors_original_slug() {
        let plugin = StoragePlugin::from_config(&PluginConfig::default());

        plugin
            .dispatch(StorageOp::Add, json!({ "slug": "before", "title": "v1" }))
            .await
            .unwrap();
        plugin
            .dispatch(
                StorageOp::Update,
                json!({
                    "document": { "slug": "after", "title": "v2" },
                    "originalSlug": "before",
                }),
            )
            .await
            .unwrap();

        let renamed = plugin
            .dispatch(StorageOp::Get, json!({ "slug": "after" }))
            .await
            .unwrap();
        assert_eq!(renamed["title"], json!("v2"));

        let history = plugin
            .dispatch(StorageOp::GetHistory, json!("after"))
            .await
            .unwrap();
        assert_eq!(history.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn get_query_without_a_parser_is_a_configuration_error() {
        let plugin = StoragePlugin::from_config(&PluginConfig::default());
        let error = plugin.get_query("SELECT * FROM documents").await.unwrap_err();
        assert!(matches!(error, FolioError::Configuration(_)));
    }
}

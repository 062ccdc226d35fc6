use crate::error::UiError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const STATUS_RUNNING: &str = "running";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub installed: bool,
    #[serde(default, rename = "fromFile", skip_serializing_if = "is_false")]
    pub from_file: bool,
    /// Any other keys an imported app file carried, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl App {
    pub fn builtin(
        id: &str,
        name: &str,
        description: &str,
        version: &str,
        icon: &str,
        installed: bool,
    ) -> Self {
        App {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            version: version.into(),
            icon: icon.into(),
            installed,
            from_file: false,
            extra: Map::new(),
        }
    }

    /// Validates a parsed app file. `id` and `name` must be non-empty strings;
    /// the result is always marked installed and file-sourced.
    pub fn from_file_value(value: Value) -> Result<App, UiError> {
        let Value::Object(mut fields) = value else {
            return Err(UiError::InvalidApp("expected an object"));
        };
        let present = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty())
        };
        if !present("id") || !present("name") {
            return Err(UiError::InvalidApp("missing required fields"));
        }
        fields.remove("installed");
        fields.remove("fromFile");
        let mut app: App = serde_json::from_value(Value::Object(fields))?;
        app.installed = true;
        app.from_file = true;
        Ok(app)
    }
}

pub fn default_apps() -> Vec<App> {
    vec![
        App::builtin(
            "calculator",
            "Calculator",
            "A simple calculator with advanced functions",
            "1.2.3",
            "🧮",
            true,
        ),
        App::builtin(
            "chess",
            "Chess",
            "Play chess against the AI or a friend",
            "2.0.1",
            "♟️",
            true,
        ),
        App::builtin(
            "notepad",
            "Notepad",
            "A simple text editor with AI assistance",
            "1.5.0",
            "📝",
            true,
        ),
        App::builtin(
            "weather",
            "Weather",
            "Check the weather forecast",
            "1.0.2",
            "⛅",
            false,
        ),
    ]
}

/// Apps keyed by id, iterated in first-insertion order.
#[derive(Debug, Default)]
pub struct AppRegistry {
    apps: Vec<App>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&App> {
        self.apps.iter().find(|a| a.id == id)
    }

    /// Replaces an existing entry in place, or appends a new one.
    pub fn upsert(&mut self, app: App) {
        match self.apps.iter_mut().find(|a| a.id == app.id) {
            Some(slot) => *slot = app,
            None => self.apps.push(app),
        }
    }

    pub fn mark_installed(&mut self, id: &str) -> Result<&App, UiError> {
        let app = self
            .apps
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| UiError::AppNotFound(id.to_string()))?;
        app.installed = true;
        Ok(app)
    }

    pub fn iter(&self) -> impl Iterator<Item = &App> {
        self.apps.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub status: String,
    pub version: String,
    /// Milliseconds since the epoch at registration. Never refreshed.
    #[serde(rename = "lastUpdated")]
    pub last_updated: f64,
}

#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Service>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: &str, name: &str, status: &str, version: &str, now_ms: f64) {
        self.services.insert(
            id.to_string(),
            Service {
                id: id.to_string(),
                name: name.to_string(),
                status: status.to_string(),
                version: version.to_string(),
                last_updated: now_ms,
            },
        );
    }

    /// True when every registered service reports `running` (vacuously true
    /// with none registered).
    pub fn all_running(&self) -> bool {
        self.services.values().all(|s| s.status == STATUS_RUNNING)
    }

    pub fn list(&self) -> Vec<&Service> {
        let mut v: Vec<_> = self.services.values().collect();
        v.sort_by(|a, b| a.id.cmp(&b.id));
        v
    }
}

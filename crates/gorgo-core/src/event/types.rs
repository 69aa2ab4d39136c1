use serde_json::{Value, json};

use crate::event::EventData;
use crate::kernel::constants;

/// Well-known events produced by the core and its collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum SystemEvent {
    /// Every plugin has started
    AppStarting { name: String, version: String },
    /// Shutdown has begun, plugins are about to stop
    AppStopping,
    /// The transport is listening
    ServerStarted { address: String },
    /// A plugin has started
    PluginStarted { plugin: String },
    /// A plugin has stopped
    PluginStopped { plugin: String },
    /// A request arrived
    RequestIncoming { method: String, path: String, ip: String },
    /// A request was handled successfully
    RequestCompleted { method: String, path: String, status: u16 },
    /// A request handler failed
    RequestError { method: String, path: String, error: String },
    /// No route matched a request
    RequestNotFound { method: String, path: String },
}

impl SystemEvent {
    /// Get the name this event is published under
    pub fn name(&self) -> &'static str {
        match self {
            SystemEvent::AppStarting { .. } => constants::EVENT_APP_STARTING,
            SystemEvent::AppStopping => constants::EVENT_APP_STOPPING,
            SystemEvent::ServerStarted { .. } => constants::EVENT_SERVER_STARTED,
            SystemEvent::PluginStarted { .. } => constants::EVENT_PLUGIN_STARTED,
            SystemEvent::PluginStopped { .. } => constants::EVENT_PLUGIN_STOPPED,
            SystemEvent::RequestIncoming { .. } => constants::EVENT_REQUEST_INCOMING,
            SystemEvent::RequestCompleted { .. } => constants::EVENT_REQUEST_COMPLETED,
            SystemEvent::RequestError { .. } => constants::EVENT_REQUEST_ERROR,
            SystemEvent::RequestNotFound { .. } => constants::EVENT_REQUEST_NOT_FOUND,
        }
    }

    /// Convert into the payload handed to subscribers
    pub fn into_data(self) -> EventData {
        let pairs: Vec<(&str, Value)> = match self {
            SystemEvent::AppStarting { name, version } => vec![
                (constants::DATA_KEY_APP_NAME, json!(name)),
                (constants::DATA_KEY_APP_VERSION, json!(version)),
            ],
            SystemEvent::AppStopping => vec![],
            SystemEvent::ServerStarted { address } => vec![("address", json!(address))],
            SystemEvent::PluginStarted { plugin } | SystemEvent::PluginStopped { plugin } => {
                vec![(constants::DATA_KEY_PLUGIN, json!(plugin))]
            }
            SystemEvent::RequestIncoming { method, path, ip } => vec![
                ("method", json!(method)),
                ("path", json!(path)),
                ("ip", json!(ip)),
            ],
            SystemEvent::RequestCompleted { method, path, status } => vec![
                ("method", json!(method)),
                ("path", json!(path)),
                ("status", json!(status)),
            ],
            SystemEvent::RequestError { method, path, error } => vec![
                ("method", json!(method)),
                ("path", json!(path)),
                ("error", json!(error)),
            ],
            SystemEvent::RequestNotFound { method, path } => {
                vec![("method", json!(method)), ("path", json!(path))]
            }
        };
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

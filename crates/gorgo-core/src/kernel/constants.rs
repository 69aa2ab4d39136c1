/// Framework name
pub const APP_NAME: &str = "Gorgo";

/// Framework version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default application name used when no configuration provides one
pub const DEFAULT_APP_NAME: &str = "Gorgo Application";

/// Default application version used when no configuration provides one
pub const DEFAULT_APP_VERSION: &str = "1.0.0";

// --- Well-known event names ---

/// Published by the application once every plugin has started
pub const EVENT_APP_STARTING: &str = "app.starting";

/// Published by the application before plugins are stopped
pub const EVENT_APP_STOPPING: &str = "app.stopping";

/// Published by the transport collaborator once it is listening
pub const EVENT_SERVER_STARTED: &str = "server.started";

/// Published by the plugin manager after each plugin starts
pub const EVENT_PLUGIN_STARTED: &str = "plugin.started";

/// Published by the plugin manager after each plugin stops
pub const EVENT_PLUGIN_STOPPED: &str = "plugin.stopped";

/// Request lifecycle events published by the request-handling collaborator
pub const EVENT_REQUEST_INCOMING: &str = "request.incoming";
pub const EVENT_REQUEST_COMPLETED: &str = "request.completed";
pub const EVENT_REQUEST_ERROR: &str = "request.error";
pub const EVENT_REQUEST_NOT_FOUND: &str = "request.not_found";

// --- Event data keys ---

/// Key holding the plugin name in `plugin.started` / `plugin.stopped` data
pub const DATA_KEY_PLUGIN: &str = "plugin";

/// Key holding the application name in `app.starting` data
pub const DATA_KEY_APP_NAME: &str = "name";

/// Key holding the application version in `app.starting` data
pub const DATA_KEY_APP_VERSION: &str = "version";

// --- Priority levels (higher runs first) ---

pub const PRIORITY_LOW: i32 = 0;
pub const PRIORITY_NORMAL: i32 = 50;
pub const PRIORITY_HIGH: i32 = 100;
pub const PRIORITY_CRITICAL: i32 = 200;

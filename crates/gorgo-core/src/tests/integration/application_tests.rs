#![cfg(test)]

use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::event::{SystemEvent, sync_event_handler};
use crate::kernel::bootstrap::Application;
use crate::kernel::constants;
use crate::kernel::context::Context;
use crate::kernel::error::{Error, KernelLifecyclePhase};
use crate::plugin_system::{PluginPriority, PluginState, PluginSystemError, compose};
use crate::tests::integration::common::{
    RecordingPlugin, new_call_log, plugins_at, terminal_handler,
};

#[cfg(feature = "toml-config")]
const CONFIG: &str = r#"
[app]
name = "storefront"
version = "3.2.1"

[plugins.database]
url = "postgres://localhost/shop"
pool_size = 8

[plugins.analytics]
sample_rate = 0.25
"#;

#[cfg(feature = "toml-config")]
#[tokio::test]
async fn test_full_application_lifecycle() {
    let config = AppConfig::from_toml_str(CONFIG).unwrap();
    let log = new_call_log();

    let database = Arc::new(
        RecordingPlugin::new("database", &log)
            .priority(PluginPriority::CRITICAL)
            .configurable()
            .with_service("db.pool", "pool"),
    );
    let sessions = Arc::new(
        RecordingPlugin::new("sessions", &log)
            .priority(PluginPriority::HIGH)
            .depends_on("database")
            .requires_service("db.pool")
            .with_middleware("session"),
    );
    let analytics = Arc::new(
        RecordingPlugin::new("analytics", &log)
            .with_hooks()
            .subscribes_to(constants::EVENT_REQUEST_COMPLETED)
            .subscribes_to(constants::EVENT_APP_STARTING)
            .with_middleware("timing"),
    );

    let mut app = Application::with_config(config);
    app.add_plugin(database.clone())
        .add_plugin(sessions.clone())
        .add_plugin(analytics.clone());

    let lifecycle = Arc::new(Mutex::new(Vec::new()));
    for event_name in [constants::EVENT_PLUGIN_STARTED, constants::EVENT_APP_STARTING] {
        let lifecycle = Arc::clone(&lifecycle);
        app.event_bus().subscribe(
            event_name,
            sync_event_handler(move |event| {
                let subject = event
                    .get_str(constants::DATA_KEY_PLUGIN)
                    .or_else(|| event.get_str(constants::DATA_KEY_APP_NAME))
                    .unwrap_or_default();
                lifecycle
                    .lock()
                    .unwrap()
                    .push(format!("{} {}", event.name(), subject));
                Ok(())
            }),
        );
    }

    let ctx = Context::background();
    let middleware = app.start(&ctx).await.expect("application should start");

    // Per-plugin configuration reached each plugin
    let db_config = database.received_config().unwrap();
    assert_eq!(db_config.get::<String>("url").as_deref(), Some("postgres://localhost/shop"));
    assert_eq!(db_config.get::<u32>("pool_size"), Some(8));
    assert_eq!(analytics.received_config().unwrap().get::<f64>("sample_rate"), Some(0.25));
    assert!(sessions.received_config().unwrap().is_empty());

    assert_eq!(
        *lifecycle.lock().unwrap(),
        vec![
            "plugin.started database",
            "plugin.started sessions",
            "plugin.started analytics",
            "app.starting storefront",
        ]
    );
    assert!(log.lock().unwrap().contains(&"analytics:event app.starting".to_string()));

    // Middleware handed to the transport, in installation order
    let handler = compose(&middleware, terminal_handler());
    let mut trail: Vec<String> = Vec::new();
    handler(&mut trail).unwrap();
    assert_eq!(trail, vec!["session", "timing", "handler"]);

    // The request-handling collaborator publishes request events
    app.event_bus()
        .publish_system(
            &ctx,
            SystemEvent::RequestCompleted {
                method: "GET".to_string(),
                path: "/products".to_string(),
                status: 200,
            },
        )
        .await
        .unwrap();
    assert!(log.lock().unwrap().contains(&"analytics:event request.completed".to_string()));

    app.shutdown(&ctx).await.expect("shutdown should succeed");
    assert_eq!(
        plugins_at(&log, "stop"),
        vec!["analytics", "sessions", "database"]
    );
    assert!(app
        .plugin_manager()
        .plugin_states()
        .iter()
        .all(|(_, state)| *state == PluginState::Stopped));
}

#[tokio::test]
async fn test_failed_start_keeps_application_down() {
    let log = new_call_log();
    let mut app = Application::new();
    app.add_plugin(Arc::new(RecordingPlugin::new("healthy", &log).priority(PluginPriority::HIGH)));
    app.add_plugin(Arc::new(RecordingPlugin::new("broken", &log).failing_at("start")));

    let app_starting = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&app_starting);
    app.event_bus().subscribe(
        constants::EVENT_APP_STARTING,
        sync_event_handler(move |_| {
            *counter.lock().unwrap() += 1;
            Ok(())
        }),
    );

    let err = app.start(&Context::background()).await.unwrap_err();

    match err {
        Error::PluginSystem(PluginSystemError::StartFailed { plugin, .. }) => {
            assert_eq!(plugin, "broken")
        }
        other => panic!("Expected StartFailed, got {:?}", other),
    }
    assert!(!app.is_started());
    assert_eq!(*app_starting.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_shutdown_returns_stop_error() {
    let log = new_call_log();
    let mut app = Application::new();
    app.add_plugin(Arc::new(RecordingPlugin::new("stubborn", &log).failing_at("stop")));

    let ctx = Context::background();
    app.start(&ctx).await.unwrap();
    let err = app.shutdown(&ctx).await.unwrap_err();

    match err {
        Error::KernelLifecycleError { phase, source, .. } => {
            assert_eq!(phase, KernelLifecyclePhase::Shutdown);
            let source = source.expect("stop error should be kept");
            assert!(source.to_string().contains("failed to stop plugin stubborn"));
        }
        other => panic!("Expected KernelLifecycleError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_application_hot_reload() {
    let log = new_call_log();
    let mut app = Application::new();
    let theme = Arc::new(RecordingPlugin::new("theme", &log).hot_reloadable(true));
    app.add_plugin(theme.clone());
    app.add_plugin(Arc::new(RecordingPlugin::new("fixed", &log)));

    let ctx = Context::background();
    app.start(&ctx).await.unwrap();

    let new_config = crate::config::PluginConfig::new().with("palette", "solarized");
    app.hot_reload_plugin("theme", &new_config).await.unwrap();
    assert_eq!(theme.received_config(), Some(new_config.clone()));

    let err = app.hot_reload_plugin("fixed", &new_config).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Plugin system error: plugin fixed does not support hot reload"
    );
}

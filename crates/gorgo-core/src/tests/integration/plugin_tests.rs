#![cfg(test)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::config::{AppConfig, PluginConfig};
use crate::kernel::bootstrap::Application;
use crate::kernel::container::Container;
use crate::kernel::context::Context;
use crate::plugin_system::{
    Configurable, Plugin, PluginBase, PluginMetadata, PluginPriority, PluginResult, PluginState,
};
use crate::tests::integration::common::{RecordingPlugin, new_call_log, plugins_at};

/// Spawns a background reporter on start that runs until the start context is cancelled
struct ReporterPlugin {
    base: PluginBase,
    ticks: Arc<AtomicUsize>,
    finished: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ReporterPlugin {
    fn new() -> Self {
        Self {
            base: PluginBase::new(
                PluginMetadata::new("reporter", "0.3.0").with_priority(PluginPriority::LOW),
            ),
            ticks: Arc::new(AtomicUsize::new(0)),
            finished: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Plugin for ReporterPlugin {
    fn metadata(&self) -> &PluginMetadata {
        self.base.metadata()
    }

    async fn initialize(&self, _container: &Container, config: &PluginConfig) -> PluginResult {
        self.validate_config(config)?;
        self.base.mark_initialized();
        Ok(())
    }

    async fn start(&self, ctx: &Context) -> PluginResult {
        let ctx = ctx.clone();
        let ticks = Arc::clone(&self.ticks);
        let finished = Arc::clone(&self.finished);
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = ctx.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_millis(5)) => {
                        ticks.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
            finished.store(true, Ordering::SeqCst);
        });
        *self.task.lock().unwrap() = Some(handle);
        self.base.mark_running();
        Ok(())
    }

    async fn stop(&self, _ctx: &Context) -> PluginResult {
        let handle = self.task.lock().unwrap().take();
        if let Some(handle) = handle {
            handle.await?;
        }
        self.base.mark_stopped();
        Ok(())
    }

    fn state(&self) -> PluginState {
        self.base.state()
    }

    fn as_configurable(&self) -> Option<&dyn Configurable> {
        Some(self)
    }
}

impl Configurable for ReporterPlugin {
    fn validate_config(&self, config: &PluginConfig) -> PluginResult {
        match config.get_raw("interval_ms") {
            None => Ok(()),
            Some(value) if value.as_u64().is_some_and(|ms| ms > 0) => Ok(()),
            Some(value) => Err(format!("interval_ms must be a positive integer, got {}", value).into()),
        }
    }

    fn default_config(&self) -> PluginConfig {
        PluginConfig::new().with("interval_ms", 5)
    }
}

#[tokio::test]
async fn test_background_work_follows_start_context() {
    let reporter = Arc::new(ReporterPlugin::new());
    let mut app = Application::new();
    app.add_plugin(reporter.clone());

    let run_ctx = Context::background();
    app.start(&run_ctx).await.unwrap();

    // The reporter keeps running after start returned
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(reporter.ticks.load(Ordering::SeqCst) > 0);
    assert!(!reporter.finished.load(Ordering::SeqCst));

    run_ctx.cancel();
    tokio::time::timeout(Duration::from_secs(2), app.shutdown(&Context::background()))
        .await
        .expect("shutdown should not hang")
        .unwrap();

    assert!(reporter.finished.load(Ordering::SeqCst));
    assert_eq!(reporter.state(), PluginState::Stopped);
}

#[tokio::test]
async fn test_invalid_config_blocks_startup() {
    let mut config = AppConfig::default();
    config
        .plugins
        .insert("reporter".to_string(), PluginConfig::new().with("interval_ms", "soon"));

    let reporter = Arc::new(ReporterPlugin::new());
    let mut app = Application::with_config(config);
    app.add_plugin(reporter.clone());

    let err = app.start(&Context::background()).await.unwrap_err();
    assert!(err.to_string().contains("invalid configuration for plugin reporter"));
    assert_eq!(reporter.state(), PluginState::Uninitialized);
    assert!(!app.is_started());
}

#[test]
fn test_defaults_merge_under_user_config() {
    let reporter = ReporterPlugin::new();
    let user = PluginConfig::new().with("label", "nightly");

    let effective = user.with_defaults(&reporter.default_config());
    assert_eq!(effective.get::<u64>("interval_ms"), Some(5));
    assert_eq!(effective.get::<String>("label").as_deref(), Some("nightly"));
    assert!(reporter.validate_config(&effective).is_ok());
}

#[cfg(feature = "yaml-config")]
#[tokio::test]
async fn test_dependency_graph_ordering_from_config() {
    let config = AppConfig::from_yaml_str(
        "
app:
  name: graph-demo
manager:
  ordering: dependency_graph
",
    )
    .unwrap();

    let log = new_call_log();
    let mut app = Application::with_config(config);
    app.add_plugin(Arc::new(
        RecordingPlugin::new("storage", &log)
            .priority(PluginPriority::LOW)
            .with_service("blob.store", "disk"),
    ))
    .add_plugin(Arc::new(
        RecordingPlugin::new("uploads", &log)
            .priority(PluginPriority::CRITICAL)
            .depends_on("storage")
            .requires_service("blob.store"),
    ))
    .add_plugin(Arc::new(
        RecordingPlugin::new("search", &log).priority(PluginPriority::HIGH),
    ));

    let ctx = Context::background();
    app.start(&ctx).await.unwrap();
    assert_eq!(
        plugins_at(&log, "start"),
        vec!["search", "storage", "uploads"]
    );

    app.shutdown(&ctx).await.unwrap();
    assert_eq!(
        plugins_at(&log, "stop"),
        vec!["uploads", "storage", "search"]
    );
}

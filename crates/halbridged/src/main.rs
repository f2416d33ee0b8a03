//! halbridged - The halbridge service
//!
//! This is the main entry point for the halbridge service.
//! It wires together all the components:
//! - Configuration loading
//! - Serialized task dispatcher
//! - Legacy engine (simulated or vendor function table)
//! - Lifecycle coordinator and observers

use anyhow::{Context, Result};
use clap::Parser;
use halbridge_api::{Event, LifecycleEvent};
use halbridge_config::{EngineConfig, HalConfig, load_config_or_default};
use halbridge_core::{
    ChannelObserver, LifecycleCoordinator, LoggingObserver, SerialDispatcher, TaskDispatcher,
};
use halbridge_engine_api::{EngineFunctionTable, FunctionTableEngine, LegacyEngine, MockEngine};
use halbridge_util::default_config_path;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// halbridged - Lifecycle service for the legacy HAL engine
#[derive(Parser, Debug)]
#[command(name = "halbridged")]
#[command(about = "Lifecycle service for the legacy HAL engine", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/halbridge/config.toml)
    #[arg(short, long, env = "HALBRIDGE_CONFIG", default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Log level (overrides the config file)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Do not start the engine until asked
    #[arg(long)]
    no_autostart: bool,
}

/// Main service state
struct Service {
    dispatcher: Arc<SerialDispatcher>,
    coordinator: LifecycleCoordinator,
    events: mpsc::UnboundedReceiver<Event>,
}

impl Service {
    fn new(config: HalConfig) -> Result<Self> {
        let dispatcher = Arc::new(
            SerialDispatcher::spawn(config.service.dispatcher_thread.clone())
                .context("Failed to spawn dispatcher thread")?,
        );

        let engine = Self::build_engine(&config.engine);
        let coordinator = LifecycleCoordinator::new(dispatcher.clone(), engine)
            .with_event_loop_thread_name(config.service.event_loop_thread.clone());

        let (channel, events) = ChannelObserver::new();
        coordinator.register_observer(Arc::new(LoggingObserver));
        coordinator.register_observer(Arc::new(channel));

        info!(
            dispatcher = %dispatcher.name(),
            event_loop_thread = %config.service.event_loop_thread,
            "Coordinator initialized"
        );

        Ok(Self {
            dispatcher,
            coordinator,
            events,
        })
    }

    fn build_engine(config: &EngineConfig) -> Arc<dyn LegacyEngine> {
        match config {
            EngineConfig::Simulated { init_status } => {
                info!(init_status = %init_status, "Using simulated engine");
                Arc::new(MockEngine::new().with_init_status(*init_status))
            }
            EngineConfig::Unsupported => {
                info!("Using stub engine function table");
                Arc::new(FunctionTableEngine::new(EngineFunctionTable::default()))
            }
        }
    }

    /// Run an entry point on the dispatcher so every call is serialized
    fn post(&self, action: fn(&LifecycleCoordinator)) -> Result<()> {
        let coordinator = self.coordinator.clone();
        self.dispatcher
            .post(Box::new(move || action(&coordinator)))
            .context("Failed to post to dispatcher")
    }

    async fn run(mut self, autostart: bool) -> Result<()> {
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup =
            signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

        if autostart {
            self.post(LifecycleCoordinator::start)?;
        } else {
            info!("Autostart disabled, engine left stopped");
        }

        info!("Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }
                _ = sighup.recv() => {
                    info!("Received SIGHUP, shutting down gracefully");
                    break;
                }

                Some(event) = self.events.recv() => {
                    Self::handle_event(&event);
                }
            }
        }

        // Flush queued events so only the stop requested below ends the wait
        while let Ok(event) = self.events.try_recv() {
            Self::handle_event(&event);
        }

        info!("Stopping HAL");
        self.post(LifecycleCoordinator::stop)?;

        while let Some(event) = self.events.recv().await {
            Self::handle_event(&event);
            if event.payload == LifecycleEvent::Stopped {
                break;
            }
        }

        let dispatcher = self.dispatcher.clone();
        tokio::task::spawn_blocking(move || dispatcher.shutdown())
            .await
            .context("Dispatcher shutdown task failed")?;

        info!("Shutdown complete");
        Ok(())
    }

    fn handle_event(event: &Event) {
        match &event.payload {
            LifecycleEvent::Started => {
                debug!(timestamp = %event.timestamp, "Lifecycle event: started");
            }
            LifecycleEvent::StartFailed { reason } => {
                warn!(
                    timestamp = %event.timestamp,
                    category = %reason.category,
                    description = %reason.description,
                    "Lifecycle event: start failed"
                );
            }
            LifecycleEvent::Stopped => {
                debug!(timestamp = %event.timestamp, "Lifecycle event: stopped");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config_or_default(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    // Initialize logging
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.service.log_level.clone());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config_path = %args.config.display(),
        "halbridged starting"
    );

    let autostart = config.service.autostart && !args.no_autostart;
    let service = Service::new(config)?;
    service.run(autostart).await
}

#![windows_subsystem = "windows"]

mod accessibility;
mod animation;
mod chart;
mod config;
mod feedback;
mod gamification;
mod gauge;
mod habits;
mod impact;
mod mock_data;
mod navigation;
mod observers;
mod recommendations;
mod research;
mod ringbuf;
mod schedule;
mod share;
mod storage;
pub mod theme;
mod theme_store;
mod ui;

use std::io::IsTerminal;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use config::AppConfig;
use storage::{FileStorage, KeyValueStore, MemoryStorage};
use ui::ChargeSense;

/// RUST_LOG wins when set; otherwise the configured level applies to the app
/// and iced's own crates stay at warn.
fn init_tracing(config: &AppConfig) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(format!("warn,chargesense={}", config.log_level))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(env_filter)
        .with_ansi(std::io::stdout().is_terminal())
        .compact()
        .init();
}

fn main() -> iced::Result {
    let (config, config_errors) = AppConfig::from_env();
    init_tracing(&config);
    for e in &config_errors {
        tracing::warn!("{e}; keeping the default for this setting");
    }
    config.log_config();

    let storage: Arc<dyn KeyValueStore> = if config.memory_storage {
        tracing::info!("Preferences kept in memory for this session");
        Arc::new(MemoryStorage::new())
    } else {
        Arc::new(FileStorage::new(config.data_dir.clone()))
    };

    iced::application(ChargeSense::title, ChargeSense::update, ChargeSense::view)
        .subscription(ChargeSense::subscription)
        .theme(ChargeSense::theme)
        .window(iced::window::Settings {
            size: (860.0, 760.0).into(),
            min_size: Some((480.0, 520.0).into()),
            #[cfg(target_os = "linux")]
            platform_specific: iced::window::settings::PlatformSpecific {
                application_id: String::from("chargesense"),
                ..Default::default()
            },
            ..Default::default()
        })
        .run_with(move || (ChargeSense::new(storage), iced::Task::none()))
}

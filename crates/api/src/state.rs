use std::sync::Arc;

use roster_core::services::ServicesConfig;
use roster_events::{EventBus, NotificationSender, NotificationStore};

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything shared is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: roster_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Third-party service credentials, loaded once at start-up.
    pub services: Arc<ServicesConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Event bus with every listener already registered.
    pub event_bus: Arc<EventBus>,
    /// Read side of the `database` notification channel.
    pub store: Arc<dyn NotificationStore>,
    /// Delivers notifications over every channel they declare.
    pub notifier: NotificationSender,
}

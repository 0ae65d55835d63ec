// --- Module Structure ---

// Leaf collaborators: persistence port and REST data store access.
pub mod api;
pub mod repository;
pub mod session;

// Domain types, input handling and identity.
pub mod auth;
pub mod config;
pub mod forms;
pub mod models;

// Routing core: guards and the route table.
pub mod routes;

// View Layer and the user actions it wires up.
pub mod actions;
pub mod views;

// Navigation driver and the terminal adapter around it.
pub mod app;
pub mod navigation;
pub mod shell;

// --- Public Re-exports ---

pub use api::{DataClient, DataClientState, HttpDataClient, InMemoryDataClient};
pub use app::App;
pub use config::AppConfig;
pub use repository::Repository;
pub use routes::{RouteAction, Router, ViewId};
pub use session::{FileSessionStore, MemorySessionStore, SessionState, SessionStore};

use models::SessionUser;

/// AppContext
///
/// The explicitly threaded context every view and action receives: the typed
/// repository over the Data Client, the session storage port and the loaded
/// configuration. Cloning is cheap; the collaborators sit behind `Arc`s.
#[derive(Clone)]
pub struct AppContext {
    /// Typed access to the REST data store.
    pub repo: Repository,
    /// Storage port holding the authenticated-user record.
    pub session: SessionState,
    /// Immutable configuration loaded at startup.
    pub config: AppConfig,
}

impl AppContext {
    pub fn new(client: DataClientState, session: SessionState, config: AppConfig) -> Self {
        Self {
            repo: Repository::new(client),
            session,
            config,
        }
    }

    /// The session as stored right now. Screens read it once on entry.
    pub fn current_user(&self) -> Option<SessionUser> {
        self.session.load()
    }
}

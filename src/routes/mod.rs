/// Router Module Index
///
/// Maps a location fragment to one of the screens, after the guards have had their
/// say. The split mirrors the two concerns of a routing decision:
///
/// - `guards`: who may be where (session presence only, never role).
/// - `table`: which screen a fragment names, as an ordered list of matchers.
///
/// Routing is pure. `Router::route` reads its inputs and returns a `RouteAction`;
/// it neither renders nor touches the location.
pub mod guards;
pub mod table;

use crate::models::SessionUser;
use guards::Guard;
use table::{RouteMatch, RouteTable};

// --- Fragments ---

pub const LOGIN: &str = "#/login";
pub const REGISTER: &str = "#/register";
pub const DASHBOARD: &str = "#/dashboard";
pub const EVENTS: &str = "#/dashboard/events";
pub const EVENTS_CREATE: &str = "#/dashboard/events/create";
pub const EVENTS_EDIT_PREFIX: &str = "#/dashboard/events/edit/";
pub const VENUES: &str = "#/dashboard/venues";
pub const VENUES_CREATE: &str = "#/dashboard/venues/create";
pub const VENUES_EDIT_PREFIX: &str = "#/dashboard/venues/edit/";

/// Everything at or under this prefix requires a session.
pub const PROTECTED_PREFIX: &str = DASHBOARD;

pub fn event_details(id: impl std::fmt::Display) -> String {
    format!("{EVENTS}/{id}")
}

pub fn edit_event(id: impl std::fmt::Display) -> String {
    format!("{EVENTS_EDIT_PREFIX}{id}")
}

pub fn edit_venue(id: impl std::fmt::Display) -> String {
    format!("{VENUES_EDIT_PREFIX}{id}")
}

/// ViewId
///
/// Handle of a View Layer function. The router hands one out; `views::render`
/// turns it into a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    Login,
    Register,
    Dashboard,
    Events,
    CreateEvent,
    EditEvent,
    EventDetails,
    Venues,
    CreateVenue,
    EditVenue,
    NotFound,
}

/// RouteAction
///
/// The single outcome of one routing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    /// Overwrite the fragment with the target and render nothing.
    Redirect(String),
    /// Render `view`, passing the identifier extracted from the fragment if any.
    Dispatch { view: ViewId, param: Option<String> },
    /// Render the not-found screen.
    NotFound,
}

/// Treats an empty fragment as the login fragment.
pub fn normalize(fragment: &str) -> &str {
    if fragment.is_empty() || fragment == "#" {
        LOGIN
    } else {
        fragment
    }
}

/// Router
///
/// Guards first, then the route table, first match wins at both stages.
#[derive(Debug)]
pub struct Router {
    guards: Vec<Guard>,
    table: RouteTable<ViewId>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(table::standard_table())
    }
}

impl Router {
    pub fn new(table: RouteTable<ViewId>) -> Self {
        Self {
            guards: guards::STANDARD.to_vec(),
            table,
        }
    }

    /// Replaces the guards, which run in the given order.
    pub fn with_guards(mut self, guards: Vec<Guard>) -> Self {
        self.guards = guards;
        self
    }

    /// route
    ///
    /// Decides what happens for `fragment` given the current session.
    pub fn route(&self, fragment: &str, session: Option<&SessionUser>) -> RouteAction {
        let fragment = normalize(fragment);

        if let Some(target) = guards::run(&self.guards, fragment, session.is_some()) {
            tracing::debug!(from = fragment, to = target, "guard redirect");
            return RouteAction::Redirect(target.to_string());
        }

        match self.table.resolve(fragment) {
            Some(RouteMatch { handler, param }) => RouteAction::Dispatch {
                view: handler,
                param,
            },
            None => RouteAction::NotFound,
        }
    }
}

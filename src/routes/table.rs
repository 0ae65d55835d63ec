use super::{
    DASHBOARD, EVENTS, EVENTS_CREATE, EVENTS_EDIT_PREFIX, LOGIN, REGISTER, VENUES, VENUES_CREATE,
    VENUES_EDIT_PREFIX, ViewId,
};
use regex::Regex;
use std::sync::LazyLock;

/// `#/dashboard/events/<digits>` and nothing after. ASCII digits only.
static EVENT_DETAILS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#/dashboard/events/([0-9]+)$").expect("event details pattern is valid")
});

/// RouteMatch
///
/// A resolved handler plus the identifier pulled out of the fragment, if the
/// matcher extracts one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<H> {
    pub handler: H,
    pub param: Option<String>,
}

/// RouteMatcher
///
/// One entry of the route table.
#[derive(Debug, Clone)]
pub enum RouteMatcher<H> {
    /// The fragment must equal `path`.
    Literal { path: String, handler: H },
    /// The fragment must start with `prefix`; the remainder, empty or not, is the
    /// identifier.
    Prefixed { prefix: String, handler: H },
    /// The whole fragment must match `regex`; the first capture group, if any, is
    /// the identifier.
    Pattern { regex: Regex, handler: H },
}

impl<H: Copy> RouteMatcher<H> {
    pub fn literal(path: impl Into<String>, handler: H) -> Self {
        RouteMatcher::Literal {
            path: path.into(),
            handler,
        }
    }

    pub fn prefixed(prefix: impl Into<String>, handler: H) -> Self {
        RouteMatcher::Prefixed {
            prefix: prefix.into(),
            handler,
        }
    }

    pub fn pattern(regex: Regex, handler: H) -> Self {
        RouteMatcher::Pattern { regex, handler }
    }

    pub fn matches(&self, fragment: &str) -> Option<RouteMatch<H>> {
        match self {
            RouteMatcher::Literal { path, handler } => (fragment == path).then(|| RouteMatch {
                handler: *handler,
                param: None,
            }),
            RouteMatcher::Prefixed { prefix, handler } => {
                fragment.strip_prefix(prefix.as_str()).map(|rest| RouteMatch {
                    handler: *handler,
                    param: Some(rest.to_string()),
                })
            }
            RouteMatcher::Pattern { regex, handler } => {
                regex.captures(fragment).map(|caps| RouteMatch {
                    handler: *handler,
                    param: caps.get(1).map(|m| m.as_str().to_string()),
                })
            }
        }
    }
}

/// RouteTable
///
/// Matchers evaluated in insertion order; the first hit wins.
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    matchers: Vec<RouteMatcher<H>>,
}

impl<H: Copy> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Copy> RouteTable<H> {
    pub fn new() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    pub fn with(mut self, matcher: RouteMatcher<H>) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn resolve(&self, fragment: &str) -> Option<RouteMatch<H>> {
        self.matchers.iter().find_map(|m| m.matches(fragment))
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// standard_table
///
/// The application's routes. Order matters: the edit prefixes must be tried before
/// the details pattern and the literals, otherwise `#/dashboard/events/edit/7`
/// would never reach the edit screen.
pub fn standard_table() -> RouteTable<ViewId> {
    RouteTable::new()
        .with(RouteMatcher::prefixed(EVENTS_EDIT_PREFIX, ViewId::EditEvent))
        .with(RouteMatcher::pattern(
            EVENT_DETAILS.clone(),
            ViewId::EventDetails,
        ))
        .with(RouteMatcher::prefixed(VENUES_EDIT_PREFIX, ViewId::EditVenue))
        .with(RouteMatcher::literal(LOGIN, ViewId::Login))
        .with(RouteMatcher::literal(REGISTER, ViewId::Register))
        .with(RouteMatcher::literal(DASHBOARD, ViewId::Dashboard))
        .with(RouteMatcher::literal(EVENTS, ViewId::Events))
        .with(RouteMatcher::literal(EVENTS_CREATE, ViewId::CreateEvent))
        .with(RouteMatcher::literal(VENUES, ViewId::Venues))
        .with(RouteMatcher::literal(VENUES_CREATE, ViewId::CreateVenue))
}

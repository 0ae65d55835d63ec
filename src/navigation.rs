use crate::models::SessionUser;
use crate::routes::{RouteAction, Router, ViewId};

/// Longest redirect chain followed before giving up.
pub const MAX_REDIRECTS: usize = 8;

/// Location
///
/// The current fragment. Writing the value it already holds is not a change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    fragment: String,
}

impl Location {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
        }
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Overwrites the fragment and reports whether the value changed.
    pub fn replace(&mut self, fragment: &str) -> bool {
        if self.fragment == fragment {
            return false;
        }
        self.fragment = fragment.to_string();
        true
    }
}

/// Landing
///
/// Where a navigation ended up once every redirect has been followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Landing {
    View { view: ViewId, param: Option<String> },
    /// A redirect pointed at the fragment already held, so nothing fires again.
    Unchanged,
}

/// Navigator
///
/// Owns the location and the router. Routing stays synchronous: one call to
/// `navigate` writes the fragment and returns exactly one `RouteAction`.
#[derive(Debug, Default)]
pub struct Navigator {
    router: Router,
    location: Location,
}

impl Navigator {
    pub fn new(router: Router, location: Location) -> Self {
        Self { router, location }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// navigate
    ///
    /// Overwrites the fragment with `fragment` and routes it.
    pub fn navigate(&mut self, fragment: &str, session: Option<&SessionUser>) -> RouteAction {
        self.location.replace(fragment);
        self.router.route(fragment, session)
    }

    /// settle
    ///
    /// Routes `fragment` and follows redirects until a screen is chosen. A redirect
    /// to the value the location already holds stops the chain, since writing the
    /// same value fires no change. Chains longer than `MAX_REDIRECTS` end on the
    /// not-found screen.
    pub fn settle(&mut self, fragment: &str, session: Option<&SessionUser>) -> Landing {
        let mut action = self.navigate(fragment, session);

        for _ in 0..MAX_REDIRECTS {
            match action {
                RouteAction::Dispatch { view, param } => return Landing::View { view, param },
                RouteAction::NotFound => {
                    return Landing::View {
                        view: ViewId::NotFound,
                        param: None,
                    };
                }
                RouteAction::Redirect(target) => {
                    if !self.location.replace(&target) {
                        return Landing::Unchanged;
                    }
                    action = self.router.route(&target, session);
                }
            }
        }

        match action {
            RouteAction::Dispatch { view, param } => Landing::View { view, param },
            RouteAction::NotFound => Landing::View {
                view: ViewId::NotFound,
                param: None,
            },
            RouteAction::Redirect(target) => {
                tracing::warn!(
                    from = fragment,
                    to = %target,
                    hops = MAX_REDIRECTS,
                    "redirect chain too long"
                );
                Landing::View {
                    view: ViewId::NotFound,
                    param: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::routes::guards::Guard;
    use crate::routes::{DASHBOARD, LOGIN};

    fn organizer() -> SessionUser {
        SessionUser {
            id: 2.into(),
            name: "Olga".to_string(),
            email: "olga@mail.com".to_string(),
            role: Role::Organizer,
        }
    }

    #[test]
    fn test_location_replace_reports_change() {
        let mut location = Location::new(LOGIN);
        assert!(!location.replace(LOGIN));
        assert!(location.replace(DASHBOARD));
        assert_eq!(location.fragment(), DASHBOARD);
    }

    #[test]
    fn test_navigate_returns_single_action() {
        let mut nav = Navigator::default();
        let action = nav.navigate("#/dashboard/events", None);
        assert_eq!(action, RouteAction::Redirect(LOGIN.to_string()));
        // navigate writes the requested fragment only; following is settle's job.
        assert_eq!(nav.location().fragment(), "#/dashboard/events");
    }

    #[test]
    fn test_settle_follows_guard_redirect() {
        let mut nav = Navigator::default();
        let landing = nav.settle("#/dashboard/venues", None);
        assert_eq!(
            landing,
            Landing::View {
                view: ViewId::Login,
                param: None
            }
        );
        assert_eq!(nav.location().fragment(), LOGIN);

        let landing = nav.settle(LOGIN, Some(&organizer()));
        assert_eq!(
            landing,
            Landing::View {
                view: ViewId::Dashboard,
                param: None
            }
        );
        assert_eq!(nav.location().fragment(), DASHBOARD);
    }

    fn loops_on_itself(fragment: &str, _authenticated: bool) -> Option<&'static str> {
        (fragment == "#/loop").then_some("#/loop")
    }

    #[test]
    fn test_self_redirect_is_unchanged() {
        let router = Router::default().with_guards(vec![loops_on_itself as Guard]);
        let mut nav = Navigator::new(router, Location::new(LOGIN));

        assert_eq!(nav.settle("#/loop", None), Landing::Unchanged);
        assert_eq!(nav.location().fragment(), "#/loop");
    }

    #[test]
    fn test_unknown_fragment_lands_on_not_found() {
        let mut nav = Navigator::default();
        assert_eq!(
            nav.settle("#/nowhere", None),
            Landing::View {
                view: ViewId::NotFound,
                param: None
            }
        );
    }
}

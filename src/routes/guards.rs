use super::{DASHBOARD, LOGIN, PROTECTED_PREFIX, REGISTER};

/// Fragments that only make sense without a session.
const GUEST_ONLY: [&str; 2] = [LOGIN, REGISTER];

/// Under the protected prefix. This is a plain prefix test, so `#/dashboardx`
/// counts as protected too.
pub fn is_protected(fragment: &str) -> bool {
    fragment.starts_with(PROTECTED_PREFIX)
}

pub fn is_guest_only(fragment: &str) -> bool {
    GUEST_ONLY.contains(&fragment)
}

/// Guard
///
/// Looks at a fragment and whether a session exists, and may name a redirect
/// target.
pub type Guard = fn(&str, bool) -> Option<&'static str>;

pub fn session_required(fragment: &str, authenticated: bool) -> Option<&'static str> {
    (is_protected(fragment) && !authenticated).then_some(LOGIN)
}

pub fn guest_only(fragment: &str, authenticated: bool) -> Option<&'static str> {
    (is_guest_only(fragment) && authenticated).then_some(DASHBOARD)
}

/// The guards every router starts with, in evaluation order.
pub const STANDARD: [Guard; 2] = [session_required, guest_only];

/// Runs `guards` in order and returns the redirect target of the first one that
/// fires.
pub fn run(guards: &[Guard], fragment: &str, authenticated: bool) -> Option<&'static str> {
    guards
        .iter()
        .find_map(|guard| guard(fragment, authenticated))
}

/// evaluate
///
/// Applies the standard guards. Role is not considered here; organizer-only
/// screens check it on entry.
pub fn evaluate(fragment: &str, authenticated: bool) -> Option<&'static str> {
    run(&STANDARD, fragment, authenticated)
}

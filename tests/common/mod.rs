#![allow(dead_code)]

use events_portal::{
    App, AppConfig, AppContext, InMemoryDataClient, MemorySessionStore,
    api::{Collection, DataClientState},
    auth::hash_password,
    models::{Role, SessionUser},
    session::SessionState,
};
use serde_json::json;
use std::sync::Arc;

pub const ORGANIZER_PASSWORD: &str = "secret";
pub const ATTENDEE_PASSWORD: &str = "pass";

/// Two users, one venue, three events. Event 2 is full, event 3 has no venue.
pub fn seeded_store() -> InMemoryDataClient {
    InMemoryDataClient::new()
        .with_records(
            Collection::Users,
            vec![
                json!({"id": 1, "name": "Olga", "email": "olga@mail.com",
                       "password": hash_password(ORGANIZER_PASSWORD), "role": "organizer"}),
                json!({"id": 2, "name": "Ana", "email": "ana@mail.com",
                       "password": hash_password(ATTENDEE_PASSWORD), "role": "attendee"}),
            ],
        )
        .with_records(
            Collection::Venues,
            vec![json!({"id": 1, "name": "Main Hall", "location": "Downtown", "capacity": 100})],
        )
        .with_records(
            Collection::Events,
            vec![
                json!({"id": 1, "title": "Rust Meetup", "description": "Talks",
                       "date": "2026-11-02", "time": "18:30", "venueId": 1,
                       "capacity": 10, "attendees": []}),
                json!({"id": 2, "title": "Full House", "description": "Sold out",
                       "date": "2026-12-01", "time": "20:00", "venueId": 1,
                       "capacity": 1, "attendees": [9]}),
                json!({"id": 3, "title": "Pop-up", "description": "Somewhere",
                       "date": "2026-12-24", "time": "10:00",
                       "capacity": 5, "attendees": []}),
            ],
        )
}

pub fn organizer() -> SessionUser {
    SessionUser {
        id: 1.into(),
        name: "Olga".to_string(),
        email: "olga@mail.com".to_string(),
        role: Role::Organizer,
    }
}

pub fn attendee() -> SessionUser {
    SessionUser {
        id: 2.into(),
        name: "Ana".to_string(),
        email: "ana@mail.com".to_string(),
        role: Role::Attendee,
    }
}

pub struct TestApp {
    pub app: App,
    pub store: Arc<InMemoryDataClient>,
}

pub fn context(store: Arc<InMemoryDataClient>, user: Option<SessionUser>) -> AppContext {
    let session = match user {
        Some(user) => MemorySessionStore::with_user(user),
        None => MemorySessionStore::new(),
    };
    AppContext::new(
        store as DataClientState,
        Arc::new(session) as SessionState,
        AppConfig::default(),
    )
}

pub fn spawn_app(user: Option<SessionUser>) -> TestApp {
    spawn_app_with(seeded_store(), user)
}

pub fn spawn_app_with(store: InMemoryDataClient, user: Option<SessionUser>) -> TestApp {
    let store = Arc::new(store);
    let app = App::new(context(store.clone(), user));
    TestApp { app, store }
}

mod common;

use common::{ATTENDEE_PASSWORD, attendee, organizer, spawn_app};
use events_portal::{
    ViewId,
    actions::Command,
    api::Collection,
    forms::{EventForm, LoginForm, RegisterForm, VenueForm},
    models::Role,
    routes::{DASHBOARD, EVENTS, LOGIN, VENUES},
    views::MessageKind,
};
use serde_json::{Value, json};

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn new_event_form() -> EventForm {
    EventForm {
        title: text("Workshop"),
        description: text("Hands on"),
        date: text("2026-11-20"),
        time: text("09:00"),
        venue: text("1"),
        capacity: text("25"),
    }
}

fn find(records: &[Value], id: u64) -> Option<&Value> {
    records.iter().find(|r| r["id"] == json!(id))
}

fn message(screen: &events_portal::views::Screen) -> (MessageKind, &str) {
    let message = screen.message.as_ref().expect("message shown");
    (message.kind, message.text.as_str())
}

// --- Identity ---

#[tokio::test]
async fn test_login_success_goes_to_dashboard() {
    let mut t = spawn_app(None);
    t.app.start().await;

    let screen = t
        .app
        .execute(Command::Login(LoginForm {
            email: " ana@mail.com ".to_string(),
            password: ATTENDEE_PASSWORD.to_string(),
        }))
        .await;
    assert_eq!(screen.view, ViewId::Dashboard);
    assert_eq!(
        message(screen),
        (MessageKind::Success, "Login successful. Redirecting...")
    );
    assert_eq!(t.app.location(), DASHBOARD);
    assert_eq!(t.app.context().current_user(), Some(attendee()));
}

#[tokio::test]
async fn test_login_wrong_password_stays() {
    let mut t = spawn_app(None);
    t.app.navigate_to(LOGIN).await;

    let screen = t
        .app
        .execute(Command::Login(LoginForm {
            email: "ana@mail.com".to_string(),
            password: "nope".to_string(),
        }))
        .await;
    assert_eq!(screen.view, ViewId::Login);
    assert_eq!(message(screen), (MessageKind::Alert, "Invalid credentials"));
    assert!(t.app.context().current_user().is_none());
}

#[tokio::test]
async fn test_login_blank_email_is_rejected_before_lookup() {
    let mut t = spawn_app(None);
    t.store.set_failing(true);
    let screen = t
        .app
        .execute(Command::Login(LoginForm {
            email: "   ".to_string(),
            password: "x".to_string(),
        }))
        .await;
    assert_eq!(
        message(screen).1,
        "The \"Email\" field cannot be empty or contain only spaces."
    );
}

#[tokio::test]
async fn test_register_creates_attendee_and_logs_in() {
    let mut t = spawn_app(None);
    t.app.navigate_to("#/register").await;

    let screen = t
        .app
        .execute(Command::Register(RegisterForm {
            name: "Bo".to_string(),
            email: "bo@mail.com".to_string(),
            password: "pw".to_string(),
        }))
        .await;
    // Sent to login, which forwards an authenticated user to the dashboard.
    assert_eq!(screen.view, ViewId::Dashboard);
    assert_eq!(t.app.location(), DASHBOARD);

    let session = t.app.context().current_user().expect("logged in");
    assert_eq!(session.id.as_number(), Some(3));
    assert_eq!(session.role, Role::Attendee);

    let users = t.store.records(Collection::Users);
    let stored = find(&users, 3).expect("user stored");
    assert_eq!(stored["role"], "attendee");
    assert_eq!(stored["password"], events_portal::auth::hash_password("pw"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let mut t = spawn_app(None);
    let screen = t
        .app
        .execute(Command::Register(RegisterForm {
            name: "Ana Again".to_string(),
            email: "ana@mail.com".to_string(),
            password: "pw".to_string(),
        }))
        .await;
    assert_eq!(message(screen), (MessageKind::Alert, "Email already registered"));
    assert_eq!(t.store.records(Collection::Users).len(), 2);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let mut t = spawn_app(Some(attendee()));
    t.app.navigate_to(DASHBOARD).await;
    let screen = t.app.execute(Command::Logout).await;
    assert_eq!(screen.view, ViewId::Login);
    assert!(t.app.context().current_user().is_none());

    // Protected pages are closed again.
    let screen = t.app.navigate_to(EVENTS).await;
    assert_eq!(screen.view, ViewId::Login);
}

// --- Events ---

#[tokio::test]
async fn test_create_event_validates_before_network() {
    let mut t = spawn_app(Some(organizer()));
    t.app.navigate_to("#/dashboard/events/create").await;

    let screen = t
        .app
        .execute(Command::CreateEvent(EventForm {
            title: text("   "),
            ..new_event_form()
        }))
        .await;
    assert_eq!(screen.view, ViewId::CreateEvent);
    assert_eq!(
        message(screen),
        (
            MessageKind::Alert,
            "The \"Title\" field cannot be empty or contain only spaces."
        )
    );
    assert_eq!(t.store.records(Collection::Events).len(), 3);
}

#[tokio::test]
async fn test_create_event_success() {
    let mut t = spawn_app(Some(organizer()));
    t.app.navigate_to("#/dashboard/events/create").await;

    let screen = t.app.execute(Command::CreateEvent(new_event_form())).await;
    assert_eq!(screen.view, ViewId::Events);
    assert_eq!(
        message(screen),
        (MessageKind::Success, "Event created successfully!")
    );
    assert!(screen.body.iter().any(|l| l.contains("Workshop")));

    let events = t.store.records(Collection::Events);
    let created = find(&events, 4).expect("event stored with next id");
    assert_eq!(created["venueId"], json!(1));
    assert_eq!(created["capacity"], json!(25));
    assert_eq!(created["attendees"], json!([]));
}

#[tokio::test]
async fn test_create_event_store_failure() {
    let mut t = spawn_app(Some(organizer()));
    t.app.navigate_to("#/dashboard/events/create").await;
    t.store.set_failing(true);

    let screen = t.app.execute(Command::CreateEvent(new_event_form())).await;
    assert_eq!(screen.view, ViewId::CreateEvent);
    assert_eq!(
        message(screen),
        (MessageKind::Alert, "There was an error creating the event.")
    );
}

#[tokio::test]
async fn test_attendee_cannot_create_events() {
    let mut t = spawn_app(Some(attendee()));
    let screen = t.app.execute(Command::CreateEvent(new_event_form())).await;
    assert_eq!(screen.view, ViewId::Dashboard);
    assert_eq!(screen.message.as_ref().map(|m| m.kind), Some(MessageKind::Alert));
    assert_eq!(t.store.records(Collection::Events).len(), 3);
}

#[tokio::test]
async fn test_update_event_keeps_unspecified_fields_and_attendees() {
    let mut t = spawn_app(Some(organizer()));
    t.app.navigate_to("#/dashboard/events/edit/2").await;

    let screen = t
        .app
        .execute(Command::UpdateEvent {
            id: "2".to_string(),
            form: EventForm {
                capacity: text("50"),
                ..EventForm::default()
            },
        })
        .await;
    assert_eq!(screen.view, ViewId::Events);
    assert_eq!(
        message(screen),
        (MessageKind::Success, "Event updated successfully!")
    );

    let events = t.store.records(Collection::Events);
    let updated = find(&events, 2).expect("event kept");
    assert_eq!(updated["title"], "Full House");
    assert_eq!(updated["capacity"], json!(50));
    assert_eq!(updated["attendees"], json!([9]));
    assert_eq!(updated["id"], json!(2));
}

#[tokio::test]
async fn test_update_event_rejects_bad_field_without_loading() {
    let mut t = spawn_app(Some(organizer()));
    t.app.navigate_to("#/dashboard/events/edit/1").await;

    let screen = t
        .app
        .execute(Command::UpdateEvent {
            id: "1".to_string(),
            form: EventForm {
                date: text("tomorrow"),
                ..EventForm::default()
            },
        })
        .await;
    assert_eq!(screen.view, ViewId::EditEvent);
    assert_eq!(
        message(screen),
        (
            MessageKind::Alert,
            "The \"Date\" field must be a valid date (YYYY-MM-DD)."
        )
    );
}

#[tokio::test]
async fn test_delete_event_from_list_reloads_list() {
    let mut t = spawn_app(Some(organizer()));
    t.app.navigate_to(EVENTS).await;
    let before = t.app.dispatches();

    let screen = t.app.execute(Command::DeleteEvent("1".to_string())).await;
    assert_eq!(screen.view, ViewId::Events);
    assert!(!screen.body.iter().any(|l| l.contains("Rust Meetup")));
    assert_eq!(
        message(screen),
        (MessageKind::Success, "Event deleted successfully!")
    );
    assert_eq!(t.app.dispatches(), before + 1);
    assert!(find(&t.store.records(Collection::Events), 1).is_none());
}

#[tokio::test]
async fn test_delete_event_from_details_goes_to_list() {
    let mut t = spawn_app(Some(organizer()));
    t.app.navigate_to("#/dashboard/events/3").await;
    let screen = t.app.execute(Command::DeleteEvent("3".to_string())).await;
    assert_eq!(screen.view, ViewId::Events);
    assert_eq!(t.app.location(), EVENTS);
}

#[tokio::test]
async fn test_join_and_leave_event() {
    let mut t = spawn_app(Some(attendee()));
    t.app.navigate_to("#/dashboard/events/1").await;

    let screen = t.app.execute(Command::JoinEvent("1".to_string())).await;
    assert_eq!(screen.view, ViewId::EventDetails);
    assert_eq!(
        message(screen),
        (MessageKind::Success, "Successfully registered for the event!")
    );
    assert!(screen.body.contains(&"Status: Registered".to_string()));
    assert!(screen.body.contains(&"Attendees: 1".to_string()));
    let events = t.store.records(Collection::Events);
    assert_eq!(find(&events, 1).unwrap()["attendees"], json!([2]));

    let screen = t.app.execute(Command::JoinEvent("1".to_string())).await;
    assert_eq!(
        message(screen),
        (MessageKind::Alert, "You are already registered for this event.")
    );

    let screen = t.app.execute(Command::LeaveEvent("1".to_string())).await;
    assert_eq!(
        message(screen),
        (MessageKind::Success, "Successfully unregistered from the event!")
    );
    assert!(screen.body.contains(&"Status: Not registered".to_string()));
    let events = t.store.records(Collection::Events);
    assert_eq!(find(&events, 1).unwrap()["attendees"], json!([]));
}

#[tokio::test]
async fn test_join_full_event() {
    let mut t = spawn_app(Some(attendee()));
    t.app.navigate_to("#/dashboard/events/2").await;
    let screen = t.app.execute(Command::JoinEvent("2".to_string())).await;
    assert_eq!(screen.view, ViewId::EventDetails);
    assert_eq!(message(screen), (MessageKind::Alert, "Event is full!"));
    let events = t.store.records(Collection::Events);
    assert_eq!(find(&events, 2).unwrap()["attendees"], json!([9]));
}

// --- Venues ---

#[tokio::test]
async fn test_venue_lifecycle() {
    let mut t = spawn_app(Some(organizer()));
    t.app.navigate_to("#/dashboard/venues/create").await;

    let screen = t
        .app
        .execute(Command::CreateVenue(VenueForm {
            name: text("Annex"),
            location: text("Uptown"),
            capacity: text("30"),
        }))
        .await;
    assert_eq!(screen.view, ViewId::Venues);
    assert_eq!(
        message(screen),
        (MessageKind::Success, "Venue created successfully!")
    );
    assert!(find(&t.store.records(Collection::Venues), 2).is_some());

    let screen = t
        .app
        .execute(Command::UpdateVenue {
            id: "2".to_string(),
            form: VenueForm {
                location: text("Midtown"),
                ..VenueForm::default()
            },
        })
        .await;
    assert_eq!(
        message(screen),
        (MessageKind::Success, "Venue updated successfully!")
    );
    let venues = t.store.records(Collection::Venues);
    let updated = find(&venues, 2).unwrap();
    assert_eq!(updated["name"], "Annex");
    assert_eq!(updated["location"], "Midtown");

    let screen = t.app.execute(Command::DeleteVenue("2".to_string())).await;
    assert_eq!(screen.view, ViewId::Venues);
    assert_eq!(t.app.location(), VENUES);
    assert!(find(&t.store.records(Collection::Venues), 2).is_none());
}

#[tokio::test]
async fn test_venue_validation_message() {
    let mut t = spawn_app(Some(organizer()));
    t.app.navigate_to("#/dashboard/venues/create").await;
    let screen = t
        .app
        .execute(Command::CreateVenue(VenueForm {
            name: text("Annex"),
            location: text("Uptown"),
            capacity: text("zero"),
        }))
        .await;
    assert_eq!(screen.view, ViewId::CreateVenue);
    assert_eq!(
        message(screen).1,
        "The \"Capacity\" field must be a whole number of at least 1."
    );
}

#[test]
fn test_delete_needs_confirmation() {
    assert!(Command::DeleteEvent("1".to_string()).confirmation().is_some());
    assert!(Command::DeleteVenue("1".to_string()).confirmation().is_some());
    assert!(Command::Logout.confirmation().is_none());
}

use crate::{
    AppContext,
    actions::Command,
    auth::{self, Denied},
    models::{Event, RecordId, Venue},
    routes::{self, DASHBOARD, EVENTS, EVENTS_CREATE, LOGIN, REGISTER, VENUES, VENUES_CREATE, ViewId},
};

// --- Screen Model ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Alert,
}

/// Message
///
/// Inline feedback shown under a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

impl Message {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    pub fn alert(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Alert,
            text: text.into(),
        }
    }
}

/// What choosing an offered action does.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    /// Go to a fragment.
    Navigate(String),
    /// Run a complete command (buttons).
    Invoke(Command),
    /// A form: the user has to supply the fields shown in the usage line.
    Form(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenAction {
    pub label: String,
    pub kind: ActionKind,
}

/// Screen
///
/// A rendered view: what the user sees and what they can do next. `generation`
/// is stamped by the navigator so output from a superseded render can be told
/// apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub view: ViewId,
    pub title: String,
    pub body: Vec<String>,
    pub message: Option<Message>,
    pub actions: Vec<ScreenAction>,
    pub generation: u64,
}

impl Screen {
    pub fn new(view: ViewId, title: impl Into<String>) -> Self {
        Self {
            view,
            title: title.into(),
            body: Vec::new(),
            message: None,
            actions: Vec::new(),
            generation: 0,
        }
    }

    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.body.push(text.into());
        self
    }

    pub fn navigate(mut self, label: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.actions.push(ScreenAction {
            label: label.into(),
            kind: ActionKind::Navigate(fragment.into()),
        });
        self
    }

    pub fn invoke(mut self, label: impl Into<String>, command: Command) -> Self {
        self.actions.push(ScreenAction {
            label: label.into(),
            kind: ActionKind::Invoke(command),
        });
        self
    }

    pub fn form(mut self, label: impl Into<String>, usage: &'static str) -> Self {
        self.actions.push(ScreenAction {
            label: label.into(),
            kind: ActionKind::Form(usage),
        });
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }

    /// Whether one of the offered actions navigates to `fragment`.
    pub fn links_to(&self, fragment: &str) -> bool {
        self.actions
            .iter()
            .any(|a| matches!(&a.kind, ActionKind::Navigate(f) if f == fragment))
    }
}

/// ViewOutcome
///
/// A view either renders or asks to be sent elsewhere (entry checks).
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome {
    Rendered(Screen),
    Redirect(String),
}

impl From<Screen> for ViewOutcome {
    fn from(screen: Screen) -> Self {
        ViewOutcome::Rendered(screen)
    }
}

impl From<Denied> for ViewOutcome {
    fn from(Denied(target): Denied) -> Self {
        ViewOutcome::Redirect(target.to_string())
    }
}

// --- Form usage lines ---

pub const LOGIN_USAGE: &str = "login <email> <password>";
pub const REGISTER_USAGE: &str = "register <name> <email> <password>";
pub const EVENT_CREATE_USAGE: &str =
    "event-create title=<text> description=<text> date=YYYY-MM-DD time=HH:MM venue=<id> capacity=<n>";
pub const EVENT_EDIT_USAGE: &str =
    "event-edit [id] [title=..] [description=..] [date=..] [time=..] [venue=..] [capacity=..]";
pub const VENUE_CREATE_USAGE: &str = "venue-create name=<text> location=<text> capacity=<n>";
pub const VENUE_EDIT_USAGE: &str = "venue-edit [id] [name=..] [location=..] [capacity=..]";

// --- Dispatch ---

/// render
///
/// Maps a routed view handle to its View Layer function.
pub async fn render(ctx: &AppContext, view: ViewId, param: Option<&str>) -> ViewOutcome {
    let id = param.unwrap_or_default();
    match view {
        ViewId::Login => show_login(ctx),
        ViewId::Register => show_register(ctx),
        ViewId::Dashboard => show_dashboard(ctx),
        ViewId::Events => show_events(ctx).await,
        ViewId::CreateEvent => show_create_event(ctx).await,
        ViewId::EditEvent => show_edit_event(ctx, id).await,
        ViewId::EventDetails => show_event_details(ctx, id).await,
        ViewId::Venues => show_venues(ctx).await,
        ViewId::CreateVenue => show_create_venue(ctx),
        ViewId::EditVenue => show_edit_venue(ctx, id).await,
        ViewId::NotFound => render_not_found().into(),
    }
}

fn venue_name<'a>(venues: &'a [Venue], id: Option<&RecordId>) -> &'a str {
    id.and_then(|id| venues.iter().find(|v| &v.id == id))
        .map(|v| v.name.as_str())
        .unwrap_or("Unknown")
}

fn venue_options(venues: &[Venue]) -> Vec<String> {
    if venues.is_empty() {
        return vec!["Venues: none available".to_string()];
    }
    std::iter::once("Venues:".to_string())
        .chain(
            venues
                .iter()
                .map(|v| format!("  [{}] {} ({})", v.id, v.name, v.location)),
        )
        .collect()
}

// --- Screens ---

pub fn render_not_found() -> Screen {
    Screen::new(ViewId::NotFound, "Page Not Found")
        .line("Sorry, the page you are looking for does not exist.")
        .navigate("Go to Dashboard", DASHBOARD)
}

pub fn show_login(_ctx: &AppContext) -> ViewOutcome {
    Screen::new(ViewId::Login, "Login")
        .form("Enter", LOGIN_USAGE)
        .navigate("Don't have an account? Register here", REGISTER)
        .into()
}

pub fn show_register(_ctx: &AppContext) -> ViewOutcome {
    Screen::new(ViewId::Register, "Register")
        .form("Register", REGISTER_USAGE)
        .navigate("Already have an account? Login here", LOGIN)
        .into()
}

/// show_dashboard
///
/// Menu of the signed-in user. Management entries only appear for organizers.
pub fn show_dashboard(ctx: &AppContext) -> ViewOutcome {
    let user = match auth::require_session(ctx) {
        Ok(user) => user,
        Err(denied) => return denied.into(),
    };

    let mut screen = Screen::new(
        ViewId::Dashboard,
        format!("Welcome, {} ({})", user.name, user.role),
    )
    .navigate("View Events", EVENTS);

    if user.is_organizer() {
        screen = screen
            .navigate("Create New Event", EVENTS_CREATE)
            .navigate("Manage Venues", VENUES)
            .navigate("Create New Venue", VENUES_CREATE);
    }

    screen.invoke("Logout", Command::Logout).into()
}

/// show_events
///
/// Every event with its venue name. A failed load still renders the screen, with
/// the error inline.
pub async fn show_events(ctx: &AppContext) -> ViewOutcome {
    let user = match auth::require_session(ctx) {
        Ok(user) => user,
        Err(denied) => return denied.into(),
    };

    let screen = Screen::new(ViewId::Events, "Available Events");

    let loaded = async {
        let events = ctx.repo.events().await?;
        let venues = ctx.repo.venues().await?;
        Ok::<_, crate::api::ClientError>((events, venues))
    }
    .await;

    let (events, venues) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Error loading events: {}", e);
            return screen
                .line("Error loading events.")
                .with_message(Message::alert(
                    "Could not load events. Please try again later.",
                ))
                .navigate("Back to Dashboard", DASHBOARD)
                .into();
        }
    };

    if events.is_empty() {
        return screen
            .line("No events available. Create one!")
            .navigate("Back to Dashboard", DASHBOARD)
            .into();
    }

    let mut screen = screen;
    for event in &events {
        screen = screen
            .line(format!("[{}] {}", event.id, event.title))
            .line(format!("    Description: {}", event.description))
            .line(format!("    Date: {} Time: {}", event.date, event.time))
            .line(format!(
                "    Venue: {}",
                venue_name(&venues, event.venue_id.as_ref())
            ))
            .line(format!(
                "    Capacity: {}  Attendees: {}",
                event.capacity,
                event.attendee_count()
            ))
            .navigate(
                format!("View Details: {}", event.title),
                routes::event_details(&event.id),
            );

        if user.is_organizer() {
            screen = screen
                .navigate(format!("Edit: {}", event.title), routes::edit_event(&event.id))
                .invoke(
                    format!("Delete: {}", event.title),
                    Command::DeleteEvent(event.id.to_string()),
                );
        }
    }

    screen.navigate("Back to Dashboard", DASHBOARD).into()
}

/// show_create_event
///
/// Venue options are best effort: if they cannot be loaded the form still renders
/// with an empty list.
pub async fn show_create_event(ctx: &AppContext) -> ViewOutcome {
    if let Err(denied) = auth::require_organizer(ctx) {
        return denied.into();
    }

    let venues = ctx.repo.venues().await.unwrap_or_else(|e| {
        tracing::error!("Error loading venues: {}", e);
        Vec::new()
    });

    let mut screen = Screen::new(ViewId::CreateEvent, "Create New Event");
    for line in venue_options(&venues) {
        screen = screen.line(line);
    }
    screen
        .form("Create Event", EVENT_CREATE_USAGE)
        .navigate("Cancel", DASHBOARD)
        .into()
}

/// show_edit_event
///
/// The id comes straight from the fragment and is not validated here; a bad one
/// surfaces as a load error.
pub async fn show_edit_event(ctx: &AppContext, id: &str) -> ViewOutcome {
    if let Err(denied) = auth::require_organizer(ctx) {
        return denied.into();
    }

    let loaded = async {
        let event = ctx.repo.event(id).await?;
        let venues = ctx.repo.venues().await?;
        Ok::<_, crate::api::ClientError>((event, venues))
    }
    .await;

    let screen = Screen::new(ViewId::EditEvent, "Edit Event");
    let (event, venues) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Error loading event data or venues: {}", e);
            return screen
                .line(format!("Error loading event or venues. {e}"))
                .navigate("Back to Events", EVENTS)
                .into();
        }
    };

    let mut screen = screen
        .line(format!("Event id: {}", event.id))
        .line(format!("title: {}", event.title))
        .line(format!("description: {}", event.description))
        .line(format!("date: {}", event.date))
        .line(format!("time: {}", event.time))
        .line(format!(
            "venue: {}",
            event
                .venue_id
                .as_ref()
                .map(RecordId::to_string)
                .unwrap_or_default()
        ))
        .line(format!("capacity: {}", event.capacity));
    for line in venue_options(&venues) {
        screen = screen.line(line);
    }
    screen
        .form("Update Event", EVENT_EDIT_USAGE)
        .navigate("Cancel", EVENTS)
        .into()
}

/// show_event_details
///
/// Attendees can register or unregister; organizers get edit and delete instead.
pub async fn show_event_details(ctx: &AppContext, id: &str) -> ViewOutcome {
    let user = match auth::require_session(ctx) {
        Ok(user) => user,
        Err(denied) => return denied.into(),
    };

    let loaded = async {
        let event = ctx.repo.event(id).await?;
        let venue = match &event.venue_id {
            Some(venue_id) => Some(ctx.repo.venue(venue_id.as_str()).await?),
            None => None,
        };
        Ok::<_, crate::api::ClientError>((event, venue))
    }
    .await;

    let (event, venue) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Error loading event details: {}", e);
            return Screen::new(ViewId::EventDetails, "Event Details")
                .line(format!("Error loading event details. {e}"))
                .navigate("Back to Events", EVENTS)
                .into();
        }
    };

    details_screen(&event, venue.as_ref(), &user).into()
}

fn details_screen(event: &Event, venue: Option<&Venue>, user: &crate::models::SessionUser) -> Screen {
    let (venue_name, venue_location) = venue
        .map(|v| (v.name.as_str(), v.location.as_str()))
        .unwrap_or(("Unknown", "N/A"));

    let mut screen = Screen::new(
        ViewId::EventDetails,
        format!("Event Details: {}", event.title),
    )
    .line(format!("Description: {}", event.description))
    .line(format!("Date: {} Time: {}", event.date, event.time))
    .line(format!("Venue: {venue_name} ({venue_location})"))
    .line(format!("Capacity: {}", event.capacity))
    .line(format!("Attendees: {}", event.attendee_count()));

    if user.is_organizer() {
        screen = screen
            .navigate("Edit Event", routes::edit_event(&event.id))
            .invoke("Delete Event", Command::DeleteEvent(event.id.to_string()));
    } else if event.has_attendee(&user.id) {
        screen = screen
            .line("Status: Registered")
            .invoke("Unregister", Command::LeaveEvent(event.id.to_string()));
    } else {
        screen = screen
            .line("Status: Not registered")
            .invoke("Register", Command::JoinEvent(event.id.to_string()));
    }

    screen.navigate("Back to Events", EVENTS)
}

/// show_venues
///
/// Organizer-only listing of venues with edit and delete for each.
pub async fn show_venues(ctx: &AppContext) -> ViewOutcome {
    if let Err(denied) = auth::require_organizer(ctx) {
        return denied.into();
    }

    let screen = Screen::new(ViewId::Venues, "Available Venues");
    let venues = match ctx.repo.venues().await {
        Ok(venues) => venues,
        Err(e) => {
            tracing::error!("Error loading venues: {}", e);
            return screen
                .line("Error loading venues.")
                .with_message(Message::alert(
                    "Could not load venues. Please try again later.",
                ))
                .navigate("Back to Dashboard", DASHBOARD)
                .into();
        }
    };

    if venues.is_empty() {
        return screen
            .line("No venues available. Create one!")
            .navigate("Back to Dashboard", DASHBOARD)
            .into();
    }

    let mut screen = screen;
    for venue in &venues {
        screen = screen
            .line(format!("[{}] {}", venue.id, venue.name))
            .line(format!("    Location: {}", venue.location))
            .line(format!("    Capacity: {}", venue.capacity))
            .navigate(format!("Edit: {}", venue.name), routes::edit_venue(&venue.id))
            .invoke(
                format!("Delete: {}", venue.name),
                Command::DeleteVenue(venue.id.to_string()),
            );
    }

    screen.navigate("Back to Dashboard", DASHBOARD).into()
}

pub fn show_create_venue(ctx: &AppContext) -> ViewOutcome {
    if let Err(denied) = auth::require_organizer(ctx) {
        return denied.into();
    }

    Screen::new(ViewId::CreateVenue, "Create New Venue")
        .form("Create Venue", VENUE_CREATE_USAGE)
        .navigate("Cancel", VENUES)
        .into()
}

pub async fn show_edit_venue(ctx: &AppContext, id: &str) -> ViewOutcome {
    if let Err(denied) = auth::require_organizer(ctx) {
        return denied.into();
    }

    let screen = Screen::new(ViewId::EditVenue, "Edit Venue");
    let venue = match ctx.repo.venue(id).await {
        Ok(venue) => venue,
        Err(e) => {
            tracing::error!("Error loading venue data: {}", e);
            return screen
                .line(format!("Error loading venue. {e}"))
                .navigate("Back to Venues", VENUES)
                .into();
        }
    };

    screen
        .line(format!("Venue id: {}", venue.id))
        .line(format!("name: {}", venue.name))
        .line(format!("location: {}", venue.location))
        .line(format!("capacity: {}", venue.capacity))
        .form("Update Venue", VENUE_EDIT_USAGE)
        .navigate("Cancel", VENUES)
        .into()
}

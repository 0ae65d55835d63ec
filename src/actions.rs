use crate::{
    AppContext,
    auth::{self, AuthError, Denied},
    forms::{EventForm, LoginForm, RegisterForm, VenueForm},
    models::{EventPayload, RecordId},
    routes::{DASHBOARD, EVENTS, LOGIN, VENUES},
    views::Message,
};

/// Command
///
/// A user action: a form submission or a button. Forms carry the raw field values;
/// nothing is validated until `execute`.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login(LoginForm),
    Register(RegisterForm),
    Logout,
    CreateEvent(EventForm),
    /// Omitted fields keep the stored values.
    UpdateEvent { id: String, form: EventForm },
    DeleteEvent(String),
    JoinEvent(String),
    LeaveEvent(String),
    CreateVenue(VenueForm),
    UpdateVenue { id: String, form: VenueForm },
    DeleteVenue(String),
}

impl Command {
    /// Question to ask before running a destructive command.
    pub fn confirmation(&self) -> Option<&'static str> {
        match self {
            Command::DeleteEvent(_) => Some("Are you sure you want to delete this event?"),
            Command::DeleteVenue(_) => Some("Are you sure you want to delete this venue?"),
            _ => None,
        }
    }
}

/// Where to go once a command has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    Navigate(String),
    /// Render the current route again.
    Reload,
    /// Keep the current screen; only the message changes.
    Stay,
}

/// ActionOutcome
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub message: Option<Message>,
    pub next: Next,
}

impl ActionOutcome {
    fn go(fragment: &str, message: Message) -> Self {
        Self {
            message: Some(message),
            next: Next::Navigate(fragment.to_string()),
        }
    }

    fn reload(message: Message) -> Self {
        Self {
            message: Some(message),
            next: Next::Reload,
        }
    }

    fn stay(message: Message) -> Self {
        Self {
            message: Some(message),
            next: Next::Stay,
        }
    }
}

impl From<Denied> for ActionOutcome {
    fn from(Denied(target): Denied) -> Self {
        ActionOutcome::go(target, Message::alert("You are not allowed to do that."))
    }
}

/// execute
///
/// Runs one command against the context. Never fails: every error is turned into an
/// alert the caller shows inline.
pub async fn execute(ctx: &AppContext, command: Command) -> ActionOutcome {
    match command {
        Command::Login(form) => login(ctx, &form).await,
        Command::Register(form) => register(ctx, &form).await,
        Command::Logout => logout(ctx),
        Command::CreateEvent(form) => create_event(ctx, &form).await,
        Command::UpdateEvent { id, form } => update_event(ctx, &id, form).await,
        Command::DeleteEvent(id) => delete_event(ctx, &id).await,
        Command::JoinEvent(id) => join_event(ctx, &id).await,
        Command::LeaveEvent(id) => leave_event(ctx, &id).await,
        Command::CreateVenue(form) => create_venue(ctx, &form).await,
        Command::UpdateVenue { id, form } => update_venue(ctx, &id, form).await,
        Command::DeleteVenue(id) => delete_venue(ctx, &id).await,
    }
}

// --- Identity ---

async fn login(ctx: &AppContext, form: &LoginForm) -> ActionOutcome {
    let (email, password) = match form.validate() {
        Ok(fields) => fields,
        Err(e) => return ActionOutcome::stay(Message::alert(e.to_string())),
    };

    match auth::login(ctx, &email, password).await {
        Ok(_) => ActionOutcome::go(
            DASHBOARD,
            Message::success("Login successful. Redirecting..."),
        ),
        Err(e) => {
            tracing::warn!("Login error: {}", e);
            ActionOutcome::stay(Message::alert(e.to_string()))
        }
    }
}

async fn register(ctx: &AppContext, form: &RegisterForm) -> ActionOutcome {
    let (name, email, password) = match form.validate() {
        Ok(fields) => fields,
        Err(e) => return ActionOutcome::stay(Message::alert(e.to_string())),
    };

    match auth::register(ctx, &name, &email, password).await {
        // The session exists by now, so the login guard forwards to the dashboard.
        Ok(_) => ActionOutcome::go(
            LOGIN,
            Message::success("Registration successful. Redirecting to login..."),
        ),
        Err(e @ AuthError::EmailTaken) => ActionOutcome::stay(Message::alert(e.to_string())),
        Err(e) => {
            tracing::error!("Registration error: {}", e);
            ActionOutcome::stay(Message::alert(e.to_string()))
        }
    }
}

fn logout(ctx: &AppContext) -> ActionOutcome {
    if let Err(e) = auth::logout(ctx) {
        tracing::error!("Logout error: {}", e);
        return ActionOutcome::stay(Message::alert(format!("Could not log out. {e}")));
    }
    ActionOutcome {
        message: None,
        next: Next::Navigate(LOGIN.to_string()),
    }
}

// --- Events ---

async fn create_event(ctx: &AppContext, form: &EventForm) -> ActionOutcome {
    if let Err(denied) = auth::require_organizer(ctx) {
        return denied.into();
    }
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(e) => return ActionOutcome::stay(Message::alert(e.to_string())),
    };

    match ctx.repo.create_event(&payload).await {
        Ok(event) => {
            tracing::info!(event_id = %event.id, "event created");
            ActionOutcome::go(EVENTS, Message::success("Event created successfully!"))
        }
        Err(e) => {
            tracing::error!("Error creating event: {}", e);
            ActionOutcome::stay(Message::alert("There was an error creating the event."))
        }
    }
}

/// Provided fields are checked first so a bad value never costs a round trip; the
/// merged form is checked again once the stored record fills the gaps.
async fn update_event(ctx: &AppContext, id: &str, form: EventForm) -> ActionOutcome {
    if let Err(denied) = auth::require_organizer(ctx) {
        return denied.into();
    }
    if let Err(e) = form.validate_provided() {
        return ActionOutcome::stay(Message::alert(e.to_string()));
    }

    let stored = match ctx.repo.event(id).await {
        Ok(event) => event,
        Err(e) => {
            tracing::error!("Error loading event {}: {}", id, e);
            return ActionOutcome::stay(Message::alert("There was an error updating the event."));
        }
    };

    let validated = match form.over(EventForm::prefilled(&stored)).validate() {
        Ok(payload) => payload,
        Err(e) => return ActionOutcome::stay(Message::alert(e.to_string())),
    };
    let payload = EventPayload {
        id: Some(stored.id.clone()),
        attendees: stored.attendees.clone(),
        ..validated
    };

    match ctx.repo.replace_event(id, &payload).await {
        Ok(_) => {
            tracing::info!(event_id = id, "event updated");
            ActionOutcome::go(EVENTS, Message::success("Event updated successfully!"))
        }
        Err(e) => {
            tracing::error!("Error updating event: {}", e);
            ActionOutcome::stay(Message::alert("There was an error updating the event."))
        }
    }
}

/// Deleting always lands on the events list, which re-renders it when the list was
/// already showing.
async fn delete_event(ctx: &AppContext, id: &str) -> ActionOutcome {
    if let Err(denied) = auth::require_organizer(ctx) {
        return denied.into();
    }

    match ctx.repo.delete_event(id).await {
        Ok(()) => {
            tracing::info!(event_id = id, "event deleted");
            ActionOutcome::go(EVENTS, Message::success("Event deleted successfully!"))
        }
        Err(e) => {
            tracing::error!("Error deleting event: {}", e);
            ActionOutcome::stay(Message::alert("There was an error deleting the event."))
        }
    }
}

async fn join_event(ctx: &AppContext, id: &str) -> ActionOutcome {
    let user = match auth::require_session(ctx) {
        Ok(user) => user,
        Err(denied) => return denied.into(),
    };
    const FAILED: &str = "Error registering for the event.";

    let mut event = match ctx.repo.event(id).await {
        Ok(event) => event,
        Err(e) => {
            tracing::error!("Error loading event {}: {}", id, e);
            return ActionOutcome::stay(Message::alert(FAILED));
        }
    };

    if event.has_attendee(&user.id) {
        return ActionOutcome::stay(Message::alert(
            "You are already registered for this event.",
        ));
    }
    if event.is_full() {
        return ActionOutcome::stay(Message::alert("Event is full!"));
    }

    event.attendees.push(user.id.clone());
    match ctx.repo.replace_event(id, &EventPayload::from(&event)).await {
        Ok(_) => {
            tracing::info!(event_id = id, user_id = %user.id, "joined event");
            ActionOutcome::reload(Message::success("Successfully registered for the event!"))
        }
        Err(e) => {
            tracing::error!("Error registering for event: {}", e);
            ActionOutcome::stay(Message::alert(FAILED))
        }
    }
}

async fn leave_event(ctx: &AppContext, id: &str) -> ActionOutcome {
    let user = match auth::require_session(ctx) {
        Ok(user) => user,
        Err(denied) => return denied.into(),
    };
    const FAILED: &str = "Error unregistering from the event.";

    let mut event = match ctx.repo.event(id).await {
        Ok(event) => event,
        Err(e) => {
            tracing::error!("Error loading event {}: {}", id, e);
            return ActionOutcome::stay(Message::alert(FAILED));
        }
    };

    let before = event.attendees.len();
    event.attendees.retain(|attendee: &RecordId| attendee != &user.id);
    if event.attendees.len() == before {
        return ActionOutcome::stay(Message::alert("You are not registered for this event."));
    }

    match ctx.repo.replace_event(id, &EventPayload::from(&event)).await {
        Ok(_) => {
            tracing::info!(event_id = id, user_id = %user.id, "left event");
            ActionOutcome::reload(Message::success(
                "Successfully unregistered from the event!",
            ))
        }
        Err(e) => {
            tracing::error!("Error unregistering from event: {}", e);
            ActionOutcome::stay(Message::alert(FAILED))
        }
    }
}

// --- Venues ---

async fn create_venue(ctx: &AppContext, form: &VenueForm) -> ActionOutcome {
    if let Err(denied) = auth::require_organizer(ctx) {
        return denied.into();
    }
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(e) => return ActionOutcome::stay(Message::alert(e.to_string())),
    };

    match ctx.repo.create_venue(&payload).await {
        Ok(venue) => {
            tracing::info!(venue_id = %venue.id, "venue created");
            ActionOutcome::go(VENUES, Message::success("Venue created successfully!"))
        }
        Err(e) => {
            tracing::error!("Error creating venue: {}", e);
            ActionOutcome::stay(Message::alert("There was an error creating the venue."))
        }
    }
}

async fn update_venue(ctx: &AppContext, id: &str, form: VenueForm) -> ActionOutcome {
    if let Err(denied) = auth::require_organizer(ctx) {
        return denied.into();
    }
    if let Err(e) = form.validate_provided() {
        return ActionOutcome::stay(Message::alert(e.to_string()));
    }

    let stored = match ctx.repo.venue(id).await {
        Ok(venue) => venue,
        Err(e) => {
            tracing::error!("Error loading venue {}: {}", id, e);
            return ActionOutcome::stay(Message::alert("There was an error updating the venue."));
        }
    };

    let payload = match form.over(VenueForm::prefilled(&stored)).validate() {
        Ok(payload) => crate::models::VenuePayload {
            id: Some(stored.id.clone()),
            ..payload
        },
        Err(e) => return ActionOutcome::stay(Message::alert(e.to_string())),
    };

    match ctx.repo.replace_venue(id, &payload).await {
        Ok(_) => {
            tracing::info!(venue_id = id, "venue updated");
            ActionOutcome::go(VENUES, Message::success("Venue updated successfully!"))
        }
        Err(e) => {
            tracing::error!("Error updating venue: {}", e);
            ActionOutcome::stay(Message::alert("There was an error updating the venue."))
        }
    }
}

async fn delete_venue(ctx: &AppContext, id: &str) -> ActionOutcome {
    if let Err(denied) = auth::require_organizer(ctx) {
        return denied.into();
    }

    match ctx.repo.delete_venue(id).await {
        Ok(()) => {
            tracing::info!(venue_id = id, "venue deleted");
            ActionOutcome::go(VENUES, Message::success("Venue deleted successfully!"))
        }
        Err(e) => {
            tracing::error!("Error deleting venue: {}", e);
            ActionOutcome::stay(Message::alert("There was an error deleting the venue."))
        }
    }
}

use crate::models::{Event, EventPayload, RecordId, Venue, VenuePayload};
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// ValidationError
///
/// Raised before any network call. The message is shown inline and the submission
/// is dropped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("The \"{0}\" field cannot be empty or contain only spaces.")]
    Empty(&'static str),
    #[error("The \"{0}\" field must be a valid date (YYYY-MM-DD).")]
    Date(&'static str),
    #[error("The \"{0}\" field must be a valid time (HH:MM).")]
    Time(&'static str),
    #[error("Please select a venue.")]
    Venue,
    #[error("The \"{0}\" field must be a whole number of at least 1.")]
    Capacity(&'static str),
}

/// Trims and rejects blank input.
pub fn required(value: Option<&str>, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.unwrap_or_default().trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(trimmed.to_string())
}

fn date(value: Option<&str>, field: &'static str) -> Result<String, ValidationError> {
    let raw = required(value, field)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| ValidationError::Date(field))?;
    Ok(raw)
}

fn time(value: Option<&str>, field: &'static str) -> Result<String, ValidationError> {
    let raw = required(value, field)?;
    NaiveTime::parse_from_str(&raw, "%H:%M").map_err(|_| ValidationError::Time(field))?;
    Ok(raw)
}

fn capacity(value: Option<&str>, field: &'static str) -> Result<u32, ValidationError> {
    let raw = required(value, field)?;
    raw.parse::<u32>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or(ValidationError::Capacity(field))
}

fn venue(value: Option<&str>) -> Result<RecordId, ValidationError> {
    let raw = value.unwrap_or_default().trim();
    if raw.is_empty() {
        return Err(ValidationError::Venue);
    }
    Ok(RecordId::new(raw))
}

// --- Forms ---
//
// Raw field values as a user typed them. `None` means the field was not provided.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// Trimmed email. Passwords are taken verbatim and only checked for presence.
    pub fn validate(&self) -> Result<(String, &str), ValidationError> {
        let email = required(Some(self.email.as_str()), "Email")?;
        if self.password.is_empty() {
            return Err(ValidationError::Empty("Password"));
        }
        Ok((email, &self.password))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(String, String, &str), ValidationError> {
        let name = required(Some(self.name.as_str()), "Name")?;
        let email = required(Some(self.email.as_str()), "Email")?;
        if self.password.is_empty() {
            return Err(ValidationError::Empty("Password"));
        }
        Ok((name, email, &self.password))
    }
}

/// EventForm
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub venue: Option<String>,
    pub capacity: Option<String>,
}

impl EventForm {
    /// The form as the edit screen shows it: every field filled from `event`.
    pub fn prefilled(event: &Event) -> Self {
        Self {
            title: Some(event.title.clone()),
            description: Some(event.description.clone()),
            date: Some(event.date.clone()),
            time: Some(event.time.clone()),
            venue: event.venue_id.as_ref().map(RecordId::to_string),
            capacity: Some(event.capacity.to_string()),
        }
    }

    /// Fields present in `self` win; the rest come from `base`.
    pub fn over(self, base: EventForm) -> Self {
        Self {
            title: self.title.or(base.title),
            description: self.description.or(base.description),
            date: self.date.or(base.date),
            time: self.time.or(base.time),
            venue: self.venue.or(base.venue),
            capacity: self.capacity.or(base.capacity),
        }
    }

    /// Checks every field and builds a payload without id or attendees.
    pub fn validate(&self) -> Result<EventPayload, ValidationError> {
        Ok(EventPayload {
            id: None,
            title: required(self.title.as_deref(), "Title")?,
            description: required(self.description.as_deref(), "Description")?,
            date: date(self.date.as_deref(), "Date")?,
            time: time(self.time.as_deref(), "Time")?,
            venue_id: venue(self.venue.as_deref())?,
            capacity: capacity(self.capacity.as_deref(), "Capacity")?,
            attendees: Vec::new(),
        })
    }

    /// Checks only the fields that were given. Used by edits before the stored
    /// record is fetched.
    pub fn validate_provided(&self) -> Result<(), ValidationError> {
        if self.title.is_some() {
            required(self.title.as_deref(), "Title")?;
        }
        if self.description.is_some() {
            required(self.description.as_deref(), "Description")?;
        }
        if self.date.is_some() {
            date(self.date.as_deref(), "Date")?;
        }
        if self.time.is_some() {
            time(self.time.as_deref(), "Time")?;
        }
        if self.venue.is_some() {
            venue(self.venue.as_deref())?;
        }
        if self.capacity.is_some() {
            capacity(self.capacity.as_deref(), "Capacity")?;
        }
        Ok(())
    }
}

/// VenueForm
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenueForm {
    pub name: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<String>,
}

impl VenueForm {
    pub fn prefilled(venue: &Venue) -> Self {
        Self {
            name: Some(venue.name.clone()),
            location: Some(venue.location.clone()),
            capacity: Some(venue.capacity.to_string()),
        }
    }

    pub fn over(self, base: VenueForm) -> Self {
        Self {
            name: self.name.or(base.name),
            location: self.location.or(base.location),
            capacity: self.capacity.or(base.capacity),
        }
    }

    pub fn validate(&self) -> Result<VenuePayload, ValidationError> {
        Ok(VenuePayload {
            id: None,
            name: required(self.name.as_deref(), "Venue Name")?,
            location: required(self.location.as_deref(), "Location")?,
            capacity: capacity(self.capacity.as_deref(), "Capacity")?,
        })
    }

    pub fn validate_provided(&self) -> Result<(), ValidationError> {
        if self.name.is_some() {
            required(self.name.as_deref(), "Venue Name")?;
        }
        if self.location.is_some() {
            required(self.location.as_deref(), "Location")?;
        }
        if self.capacity.is_some() {
            capacity(self.capacity.as_deref(), "Capacity")?;
        }
        Ok(())
    }
}

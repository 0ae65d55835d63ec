use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// --- Identifiers ---

/// RecordId
///
/// Identifier assigned by the REST data store. json-server hands out numeric ids for
/// seeded data and string ids for some generated records, so the value is kept
/// opaque. Numeric ids are written back as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric value, when the id is a canonical unsigned integer.
    pub fn as_number(&self) -> Option<u64> {
        let n = self.0.parse::<u64>().ok()?;
        (n.to_string() == self.0).then_some(n)
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_number() {
            Some(n) => serializer.serialize_u64(n),
            None => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => RecordId::from(n),
            RawId::Text(s) => RecordId(s),
        })
    }
}

// --- Identity ---

/// Role
///
/// The two actor kinds. Organizers manage events and venues; attendees browse
/// events and register for them. New accounts are attendees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Organizer,
    #[default]
    Attendee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Organizer => "organizer",
            Role::Attendee => "attendee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SessionUser
///
/// The persisted authenticated-user record. At most one exists at a time; it is
/// written on login/registration and removed on logout. The password digest is
/// deliberately not part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl SessionUser {
    pub fn is_organizer(&self) -> bool {
        self.role == Role::Organizer
    }
}

/// User
///
/// A row of the `users` collection. `password` holds the hex SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn to_session(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

// --- Catalogue ---

/// Event
///
/// A row of the `events` collection. `attendees` lists the ids of registered users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(rename = "venueId", default)]
    pub venue_id: Option<RecordId>,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub attendees: Vec<RecordId>,
}

impl Event {
    pub fn attendee_count(&self) -> usize {
        self.attendees.len()
    }

    pub fn is_full(&self) -> bool {
        self.attendees.len() >= self.capacity as usize
    }

    pub fn has_attendee(&self, user_id: &RecordId) -> bool {
        self.attendees.contains(user_id)
    }
}

/// Venue
///
/// A row of the `venues` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub capacity: u32,
}

// --- Write Payloads ---

/// NewUser
///
/// Payload for registration. The id is computed client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// EventPayload
///
/// Body for creating (no id) or replacing (id kept) an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "venueId")]
    pub venue_id: RecordId,
    pub capacity: u32,
    pub attendees: Vec<RecordId>,
}

impl From<&Event> for EventPayload {
    fn from(event: &Event) -> Self {
        Self {
            id: Some(event.id.clone()),
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date.clone(),
            time: event.time.clone(),
            venue_id: event.venue_id.clone().unwrap_or_default(),
            capacity: event.capacity,
            attendees: event.attendees.clone(),
        }
    }
}

/// VenuePayload
///
/// Body for creating (no id) or replacing (id kept) a venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenuePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    pub location: String,
    pub capacity: u32,
}

use crate::api::{ClientError, Collection, DataClientState, Filter};
use crate::models::{Event, EventPayload, NewUser, User, Venue, VenuePayload};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Repository
///
/// Typed facade over the `DataClient`. Views and actions never touch raw JSON:
/// they call these methods and receive models or a `ClientError`.
#[derive(Clone)]
pub struct Repository {
    client: DataClientState,
}

impl Repository {
    pub fn new(client: DataClientState) -> Self {
        Self { client }
    }

    // --- Users ---

    pub async fn users(&self) -> Result<Vec<User>, ClientError> {
        decode_all(self.client.fetch(Collection::Users, None).await?)
    }

    pub async fn users_by_email(&self, email: &str) -> Result<Vec<User>, ClientError> {
        let filter = Filter::new().eq("email", email);
        decode_all(self.client.fetch(Collection::Users, Some(&filter)).await?)
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, ClientError> {
        decode(self.client.create(Collection::Users, encode(user)?).await?)
    }

    // --- Events ---

    pub async fn events(&self) -> Result<Vec<Event>, ClientError> {
        decode_all(self.client.fetch(Collection::Events, None).await?)
    }

    pub async fn event(&self, id: &str) -> Result<Event, ClientError> {
        decode(self.client.fetch_one(Collection::Events, id).await?)
    }

    pub async fn create_event(&self, payload: &EventPayload) -> Result<Event, ClientError> {
        decode(self.client.create(Collection::Events, encode(payload)?).await?)
    }

    pub async fn replace_event(&self, id: &str, payload: &EventPayload) -> Result<Event, ClientError> {
        decode(
            self.client
                .replace(Collection::Events, id, encode(payload)?)
                .await?,
        )
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), ClientError> {
        self.client.remove(Collection::Events, id).await.map(|_| ())
    }

    // --- Venues ---

    pub async fn venues(&self) -> Result<Vec<Venue>, ClientError> {
        decode_all(self.client.fetch(Collection::Venues, None).await?)
    }

    pub async fn venue(&self, id: &str) -> Result<Venue, ClientError> {
        decode(self.client.fetch_one(Collection::Venues, id).await?)
    }

    pub async fn create_venue(&self, payload: &VenuePayload) -> Result<Venue, ClientError> {
        decode(self.client.create(Collection::Venues, encode(payload)?).await?)
    }

    pub async fn replace_venue(&self, id: &str, payload: &VenuePayload) -> Result<Venue, ClientError> {
        decode(
            self.client
                .replace(Collection::Venues, id, encode(payload)?)
                .await?,
        )
    }

    pub async fn delete_venue(&self, id: &str) -> Result<(), ClientError> {
        self.client.remove(Collection::Venues, id).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!("record decode error: {:?}", e);
        ClientError::Decode(e.to_string())
    })
}

fn decode_all<T: DeserializeOwned>(values: Vec<Value>) -> Result<Vec<T>, ClientError> {
    values.into_iter().map(decode).collect()
}

fn encode<T: Serialize>(payload: &T) -> Result<Value, ClientError> {
    serde_json::to_value(payload).map_err(|e| ClientError::Decode(e.to_string()))
}

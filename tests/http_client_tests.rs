use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use events_portal::{
    DataClient, HttpDataClient, InMemoryDataClient, Repository,
    api::{ClientError, Collection, DataClientState, Filter, Verb},
};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;

// --- Fake json-server ---
//
// Serves the in-memory store over HTTP, so the real client is exercised end to end.

type Store = Arc<InMemoryDataClient>;

fn collection(name: &str) -> Result<Collection, StatusCode> {
    match name {
        "users" => Ok(Collection::Users),
        "events" => Ok(Collection::Events),
        "venues" => Ok(Collection::Venues),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

fn status(e: ClientError) -> StatusCode {
    e.status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn list(
    State(store): State<Store>,
    Path(name): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    let filter = params
        .into_iter()
        .fold(Filter::new(), |f, (k, v)| f.eq(k, v));
    let filter = (!filter.pairs().is_empty()).then_some(filter);
    store
        .fetch(collection(&name)?, filter.as_ref())
        .await
        .map(Json)
        .map_err(status)
}

async fn create(
    State(store): State<Store>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    store
        .create(collection(&name)?, body)
        .await
        .map(|v| (StatusCode::CREATED, Json(v)))
        .map_err(status)
}

async fn show(
    State(store): State<Store>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    store
        .fetch_one(collection(&name)?, &id)
        .await
        .map(Json)
        .map_err(status)
}

async fn replace(
    State(store): State<Store>,
    Path((name, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    store
        .replace(collection(&name)?, &id, body)
        .await
        .map(Json)
        .map_err(status)
}

async fn remove(
    State(store): State<Store>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    store
        .remove(collection(&name)?, &id)
        .await
        .map(Json)
        .map_err(status)
}

pub struct TestServer {
    pub address: String,
    pub store: Store,
}

async fn spawn_server() -> TestServer {
    let store: Store = Arc::new(
        InMemoryDataClient::new()
            .with_records(
                Collection::Users,
                vec![
                    json!({"id": 1, "name": "Olga", "email": "olga@mail.com",
                           "password": "x", "role": "organizer"}),
                    json!({"id": 2, "name": "Ana", "email": "ana@mail.com",
                           "password": "y", "role": "attendee"}),
                ],
            )
            .with_records(
                Collection::Events,
                vec![json!({"id": 1, "title": "Rust Meetup", "description": "Talks",
                            "date": "2026-11-02", "time": "18:30", "venueId": 1,
                            "capacity": 10, "attendees": [2]})],
            ),
    );

    let router = Router::new()
        .route("/{collection}", get(list).post(create))
        .route(
            "/{collection}/{id}",
            get(show).put(replace).delete(remove),
        )
        .with_state(store.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer { address, store }
}

fn client(address: &str) -> HttpDataClient {
    HttpDataClient::new(address, Duration::from_secs(5)).expect("valid base url")
}

// --- Tests ---

#[tokio::test]
async fn test_fetch_with_filter() {
    let server = spawn_server().await;
    let client = client(&server.address);

    let all = client.fetch(Collection::Users, None).await.unwrap();
    assert_eq!(all.len(), 2);

    let filter = Filter::new().eq("email", "ana@mail.com");
    let found = client
        .fetch(Collection::Users, Some(&filter))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], "Ana");
}

#[tokio::test]
async fn test_missing_record_reports_status_text() {
    let server = spawn_server().await;
    let client = client(&server.address);

    let err = client.fetch_one(Collection::Events, "99").await.unwrap_err();
    assert_eq!(err, ClientError::not_found(Verb::Fetching));
    assert_eq!(err.to_string(), "Error fetching data: Not Found");

    let err = client.remove(Collection::Events, "99").await.unwrap_err();
    assert_eq!(err.to_string(), "Error deleting data: Not Found");
}

#[tokio::test]
async fn test_id_is_sent_as_one_segment() {
    let server = spawn_server().await;
    let client = client(&server.address);

    // "1/extra" must not be read as the record "1".
    let err = client
        .fetch_one(Collection::Events, "1/extra")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_create_replace_remove() {
    let server = spawn_server().await;
    let client = client(&server.address);

    let created = client
        .create(Collection::Venues, json!({"name": "Annex", "location": "Uptown", "capacity": 30}))
        .await
        .unwrap();
    assert_eq!(created["id"], 1);

    let replaced = client
        .replace(
            Collection::Venues,
            "1",
            json!({"id": 1, "name": "Annex", "location": "Midtown", "capacity": 30}),
        )
        .await
        .unwrap();
    assert_eq!(replaced["location"], "Midtown");
    assert_eq!(server.store.records(Collection::Venues)[0]["location"], "Midtown");

    client.remove(Collection::Venues, "1").await.unwrap();
    assert!(server.store.records(Collection::Venues).is_empty());
}

#[tokio::test]
async fn test_repository_over_http() {
    let server = spawn_server().await;
    let repo = Repository::new(Arc::new(client(&server.address)) as DataClientState);

    let users = repo.users_by_email("olga@mail.com").await.unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].to_session().is_organizer());

    let event = repo.event("1").await.unwrap();
    assert_eq!(event.title, "Rust Meetup");
    assert_eq!(event.attendee_count(), 1);
    assert_eq!(event.venue_id.as_ref().map(|v| v.as_str()), Some("1"));
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client(&address)
        .fetch(Collection::Events, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "{err:?}");
}

#[test]
fn test_invalid_base_url() {
    assert!(matches!(
        HttpDataClient::new("not a url", Duration::from_secs(1)),
        Err(ClientError::Transport(_))
    ));
}

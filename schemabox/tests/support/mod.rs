//! In-memory schema registry served through wiremock.
#![allow(dead_code)]

use std::sync::Mutex;

use serde_json::{Value, json};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const RECORD_V1: &str =
    r#"{"type":"record","name":"t","fields":[{"name":"val","type":"int"}]}"#;
pub const RECORD_V2: &str = r#"{"type":"record","name":"t","fields":[{"name":"val","type":"int"},{"name":"val2","type":["string","null"],"default":"null"}]}"#;

struct Subject {
    name: String,
    next_version: u32,
    /// `(version, schema id)`, oldest first.
    versions: Vec<(u32, u32)>,
}

#[derive(Default)]
struct State {
    /// Schema text by id; id `n` lives at index `n - 1`.
    schemas: Vec<String>,
    subjects: Vec<Subject>,
}

impl State {
    fn subject(&mut self, name: &str) -> Option<&mut Subject> {
        self.subjects.iter_mut().find(|subject| subject.name == name)
    }

    fn schema_id(&mut self, schema: &str) -> u32 {
        match self.schemas.iter().position(|known| known == schema) {
            Some(index) => index as u32 + 1,
            None => {
                self.schemas.push(schema.to_owned());
                self.schemas.len() as u32
            }
        }
    }
}

/// Stateful registry responder covering every route the client uses.
#[derive(Default)]
pub struct FakeRegistry {
    state: Mutex<State>,
}

impl FakeRegistry {
    /// Starts a mock server answering every request from a fresh registry.
    pub async fn start() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(FakeRegistry::default())
            .mount(&server)
            .await;
        server
    }

    fn handle(&self, method: &str, segments: &[&str], body: &[u8]) -> ResponseTemplate {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match (method, segments) {
            ("GET", ["schemas", "ids", id]) => {
                let schema = id
                    .parse::<usize>()
                    .ok()
                    .and_then(|id| id.checked_sub(1))
                    .and_then(|index| state.schemas.get(index));
                match schema {
                    Some(schema) => ok(json!({ "schema": schema })),
                    None => not_found(40403, "Schema not found"),
                }
            }
            ("GET", ["subjects"]) => {
                let names: Vec<_> = state
                    .subjects
                    .iter()
                    .map(|subject| subject.name.clone())
                    .collect();
                ok(json!(names))
            }
            ("GET", ["subjects", name, "versions"]) => match state.subject(name) {
                Some(subject) => {
                    let versions: Vec<_> = subject.versions.iter().map(|(v, _)| *v).collect();
                    ok(json!(versions))
                }
                None => not_found(40401, "Subject not found."),
            },
            ("GET", ["subjects", name, "versions", version]) => {
                let Some(subject) = state.subject(name) else {
                    return not_found(40401, "Subject not found.");
                };
                let found = match *version {
                    "latest" => subject.versions.last().copied(),
                    number => subject
                        .versions
                        .iter()
                        .find(|(v, _)| number.parse::<u32>().ok() == Some(*v))
                        .copied(),
                };
                match found {
                    Some((version, id)) => ok(json!({
                        "subject": name,
                        "version": version,
                        "schema": state.schemas[id as usize - 1],
                        "id": id,
                    })),
                    None => not_found(40402, "Version not found."),
                }
            }
            ("POST", ["subjects", name, "versions"]) => {
                let Some(schema) = schema_text(body) else {
                    return unprocessable();
                };
                let id = state.schema_id(&schema);
                if state.subject(name).is_none() {
                    state.subjects.push(Subject {
                        name: (*name).to_owned(),
                        next_version: 1,
                        versions: Vec::new(),
                    });
                }
                if let Some(subject) = state.subject(name)
                    && !subject.versions.iter().any(|(_, known)| *known == id)
                {
                    subject.versions.push((subject.next_version, id));
                    subject.next_version += 1;
                }
                ok(json!({ "id": id }))
            }
            ("POST", ["subjects", name]) => {
                let Some(schema) = schema_text(body) else {
                    return unprocessable();
                };
                let id = state
                    .schemas
                    .iter()
                    .position(|known| *known == schema)
                    .map(|index| index as u32 + 1);
                let Some(subject) = state.subject(name) else {
                    return not_found(40401, "Subject not found.");
                };
                let found = subject
                    .versions
                    .iter()
                    .find(|(_, known)| Some(*known) == id)
                    .copied();
                match found {
                    Some((version, id)) => ok(json!({
                        "subject": name,
                        "version": version,
                        "schema": schema,
                        "id": id,
                    })),
                    None => not_found(40403, "Schema not found"),
                }
            }
            ("DELETE", ["subjects", name]) => {
                match state.subjects.iter().position(|s| s.name == *name) {
                    Some(index) => {
                        let subject = state.subjects.remove(index);
                        let versions: Vec<_> = subject.versions.iter().map(|(v, _)| *v).collect();
                        ok(json!(versions))
                    }
                    None => not_found(40401, "Subject not found."),
                }
            }
            ("DELETE", ["subjects", name, "versions", version]) => {
                let Some(subject) = state.subject(name) else {
                    return not_found(40401, "Subject not found.");
                };
                let position = match *version {
                    "latest" => subject.versions.len().checked_sub(1),
                    number => subject
                        .versions
                        .iter()
                        .position(|(v, _)| number.parse::<u32>().ok() == Some(*v)),
                };
                match position {
                    Some(index) => {
                        let (version, _) = subject.versions.remove(index);
                        ok(json!(version))
                    }
                    None => not_found(40402, "Version not found."),
                }
            }
            _ => not_found(404, "HTTP 404 Not Found"),
        }
    }
}

impl Respond for FakeRegistry {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let segments: Vec<&str> = request
            .url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        self.handle(request.method.as_str(), &segments, &request.body)
    }
}

fn schema_text(body: &[u8]) -> Option<String> {
    let body: Value = serde_json::from_slice(body).ok()?;
    body.get("schema")?.as_str().map(str::to_owned)
}

fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn not_found(error_code: i32, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "error_code": error_code,
        "message": message,
    }))
}

fn unprocessable() -> ResponseTemplate {
    ResponseTemplate::new(422).set_body_json(json!({
        "error_code": 42201,
        "message": "Invalid schema",
    }))
}

/// Number of requests the server received on `path`.
pub async fn requests_on(server: &MockServer, path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == path)
        .count()
}

//! End-to-end tests over the HTTP router with scripted model doubles.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tower::ServiceExt;

use st_domain::catalog::Endpoint;
use st_domain::config::Config;
use st_domain::error::{Error, Result};
use st_domain::model::{ChatTurn, Conversation, Message, NewMessage, Role};
use st_gateway::server::build_app;
use st_gateway::state::AppState;
use st_providers::{EndpointDiscovery, ModelInvoker};
use st_store::{ConversationStore, MemoryCatalog, MemoryConversations, NewConversation};

// ── Model doubles ─────────────────────────────────────────────────────

/// Replies with a fixed text and records every call.
struct Scripted {
    reply: String,
    calls: Mutex<Vec<(String, Vec<ChatTurn>)>>,
}

impl Scripted {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.into(),
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait]
impl ModelInvoker for Scripted {
    async fn invoke(&self, endpoint_id: &str, messages: &[ChatTurn]) -> Result<String> {
        self.calls
            .lock()
            .push((endpoint_id.to_owned(), messages.to_vec()));
        Ok(self.reply.clone())
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }
}

struct Failing;

#[async_trait::async_trait]
impl ModelInvoker for Failing {
    async fn invoke(&self, endpoint_id: &str, _messages: &[ChatTurn]) -> Result<String> {
        Err(Error::Upstream {
            endpoint: endpoint_id.to_owned(),
            message: "503 Service Unavailable".into(),
        })
    }

    fn provider_id(&self) -> &str {
        "failing"
    }
}

struct Sleeping(Duration);

#[async_trait::async_trait]
impl ModelInvoker for Sleeping {
    async fn invoke(&self, _endpoint_id: &str, _messages: &[ChatTurn]) -> Result<String> {
        tokio::time::sleep(self.0).await;
        Ok("too late".into())
    }

    fn provider_id(&self) -> &str {
        "sleeping"
    }
}

struct FixedListing(Vec<Endpoint>);

#[async_trait::async_trait]
impl EndpointDiscovery for FixedListing {
    async fn discover(&self) -> Result<Vec<Endpoint>> {
        Ok(self.0.clone())
    }
}

/// Delegates to an in-memory store but fails every append of one role.
struct BrokenAppends {
    inner: MemoryConversations,
    fail_role: Role,
}

#[async_trait::async_trait]
impl ConversationStore for BrokenAppends {
    async fn list(&self) -> Result<Vec<Conversation>> {
        self.inner.list().await
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>> {
        self.inner.get(id).await
    }

    async fn create(&self, new: NewConversation) -> Result<Conversation> {
        self.inner.create(new).await
    }

    async fn append_message(&self, conversation_id: &str, message: NewMessage) -> Result<Message> {
        if message.role == self.fail_role {
            return Err(Error::Storage("disk full".into()));
        }
        self.inner.append_message(conversation_id, message).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        self.inner.delete(id).await
    }
}

// ── Harness ───────────────────────────────────────────────────────────

fn base_state(config: Config) -> AppState {
    AppState::new(
        Arc::new(config),
        Arc::new(MemoryCatalog::seeded()),
        Arc::new(MemoryConversations::new()),
    )
}

fn app_with(invoker: Option<Arc<dyn ModelInvoker>>) -> (Router, AppState) {
    let mut state = base_state(Config::default());
    if let Some(invoker) = invoker {
        state = state.with_invoker(invoker);
    }
    (build_app(state.clone()), state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

fn endpoint_ids(listing: &Value) -> Vec<String> {
    listing
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_owned())
        .collect()
}

// ── Chat ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn uncataloged_endpoint_turn_is_persisted() {
    let model = Scripted::new("Availability is 87% this week.");
    let (app, _) = app_with(Some(model.clone()));

    let question = "What's the current equipment availability rate?";
    let (status, reply) = post(
        &app,
        "/api/chat",
        json!({
            "message": question,
            "endpointId": "gpt-4-turbo",
            "domainId": "mining-ops",
            "siteId": "all-sites",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let conversation_id = reply["conversationId"].as_str().unwrap();
    assert_eq!(reply["message"]["role"], "assistant");
    assert_eq!(reply["message"]["content"], "Availability is 87% this week.");

    let (status, conv) = get(&app, &format!("/api/conversations/{conversation_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conv["id"], conversation_id);
    let messages = conv["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], question);
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(conv["title"], question);

    let calls = model.calls.lock();
    let (endpoint, turns) = calls.last().unwrap();
    assert_eq!(endpoint, "gpt-4-turbo");
    // system prompt + user message
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1].content, question);
}

#[tokio::test]
async fn follow_up_turn_carries_history() {
    let model = Scripted::new("ok");
    let (app, _) = app_with(Some(model.clone()));

    let (_, first) = post(
        &app,
        "/api/chat",
        json!({ "message": "first", "endpointId": "databricks-dbrx-instruct" }),
    )
    .await;
    let id = first["conversationId"].as_str().unwrap();

    let (status, second) = post(
        &app,
        "/api/chat",
        json!({ "message": "second", "conversationId": id, "endpointId": "databricks-dbrx-instruct" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["conversationId"], id);

    let contents: Vec<String> = model.calls.lock()[1]
        .1
        .iter()
        .map(|t| t.content.clone())
        .collect();
    assert_eq!(&contents[1..], ["first", "ok", "second"]);

    let (_, conv) = get(&app, &format!("/api/conversations/{id}")).await;
    assert_eq!(conv["messages"].as_array().unwrap().len(), 4);
    assert_eq!(conv["title"], "first");
}

#[tokio::test]
async fn failing_model_still_gets_an_assistant_reply() {
    let (app, _) = app_with(Some(Arc::new(Failing)));

    let (status, reply) = post(
        &app,
        "/api/chat",
        json!({
            "message": "Equipment availability?",
            "endpointId": "databricks-dbrx-instruct",
            "domainId": "mining-ops",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let content = reply["message"]["content"].as_str().unwrap();
    assert!(content.contains("Equipment availability?"));
    assert!(content.contains("DBRX Instruct"));

    let id = reply["conversationId"].as_str().unwrap();
    let (_, conv) = get(&app, &format!("/api/conversations/{id}")).await;
    assert_eq!(conv["messages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn slow_model_times_out_into_fallback() {
    let mut config = Config::default();
    config.serving.timeout_ms = 50;
    let state = base_state(config).with_invoker(Arc::new(Sleeping(Duration::from_secs(5))));
    let app = build_app(state);

    let started = std::time::Instant::now();
    let (status, reply) = post(
        &app,
        "/api/chat",
        json!({ "message": "anyone there?", "endpointId": "databricks-llama-3-70b" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(started.elapsed() < Duration::from_secs(2));
    let content = reply["message"]["content"].as_str().unwrap();
    assert_ne!(content, "too late");
    assert!(content.contains("anyone there?"));
}

#[tokio::test]
async fn no_serving_configured_uses_fallback() {
    let (app, _) = app_with(None);
    let (status, reply) = post(
        &app,
        "/api/chat",
        json!({ "message": "hi", "endpointId": "databricks-dbrx-instruct", "siteId": "kumba" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["message"]["role"], "assistant");
    assert!(!reply["message"]["content"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn empty_message_is_rejected_without_side_effects() {
    let model = Scripted::new("never");
    let (app, _) = app_with(Some(model.clone()));

    let (status, body) = post(
        &app,
        "/api/chat",
        json!({ "message": "", "endpointId": "databricks-dbrx-instruct" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, list) = get(&app, "/api/conversations").await;
    assert!(list.as_array().unwrap().is_empty());
    assert!(model.calls.lock().is_empty());
}

#[tokio::test]
async fn single_space_message_is_a_valid_turn() {
    let model = Scripted::new("ok");
    let (app, _) = app_with(Some(model.clone()));

    let (status, reply) = post(
        &app,
        "/api/chat",
        json!({ "message": " ", "endpointId": "databricks-dbrx-instruct" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["message"]["role"], "assistant");

    let id = reply["conversationId"].as_str().unwrap();
    let (_, conv) = get(&app, &format!("/api/conversations/{id}")).await;
    let messages = conv["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], " ");
    assert_eq!(model.calls.lock().len(), 1);
}

#[tokio::test]
async fn failed_user_save_is_internal_and_skips_the_model() {
    let model = Scripted::new("never");
    let conversations = Arc::new(BrokenAppends {
        inner: MemoryConversations::new(),
        fail_role: Role::User,
    });
    let state = AppState::new(
        Arc::new(Config::default()),
        Arc::new(MemoryCatalog::seeded()),
        conversations,
    )
    .with_invoker(model.clone());
    let app = build_app(state);

    let (status, body) = post(
        &app,
        "/api/chat",
        json!({ "message": "hello", "endpointId": "databricks-dbrx-instruct" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal error");
    assert!(model.calls.lock().is_empty());
}

#[tokio::test]
async fn failed_assistant_save_is_internal() {
    let model = Scripted::new("reply");
    let conversations = Arc::new(BrokenAppends {
        inner: MemoryConversations::new(),
        fail_role: Role::Assistant,
    });
    let state = AppState::new(
        Arc::new(Config::default()),
        Arc::new(MemoryCatalog::seeded()),
        conversations,
    )
    .with_invoker(model.clone());
    let app = build_app(state);

    let (status, body) = post(
        &app,
        "/api/chat",
        json!({ "message": "hello", "endpointId": "databricks-dbrx-instruct" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert_eq!(model.calls.lock().len(), 1);
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let (app, _) = app_with(None);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_conversation_is_not_found() {
    let model = Scripted::new("never");
    let (app, _) = app_with(Some(model.clone()));

    let (status, _) = post(
        &app,
        "/api/chat",
        json!({ "message": "hi", "conversationId": "missing", "endpointId": "databricks-dbrx-instruct" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(model.calls.lock().is_empty());

    let (status, _) = get(&app, "/api/conversations/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_turns_on_one_conversation_all_land() {
    let (app, _) = app_with(Some(Scripted::new("ack")));
    let (_, first) = post(
        &app,
        "/api/chat",
        json!({ "message": "start", "endpointId": "databricks-dbrx-instruct" }),
    )
    .await;
    let id = first["conversationId"].as_str().unwrap().to_owned();

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            post(
                &app,
                "/api/chat",
                json!({ "message": format!("m{i}"), "conversationId": id, "endpointId": "databricks-dbrx-instruct" }),
            )
            .await
            .0
        }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap(), StatusCode::OK);
    }

    let (_, conv) = get(&app, &format!("/api/conversations/{id}")).await;
    let messages = conv["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 18);
    // Turns never interleave: every user message is followed by its reply.
    for pair in messages.chunks(2) {
        assert_eq!(pair[0]["role"], "user");
        assert_eq!(pair[1]["role"], "assistant");
    }
}

// ── Conversations ─────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_conversation_and_messages() {
    let (app, state) = app_with(Some(Scripted::new("ok")));
    let (_, reply) = post(
        &app,
        "/api/chat",
        json!({ "message": "to be removed", "endpointId": "databricks-dbrx-instruct" }),
    )
    .await;
    let id = reply["conversationId"].as_str().unwrap();

    let (status, body) = send(&app, Method::DELETE, &format!("/api/conversations/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, _) = get(&app, &format!("/api/conversations/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(state.conversations.get(id).await.unwrap().is_none());

    let (status, _) = send(&app, Method::DELETE, &format!("/api/conversations/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn conversations_list_most_recent_first() {
    let (app, _) = app_with(Some(Scripted::new("ok")));
    let mut ids = Vec::new();
    for msg in ["one", "two"] {
        let (_, reply) = post(
            &app,
            "/api/chat",
            json!({ "message": msg, "endpointId": "databricks-dbrx-instruct" }),
        )
        .await;
        ids.push(reply["conversationId"].as_str().unwrap().to_owned());
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    // Touch the older one again.
    post(
        &app,
        "/api/chat",
        json!({ "message": "again", "conversationId": ids[0], "endpointId": "databricks-dbrx-instruct" }),
    )
    .await;

    let (_, list) = get(&app, "/api/conversations").await;
    let listed: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(listed, [ids[0].as_str(), ids[1].as_str()]);
}

// ── Endpoints ─────────────────────────────────────────────────────────

#[tokio::test]
async fn domain_agents_are_scoped_to_their_domain() {
    let (app, _) = app_with(None);
    let (status, created) = post(
        &app,
        "/api/endpoints",
        json!({
            "name": "Mine Ops Agent",
            "description": "Shift-report agent",
            "type": "agent",
            "domainId": "mining-ops",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let agent_id = created["id"].as_str().unwrap().to_owned();

    let (_, generic) = get(&app, "/api/endpoints").await;
    assert!(!endpoint_ids(&generic).contains(&agent_id));

    let (_, finance) = get(&app, "/api/endpoints?domainId=finance").await;
    assert!(!endpoint_ids(&finance).contains(&agent_id));
    assert_eq!(endpoint_ids(&finance).len(), 3);

    let (_, mining) = get(&app, "/api/endpoints?domainId=mining-ops").await;
    assert!(endpoint_ids(&mining).contains(&agent_id));

    // Exactly one default per listing.
    let defaults = mining
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["isDefault"] == true)
        .count();
    assert_eq!(defaults, 1);
}

#[tokio::test]
async fn default_endpoint_follows_domain_switch() {
    let (app, _) = app_with(None);
    let (_, created) = post(
        &app,
        "/api/endpoints",
        json!({
            "name": "Finance Agent",
            "description": "",
            "type": "agent",
            "domainId": "finance",
        }),
    )
    .await;
    let agent_id = created["id"].as_str().unwrap();

    let (_, plain) = get(&app, "/api/endpoints/default").await;
    assert_eq!(plain["endpoint"]["id"], "databricks-dbrx-instruct");

    let (_, switched) = get(&app, "/api/endpoints/default?domainId=finance&previousDomainId=generic").await;
    assert_eq!(switched["endpoint"]["id"], agent_id);
    assert_eq!(switched["source"], "domain_agent");

    // No switch: the flagged default wins over the agent.
    let (_, kept) = get(&app, "/api/endpoints/default?domainId=finance&previousDomainId=finance").await;
    assert_eq!(kept["endpoint"]["id"], "databricks-dbrx-instruct");

    // An explicit choice outranks the domain agent.
    let (_, explicit) = get(
        &app,
        "/api/endpoints/default?domainId=finance&previousDomainId=generic&endpointId=databricks-llama-3-70b",
    )
    .await;
    assert_eq!(explicit["endpoint"]["id"], "databricks-llama-3-70b");
}

#[tokio::test]
async fn refresh_replaces_catalog_from_workspace() {
    let listing = vec![Endpoint {
        id: "ws-model".into(),
        name: "ws-model".into(),
        description: "Foundation model: ws-model".into(),
        kind: st_domain::catalog::EndpointKind::Foundation,
        is_default: true,
        domain_id: None,
    }];
    let state = base_state(Config::default()).with_discovery(Arc::new(FixedListing(listing)));
    let app = build_app(state);

    let (status, body) = post(&app, "/api/endpoints/refresh", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replaced"], true);

    let (_, list) = get(&app, "/api/endpoints").await;
    assert_eq!(endpoint_ids(&list), ["ws-model"]);
}

#[tokio::test]
async fn refresh_without_workspace_keeps_seed() {
    let (app, _) = app_with(None);
    let (status, body) = post(&app, "/api/endpoints/refresh", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replaced"], false);
    assert_eq!(body["endpoints"].as_array().unwrap().len(), 3);
}

// ── Domains, sites, settings ──────────────────────────────────────────

#[tokio::test]
async fn domain_crud_status_codes() {
    let (app, _) = app_with(None);

    let (status, _) = post(
        &app,
        "/api/domains",
        json!({ "name": "  ", "description": "", "systemPrompt": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = post(
        &app,
        "/api/domains",
        json!({ "name": "Legal", "description": "Contracts", "systemPrompt": "You are a legal aide." }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_owned();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/domains/{id}"),
        Some(json!({ "description": "Contracts and compliance" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Legal");
    assert_eq!(updated["description"], "Contracts and compliance");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/domains/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get(&app, &format!("/api/domains/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn seeded_sites_are_listed() {
    let (app, _) = app_with(None);
    let (_, sites) = get(&app, "/api/sites").await;
    let ids: Vec<&str> = sites
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"all-sites"));
    let (status, _) = get(&app, "/api/sites/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn config_updates_merge() {
    let (app, _) = app_with(None);
    post(
        &app,
        "/api/config",
        json!({ "defaultEndpointId": "databricks-mixtral-8x7b" }),
    )
    .await;
    let (status, merged) = post(&app, "/api/config", json!({ "systemPrompt": "Be brief." })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(merged["defaultEndpointId"], "databricks-mixtral-8x7b");
    assert_eq!(merged["systemPrompt"], "Be brief.");

    let (_, fetched) = get(&app, "/api/config").await;
    assert_eq!(fetched, merged);
}

#[tokio::test]
async fn prompt_override_reaches_the_model() {
    let model = Scripted::new("ok");
    let (app, _) = app_with(Some(model.clone()));
    post(&app, "/api/config", json!({ "systemPrompt": "Be brief." })).await;
    post(
        &app,
        "/api/chat",
        json!({ "message": "hi", "endpointId": "databricks-dbrx-instruct", "domainId": "finance", "siteId": "kumba" }),
    )
    .await;

    let calls = model.calls.lock();
    let system = &calls[0].1[0];
    assert!(system.content.starts_with("Be brief."));
}

#[tokio::test]
async fn health_reports_serving_state() {
    let (app, _) = app_with(Some(Scripted::new("ok")));
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["modelServing"], true);
}

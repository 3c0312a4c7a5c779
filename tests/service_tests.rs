//! Chat service contract: validation, authentication precondition, wire
//! shapes, and the preference surface.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal_macros::dec;

use edital_agent::{
    Capabilities, ChatRequest, ChatService, Credential, DispatchConfig, DispatchEngine, Error,
    MemoryPreferenceStore, MemoryUsageLog, Model, ModelCatalog, ModelProvider, Period,
    PreferenceService, PreferenceStore, Pricing, ProviderReply, ProviderRequest, Result,
    SessionProvider, StaticSessionProvider, UsageScope, UsageSink,
};

struct EchoProvider;

#[async_trait]
impl ModelProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn invoke(&self, request: &ProviderRequest) -> Result<ProviderReply> {
        Ok(ProviderReply {
            text: format!("[{}] {}", request.model, request.message),
            tokens_input: 120,
            tokens_output: 80,
        })
    }
}

struct NoSession;

#[async_trait]
impl SessionProvider for NoSession {
    fn name(&self) -> &str {
        "none"
    }

    async fn bearer(&self) -> Result<Credential> {
        Err(Error::not_authenticated("no active session"))
    }
}

fn model(id: &str) -> Model {
    Model {
        id: id.into(),
        provider: "gateway".into(),
        display_name: id.to_uppercase(),
        context_window: 128_000,
        pricing: Pricing::new(dec!(0.001), dec!(0.002)),
        capabilities: Capabilities::default(),
        available: true,
        recommended: false,
        tags: Default::default(),
    }
}

struct Fixture {
    preferences: Arc<MemoryPreferenceStore>,
    usage: Arc<MemoryUsageLog>,
    service: ChatService,
}

fn fixture(sessions: Arc<dyn SessionProvider>) -> Fixture {
    let catalog = Arc::new(ModelCatalog::new(vec![model("m1"), model("m2")]));
    let preferences = Arc::new(MemoryPreferenceStore::new());
    let usage = Arc::new(MemoryUsageLog::new());
    let engine = DispatchEngine::new(
        catalog,
        preferences.clone() as Arc<dyn PreferenceStore>,
        Arc::new(EchoProvider) as Arc<dyn ModelProvider>,
        usage.clone() as Arc<dyn UsageSink>,
        DispatchConfig::default().with_fallback_order(["m1", "m2"]),
    );
    Fixture {
        preferences,
        usage,
        service: ChatService::new(engine, sessions),
    }
}

fn chat_request(user: &str, message: &str) -> ChatRequest {
    ChatRequest {
        conversation_id: None,
        message: message.into(),
        agent_id: None,
        user_id: user.into(),
        model_id: None,
    }
}

#[tokio::test]
async fn chat_returns_full_wire_contract() {
    let f = fixture(Arc::new(StaticSessionProvider::new("tok")));

    let response = f
        .service
        .chat(chat_request("u1", "summarize tender 042/2026"))
        .await
        .unwrap();

    assert_eq!(response.message, "summarize tender 042/2026");
    assert_eq!(response.response, "[m1] summarize tender 042/2026");
    assert_eq!(response.model_used, "m1");
    assert_eq!(response.tokens_input, 120);
    assert_eq!(response.tokens_output, 80);
    assert_eq!(response.cost_usd, dec!(0.28));

    let summary = f
        .service
        .usage_summary(Period::Day, &UsageScope::user("u1"))
        .await
        .unwrap();
    assert_eq!(summary.messages, 1);
    assert_eq!(summary.cost_usd, dec!(0.28));
}

#[tokio::test]
async fn validation_rejects_before_any_work() {
    let f = fixture(Arc::new(StaticSessionProvider::new("tok")));

    let err = f.service.chat(chat_request("", "hi")).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = f.service.chat(chat_request("u1", "   ")).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    assert!(f.usage.is_empty());
}

#[tokio::test]
async fn missing_session_is_a_hard_precondition() {
    let f = fixture(Arc::new(NoSession));

    let err = f.service.chat(chat_request("u1", "hi")).await.unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated(_)));
    assert!(err.is_precondition());
    assert!(f.usage.is_empty());
}

#[tokio::test]
async fn agent_preference_steers_dispatch() {
    let f = fixture(Arc::new(StaticSessionProvider::new("tok")));
    let prefs = PreferenceService::new(f.preferences.clone() as Arc<dyn PreferenceStore>);

    prefs
        .set_preferred_model("u1", Some("drafter"), "m2")
        .await
        .unwrap();

    let mut request = chat_request("u1", "draft an invoice clause");
    request.agent_id = Some("drafter".into());
    let response = f.service.chat(request).await.unwrap();
    assert_eq!(response.model_used, "m2");

    // clearing the preference falls back to the shared order
    prefs.clear_preference("u1", Some("drafter")).await.unwrap();
    let mut request = chat_request("u1", "draft an invoice clause");
    request.agent_id = Some("drafter".into());
    let response = f.service.chat(request).await.unwrap();
    assert_eq!(response.model_used, "m1");
}

#[tokio::test]
async fn explicit_model_id_wins_over_preference() {
    let f = fixture(Arc::new(StaticSessionProvider::new("tok")));
    f.preferences.set("u1", None, "m1".into()).await.unwrap();

    let mut request = chat_request("u1", "hi");
    request.model_id = Some("m2".into());
    let response = f.service.chat(request).await.unwrap();
    assert_eq!(response.model_used, "m2");
}

#[tokio::test]
async fn usage_summary_breaks_down_by_agent() {
    let f = fixture(Arc::new(StaticSessionProvider::new("tok")));

    let mut request = chat_request("u1", "first");
    request.agent_id = Some("analyst".into());
    f.service.chat(request).await.unwrap();
    f.service.chat(chat_request("u1", "second")).await.unwrap();

    let summary = f
        .service
        .usage_summary(Period::Week, &UsageScope::default())
        .await
        .unwrap();
    assert_eq!(summary.messages, 2);
    assert_eq!(summary.by_agent.len(), 2);
    assert_eq!(summary.by_model.len(), 1);
}

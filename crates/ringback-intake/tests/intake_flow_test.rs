use async_trait::async_trait;
use ringback_db::{create_pool, run_migrations, DbPool, DbRuntimeSettings};
use ringback_intake::{
    CallInitiation, CallInitiator, CallResponse, CallTransport, IntakeError, IntakeFlow,
    IntakeOutcome,
};
use ringback_types::CallbackStatus;
use std::sync::{Arc, Mutex};

fn test_pool() -> DbPool {
    let pool =
        create_pool(":memory:", DbRuntimeSettings::default()).expect("failed to create pool");
    run_migrations(&pool.get().expect("failed to get connection"))
        .expect("failed to run migrations");
    pool
}

enum Reply {
    JoinUrl(&'static str),
    NoJoinUrl,
    Fail,
}

struct FakeInitiator {
    reply: Reply,
    calls: Mutex<Vec<CallInitiation>>,
}

impl FakeInitiator {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CallInitiator for FakeInitiator {
    async fn initiate(&self, request: &CallInitiation) -> Result<CallResponse, IntakeError> {
        self.calls.lock().unwrap().push(request.clone());
        match self.reply {
            Reply::JoinUrl(url) => Ok(CallResponse {
                id: "call-1".to_string(),
                status: Some("queued".to_string()),
                transport: Some(CallTransport {
                    call_url: Some(url.to_string()),
                }),
                web_call_url: None,
            }),
            Reply::NoJoinUrl => Ok(CallResponse {
                id: "call-2".to_string(),
                status: None,
                transport: None,
                web_call_url: None,
            }),
            Reply::Fail => Err(IntakeError::VoiceAi("provider unavailable".to_string())),
        }
    }
}

#[tokio::test]
async fn join_url_makes_the_call_ready() {
    let initiator = FakeInitiator::new(Reply::JoinUrl("https://call/abc"));
    let flow = IntakeFlow::new(test_pool(), initiator.clone());

    let outcome = flow
        .submit(" +15550100 ", "visitor@example.com")
        .await
        .expect("submit should succeed");

    assert_eq!(outcome.join_url(), Some("https://call/abc"));
    assert_eq!(outcome.request().status, CallbackStatus::Calling);
    assert_eq!(outcome.request().phone, "+15550100");

    let calls = initiator.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].phone_number, "+15550100");
    assert_eq!(calls[0].email, "visitor@example.com");
}

#[tokio::test]
async fn missing_join_url_only_acknowledges() {
    let flow = IntakeFlow::new(test_pool(), FakeInitiator::new(Reply::NoJoinUrl));

    let outcome = flow.submit("+15550100", "visitor@example.com").await.unwrap();

    assert!(matches!(outcome, IntakeOutcome::Acknowledged { .. }));
    assert_eq!(outcome.join_url(), None);

    let stored = flow
        .lookup("visitor@example.com")
        .await
        .unwrap()
        .expect("request should be stored");
    assert_eq!(stored.status, CallbackStatus::Acknowledged);
}

#[tokio::test]
async fn failed_initiation_keeps_a_failed_record() {
    let flow = IntakeFlow::new(test_pool(), FakeInitiator::new(Reply::Fail));

    let err = flow
        .submit("+15550100", "visitor@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, IntakeError::VoiceAi(_)));

    let stored = flow.lookup("visitor@example.com").await.unwrap().unwrap();
    assert_eq!(stored.status, CallbackStatus::Failed);
}

#[tokio::test]
async fn invalid_input_is_rejected_before_storage() {
    let initiator = FakeInitiator::new(Reply::NoJoinUrl);
    let flow = IntakeFlow::new(test_pool(), initiator.clone());

    let err = flow.submit("   ", "visitor@example.com").await.unwrap_err();
    assert!(matches!(err, IntakeError::InvalidInput(_)));
    let err = flow.submit("+15550100", "not-an-email").await.unwrap_err();
    assert!(matches!(err, IntakeError::InvalidInput(_)));

    assert!(initiator.calls.lock().unwrap().is_empty());
    assert!(flow.lookup("visitor@example.com").await.unwrap().is_none());
}

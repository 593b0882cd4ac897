//! Session service tests: create / input / get / cancel over the in-memory
//! store.

mod common;

use std::sync::Arc;

use orchestration::debate::{DebatePhase, EndReason, Position};
use orchestration::{DebateError, DebateService, EngineConfig, InMemorySessionStore};

use common::{article, engine_with, fast_config, StubGenerator, StubVerifier, WriterMode};

fn service(generator: Arc<StubGenerator>, config: EngineConfig) -> DebateService {
    let engine = engine_with(generator, Arc::new(StubVerifier::accepting()), config);
    DebateService::new(engine, Arc::new(InMemorySessionStore::new()))
}

#[tokio::test]
async fn test_create_returns_first_argument() {
    let svc = service(Arc::new(StubGenerator::new()), EngineConfig::default());
    let view = svc.create(article()).await.unwrap();

    assert!(!view.debate_id.is_empty());
    assert_eq!(view.article_title, "City bans cars downtown");
    assert_eq!(view.arguments.len(), 1);
    assert_eq!(view.arguments[0].position, Position::Pro);
    assert_eq!(view.current_turn, Position::Con);
    assert!(view.waiting_for_user);
    assert!(view.is_active);
    assert_eq!(view.iteration_count, 1);

    let fetched = svc.get(&view.debate_id).await.unwrap();
    assert_eq!(fetched, view);
}

#[tokio::test]
async fn test_input_resumes_and_done_ends() {
    let svc = service(Arc::new(StubGenerator::new()), EngineConfig::default());
    let id = svc.create(article()).await.unwrap().debate_id;

    let view = svc.submit_input(&id, "Mention cyclists").await.unwrap();
    assert_eq!(view.arguments.len(), 2);
    assert_eq!(view.arguments[1].position, Position::Con);

    let view = svc.submit_input(&id, "done").await.unwrap();
    assert!(!view.is_active);
    assert!(!view.waiting_for_user);
    assert_eq!(view.phase, DebatePhase::Ended);
    assert_eq!(view.end_reason, Some(EndReason::UserRequested));

    let err = svc.submit_input(&id, "continue").await.unwrap_err();
    assert!(matches!(err, DebateError::InvalidState(_)));
}

#[tokio::test(start_paused = true)]
async fn test_failed_run_stores_nothing() {
    let svc = service(
        Arc::new(StubGenerator::with_mode(WriterMode::FailFrom(2))),
        fast_config(),
    );
    let before = svc.create(article()).await.unwrap();

    let err = svc
        .submit_input(&before.debate_id, "Argue about parking")
        .await
        .unwrap_err();
    assert!(matches!(err, DebateError::CollaboratorFailure { .. }));

    let after = svc.get(&before.debate_id).await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_cancel_ends_debate() {
    let generator = Arc::new(StubGenerator::new());
    let svc = service(generator.clone(), EngineConfig::default());
    let id = svc.create(article()).await.unwrap().debate_id;

    let view = svc.cancel(&id).await.unwrap();
    assert_eq!(view.phase, DebatePhase::Ended);
    assert_eq!(view.end_reason, Some(EndReason::Cancelled));
    assert_eq!(generator.generations(), 1);

    // Cancelling again is harmless.
    let again = svc.cancel(&id).await.unwrap();
    assert_eq!(again, view);
}

#[tokio::test]
async fn test_unknown_debate() {
    let svc = service(Arc::new(StubGenerator::new()), EngineConfig::default());
    for result in [
        svc.get("nope").await,
        svc.submit_input("nope", "continue").await,
        svc.cancel("nope").await,
    ] {
        assert!(matches!(result, Err(DebateError::SessionNotFound(_))));
    }
}

#[tokio::test]
async fn test_independent_debates_run_concurrently() {
    let svc = Arc::new(service(
        Arc::new(StubGenerator::new()),
        EngineConfig::default(),
    ));
    let a = svc.create(article()).await.unwrap().debate_id;
    let b = svc.create(article()).await.unwrap().debate_id;
    assert_ne!(a, b);

    let (ra, rb) = tokio::join!(svc.submit_input(&a, "continue"), svc.submit_input(&b, "done"));
    assert_eq!(ra.unwrap().arguments.len(), 2);
    assert_eq!(rb.unwrap().phase, DebatePhase::Ended);
}

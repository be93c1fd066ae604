/*!
 * End-to-end gateway tests over mock engines: routing, cleaning,
 * validation, circuit breaking, caching, capacity, and cancellation.
 */

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tarjama::engines::MockEngine;
use tarjama::errors::GatewayError;
use tarjama::fallback::DomainHint;
use tarjama::gateway::{BreakerState, RequestStatus, TranslationRequest};
use tarjama::gateway::AttemptOutcome;
use tarjama::language::Lang;
use tarjama::purity::PurityValidator;
use tarjama::script::{Script, analyze};
use uuid::Uuid;

use crate::common::{ARABIC_GREETING, FRENCH_GREETING, fast_settings, gateway_with};

#[tokio::test]
async fn test_translate_frToAr_withHealthyEngine_shouldAcceptPureOutput() {
    let gateway = gateway_with(
        vec![Arc::new(MockEngine::healthy("primary", ARABIC_GREETING))],
        fast_settings(),
    );

    let outcome = gateway
        .translate(TranslationRequest::new(FRENCH_GREETING, Lang::Fr, Lang::Ar))
        .await
        .unwrap();

    assert_eq!(outcome.status, RequestStatus::Accepted);
    assert_eq!(outcome.text, ARABIC_GREETING);
    assert_eq!(outcome.attempts.len(), 1);
    assert_eq!(outcome.attempts[0].engine_id, "primary");
    assert!(matches!(outcome.attempts[0].outcome, AttemptOutcome::Accepted { .. }));
}

#[tokio::test]
async fn test_translate_withNoisyResponse_shouldCleanBeforeValidation() {
    // A long Arabic ruling with an engine-added English preamble and one
    // proper noun glued to an Arabic token. After cleaning, the Latin
    // token is separated and small enough to pass the purity thresholds.
    let arabic_body =
        "حكمت المحكمة على المدعى عليه بأداء واجبات الكراء المستحقة. ".repeat(3);
    let raw = format!("Here is the translation:\n{arabic_body}وكيلMaître الدفاع");
    let expected = format!("{arabic_body}وكيل Maître الدفاع");

    let gateway = gateway_with(
        vec![Arc::new(MockEngine::healthy("primary", raw))],
        fast_settings(),
    );

    let source = "Le tribunal a condamné le défendeur au paiement des loyers échus. ".repeat(3);
    let outcome = gateway
        .translate(TranslationRequest::new(source, Lang::Fr, Lang::Ar))
        .await
        .unwrap();

    assert_eq!(outcome.status, RequestStatus::Accepted);
    assert_eq!(outcome.text, expected);
    assert!(!outcome.text.contains("Here is"));
    assert!(outcome.text.contains("وكيل Maître"));
}

#[tokio::test]
async fn test_translate_withImpureResponses_shouldRejectAndFallBack() {
    // Both engines answer, but with mixed-script text that no cleaning
    // rule can repair. Every attempt is a quality rejection and the
    // caller gets the pre-validated placeholder.
    let garbage = "نص mixed with English words everywhere";
    let gateway = gateway_with(
        vec![
            Arc::new(MockEngine::healthy("primary", garbage)),
            Arc::new(MockEngine::healthy("secondary", garbage)),
        ],
        fast_settings(),
    );

    let outcome = gateway
        .translate(TranslationRequest::new(FRENCH_GREETING, Lang::Fr, Lang::Ar))
        .await
        .unwrap();

    assert_eq!(outcome.status, RequestStatus::Fallback);
    assert_eq!(outcome.attempts.len(), 2);
    for attempt in &outcome.attempts {
        assert!(
            matches!(
                attempt.outcome,
                AttemptOutcome::QualityRejected { purity_pass: false, .. }
            ),
            "unexpected outcome: {:?}",
            attempt.outcome
        );
    }

    // The placeholder itself honors the purity contract for the target.
    let verdict = PurityValidator::default().validate_text(&outcome.text, Lang::Ar);
    assert!(verdict.pass, "fallback text failed purity: {:?}", verdict);
    assert_eq!(analyze(&outcome.text).count_of(Script::Latin), 0);
}

#[tokio::test]
async fn test_translate_withSlowEngine_shouldTimeOutAndAdvance() {
    let gateway = gateway_with(
        vec![
            Arc::new(MockEngine::slow("sluggish", ARABIC_GREETING, 400)),
            Arc::new(MockEngine::healthy("backup", ARABIC_GREETING)),
        ],
        fast_settings(),
    );

    let outcome = gateway
        .translate(TranslationRequest::new(FRENCH_GREETING, Lang::Fr, Lang::Ar))
        .await
        .unwrap();

    assert_eq!(outcome.status, RequestStatus::Accepted);
    assert_eq!(outcome.attempts.len(), 2);
    assert_eq!(outcome.attempts[0].engine_id, "sluggish");
    match &outcome.attempts[0].outcome {
        AttemptOutcome::Transport { reason } => assert!(reason.contains("timed out")),
        other => panic!("expected a transport failure, got {:?}", other),
    }
    assert_eq!(outcome.attempts[1].engine_id, "backup");
    assert!(matches!(outcome.attempts[1].outcome, AttemptOutcome::Accepted { .. }));
}

#[tokio::test]
async fn test_translate_shouldTryEnginesStrictlySequentially() {
    let secondary = Arc::new(MockEngine::healthy("secondary", ARABIC_GREETING));
    let gateway = gateway_with(
        vec![
            Arc::new(MockEngine::healthy("primary", ARABIC_GREETING)),
            secondary.clone(),
        ],
        fast_settings(),
    );

    let outcome = gateway
        .translate(TranslationRequest::new(FRENCH_GREETING, Lang::Fr, Lang::Ar))
        .await
        .unwrap();

    assert_eq!(outcome.status, RequestStatus::Accepted);
    // The first engine succeeded, so the second was never dispatched.
    assert_eq!(secondary.dispatch_count(), 0);
}

#[tokio::test]
async fn test_breaker_afterConsecutiveFailures_shouldSkipEngine() {
    let flaky = Arc::new(MockEngine::failing("flaky"));
    let counter = flaky.dispatch_counter();
    let gateway = gateway_with(
        vec![
            flaky,
            Arc::new(MockEngine::healthy("backup", ARABIC_GREETING)),
        ],
        fast_settings(),
    );

    // Two failures trip the breaker under the test policy.
    for text in ["Bonjour le monde un", "Bonjour le monde deux"] {
        let outcome = gateway
            .translate(TranslationRequest::new(text, Lang::Fr, Lang::Ar))
            .await
            .unwrap();
        assert_eq!(outcome.status, RequestStatus::Accepted);
        assert_eq!(outcome.attempts.len(), 2);
    }
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(
        gateway.engine_health("flaky").unwrap().breaker,
        BreakerState::Open
    );

    // Open breaker: the flaky engine is skipped without an attempt record.
    let outcome = gateway
        .translate(TranslationRequest::new("Bonjour le monde trois", Lang::Fr, Lang::Ar))
        .await
        .unwrap();
    assert_eq!(outcome.status, RequestStatus::Accepted);
    assert_eq!(outcome.attempts.len(), 1);
    assert_eq!(outcome.attempts[0].engine_id, "backup");
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_breaker_afterCooldown_shouldProbeAndClose() {
    // Fails twice, then recovers. The breaker opens, waits out the
    // cooldown, admits one half-open probe, and closes on its success.
    let engine = Arc::new(MockEngine::flaky_start("recovering", 2, ARABIC_GREETING));
    let gateway = gateway_with(vec![engine], fast_settings());

    for text in ["Bonjour le monde un", "Bonjour le monde deux"] {
        let outcome = gateway
            .translate(TranslationRequest::new(text, Lang::Fr, Lang::Ar))
            .await
            .unwrap();
        assert_eq!(outcome.status, RequestStatus::Fallback);
    }
    assert_eq!(
        gateway.engine_health("recovering").unwrap().breaker,
        BreakerState::Open
    );

    tokio::time::sleep(Duration::from_millis(250)).await;

    let outcome = gateway
        .translate(TranslationRequest::new("Bonjour le monde trois", Lang::Fr, Lang::Ar))
        .await
        .unwrap();
    assert_eq!(outcome.status, RequestStatus::Accepted);

    let health = gateway.engine_health("recovering").unwrap();
    assert_eq!(health.breaker, BreakerState::Closed);
    assert_eq!(health.consecutive_failures, 0);
}

#[tokio::test]
async fn test_breaker_withQualityRejectedRecovery_shouldCloseAndKeepEngine() {
    // Fails twice, then starts answering with mixed-script text. The
    // half-open dispatch is delivered but rejected by scoring. Delivery
    // alone closes the breaker; a rejection is not a transport fault, so
    // the engine must stay in rotation instead of wedging half-open.
    let engine = Arc::new(MockEngine::flaky_start(
        "recovering",
        2,
        "نص mixed with English words everywhere",
    ));
    let counter = engine.dispatch_counter();
    let gateway = gateway_with(vec![engine], fast_settings());

    for text in ["Bonjour le monde un", "Bonjour le monde deux"] {
        let outcome = gateway
            .translate(TranslationRequest::new(text, Lang::Fr, Lang::Ar))
            .await
            .unwrap();
        assert_eq!(outcome.status, RequestStatus::Fallback);
    }
    assert_eq!(
        gateway.engine_health("recovering").unwrap().breaker,
        BreakerState::Open
    );

    tokio::time::sleep(Duration::from_millis(250)).await;

    let outcome = gateway
        .translate(TranslationRequest::new("Bonjour le monde trois", Lang::Fr, Lang::Ar))
        .await
        .unwrap();
    assert_eq!(outcome.status, RequestStatus::Fallback);
    assert_eq!(outcome.attempts.len(), 1);
    assert!(matches!(
        outcome.attempts[0].outcome,
        AttemptOutcome::QualityRejected { .. }
    ));
    assert_eq!(counter.load(Ordering::SeqCst), 3);

    let health = gateway.engine_health("recovering").unwrap();
    assert_eq!(health.breaker, BreakerState::Closed);
    assert_eq!(health.consecutive_failures, 0);

    // No cooldown needed: the next request dispatches the engine again.
    let outcome = gateway
        .translate(TranslationRequest::new("Bonjour le monde quatre", Lang::Fr, Lang::Ar))
        .await
        .unwrap();
    assert_eq!(outcome.status, RequestStatus::Fallback);
    assert_eq!(counter.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_translate_withRepeatedRequest_shouldServeFromCache() {
    let engine = Arc::new(MockEngine::healthy("primary", ARABIC_GREETING));
    let counter = engine.dispatch_counter();
    let gateway = gateway_with(vec![engine], fast_settings());

    let first = gateway
        .translate(TranslationRequest::new(FRENCH_GREETING, Lang::Fr, Lang::Ar))
        .await
        .unwrap();
    let second = gateway
        .translate(TranslationRequest::new(FRENCH_GREETING, Lang::Fr, Lang::Ar))
        .await
        .unwrap();

    assert_eq!(first.status, RequestStatus::Accepted);
    assert_eq!(second.status, RequestStatus::Accepted);
    // Byte-identical text, no second dispatch, no attempt records.
    assert_eq!(second.text, first.text);
    assert!(second.attempts.is_empty());
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    let (hits, misses, rate) = gateway.cache_stats();
    assert_eq!(hits, 1);
    assert_eq!(misses, 1);
    assert!((rate - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_translate_withCacheDisabled_shouldDispatchEveryTime() {
    let engine = Arc::new(MockEngine::healthy("primary", ARABIC_GREETING));
    let counter = engine.dispatch_counter();
    let settings = tarjama::app_config::PipelineSettings {
        cache_max_entries: 0,
        ..fast_settings()
    };
    let gateway = gateway_with(vec![engine], settings);

    for _ in 0..2 {
        let outcome = gateway
            .translate(TranslationRequest::new(FRENCH_GREETING, Lang::Fr, Lang::Ar))
            .await
            .unwrap();
        assert_eq!(outcome.status, RequestStatus::Accepted);
    }
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_translate_beyondQueueDepth_shouldRejectWithCapacityExceeded() {
    let settings = tarjama::app_config::PipelineSettings {
        global_concurrency_limit: 1,
        max_queue_depth: 0,
        engine_timeout_ms: 1_000,
        ..fast_settings()
    };
    let gateway = Arc::new(gateway_with(
        vec![Arc::new(MockEngine::slow("sluggish", ARABIC_GREETING, 300))],
        settings,
    ));

    let occupier = {
        let gateway = gateway.clone();
        tokio::spawn(async move {
            gateway
                .translate(TranslationRequest::new("Bonjour le monde un", Lang::Fr, Lang::Ar))
                .await
        })
    };
    // Let the first request claim the single in-flight slot.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let rejected = gateway
        .translate(TranslationRequest::new("Bonjour le monde deux", Lang::Fr, Lang::Ar))
        .await;
    assert!(matches!(rejected, Err(GatewayError::CapacityExceeded(_))));

    let outcome = occupier.await.unwrap().unwrap();
    assert_eq!(outcome.status, RequestStatus::Accepted);
}

#[tokio::test]
async fn test_translate_afterAbandonedWaiter_shouldNotLeakQueueDepth() {
    // A caller that stops waiting while queued must give its queue slot
    // back. Otherwise the depth counter drifts and later requests hit
    // CapacityExceeded against an empty queue.
    let settings = tarjama::app_config::PipelineSettings {
        global_concurrency_limit: 1,
        max_queue_depth: 1,
        engine_timeout_ms: 1_000,
        ..fast_settings()
    };
    let gateway = Arc::new(gateway_with(
        vec![Arc::new(MockEngine::slow("sluggish", ARABIC_GREETING, 300))],
        settings,
    ));

    let first = {
        let gateway = gateway.clone();
        tokio::spawn(async move {
            gateway
                .translate(TranslationRequest::new("Bonjour le monde un", Lang::Fr, Lang::Ar))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The second request queues behind the slot, then its caller gives up.
    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        gateway.translate(TranslationRequest::new("Bonjour le monde deux", Lang::Fr, Lang::Ar)),
    )
    .await;
    assert!(abandoned.is_err());

    assert_eq!(first.await.unwrap().unwrap().status, RequestStatus::Accepted);

    // Fill the slot again, then queue one more request. The abandoned
    // waiter must not still count against the depth of one.
    let second = {
        let gateway = gateway.clone();
        tokio::spawn(async move {
            gateway
                .translate(TranslationRequest::new("Bonjour le monde trois", Lang::Fr, Lang::Ar))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let queued = gateway
        .translate(TranslationRequest::new("Bonjour le monde quatre", Lang::Fr, Lang::Ar))
        .await
        .unwrap();
    assert_eq!(queued.status, RequestStatus::Accepted);
    assert_eq!(second.await.unwrap().unwrap().status, RequestStatus::Accepted);
}

#[tokio::test]
async fn test_cancel_midFlight_shouldDiscardResultAndReturnSource() {
    let engine = Arc::new(MockEngine::slow("sluggish", ARABIC_GREETING, 300));
    let counter = engine.dispatch_counter();
    let settings = tarjama::app_config::PipelineSettings {
        engine_timeout_ms: 1_000,
        ..fast_settings()
    };
    let gateway = Arc::new(gateway_with(vec![engine], settings));

    let correlation_id = Uuid::new_v4();
    let handle = {
        let gateway = gateway.clone();
        tokio::spawn(async move {
            gateway
                .translate(
                    TranslationRequest::new(FRENCH_GREETING, Lang::Fr, Lang::Ar)
                        .with_correlation_id(correlation_id),
                )
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    gateway.cancel(correlation_id);

    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome.status, RequestStatus::Cancelled);
    // The engine was dispatched, but its in-flight result was discarded
    // and nothing was cached.
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.text, FRENCH_GREETING);
    let (hits, _, _) = gateway.cache_stats();
    assert_eq!(hits, 0);
}

#[tokio::test]
async fn test_translate_withExpiredDeadline_shouldFallBackWithoutDispatch() {
    let engine = Arc::new(MockEngine::healthy("primary", ARABIC_GREETING));
    let counter = engine.dispatch_counter();
    let gateway = gateway_with(vec![engine], fast_settings());

    let outcome = gateway
        .translate(
            TranslationRequest::new(FRENCH_GREETING, Lang::Fr, Lang::Ar)
                .with_deadline(Duration::ZERO),
        )
        .await
        .unwrap();

    assert_eq!(outcome.status, RequestStatus::Fallback);
    assert!(outcome.attempts.is_empty());
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fallback_forEachDirectionAndDomain_shouldStayMonolingual() {
    for (target, domain) in [
        (Lang::Ar, DomainHint::Generic),
        (Lang::Ar, DomainHint::FamilyLaw),
        (Lang::Fr, DomainHint::Commercial),
    ] {
        let (source_lang, source) = match target {
            Lang::Ar => (Lang::Fr, FRENCH_GREETING),
            Lang::Fr => (Lang::Ar, ARABIC_GREETING),
        };
        let gateway = gateway_with(
            vec![Arc::new(MockEngine::failing("down"))],
            fast_settings(),
        );

        let outcome = gateway
            .translate(
                TranslationRequest::new(source, source_lang, target).with_domain(domain),
            )
            .await
            .unwrap();

        assert_eq!(outcome.status, RequestStatus::Fallback);
        let verdict = PurityValidator::default().validate_text(&outcome.text, target);
        assert!(
            verdict.pass,
            "fallback for {:?}/{:?} failed purity: {:?}",
            target, domain, verdict
        );
    }
}

#[tokio::test]
async fn test_translate_withEmptyResponse_shouldRecordTransportFailure() {
    let gateway = gateway_with(
        vec![
            Arc::new(MockEngine::empty("hollow")),
            Arc::new(MockEngine::healthy("backup", ARABIC_GREETING)),
        ],
        fast_settings(),
    );

    let outcome = gateway
        .translate(TranslationRequest::new(FRENCH_GREETING, Lang::Fr, Lang::Ar))
        .await
        .unwrap();

    assert_eq!(outcome.status, RequestStatus::Accepted);
    assert!(matches!(
        outcome.attempts[0].outcome,
        AttemptOutcome::Transport { .. }
    ));
}

mod common;

use common::mock_tts::{BridgeCall, MockBridge, StatusScript};
use jarvis::tts::{speak_messages, BrowserSpeaker, SpeakTiming, TtsEngine};
use std::time::Duration;

const TEXT: &str = "One two. Three four? Five six! Seven eight.";

fn fast_timing() -> SpeakTiming {
    SpeakTiming {
        start_wait: Duration::from_millis(20),
        finish_wait: Duration::from_millis(40),
        poll_interval: Duration::from_millis(1),
        base_delay: 0.001,
        per_char: 0.0,
        last_chunk_extra: 0.001,
        max_delay: 0.01,
    }
}

fn speaker(bridge: MockBridge) -> BrowserSpeaker<MockBridge> {
    BrowserSpeaker::with_timing(bridge, 20, fast_timing())
}

#[tokio::test]
async fn test_chunks_are_written_then_clicked() {
    let speaker = speaker(MockBridge::new(StatusScript::Plays));

    speaker.speak(TEXT).await.unwrap();

    let calls = speaker.bridge().calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            BridgeCall::SetText("text".into(), "One two. Three four.".into()),
            BridgeCall::Click("button".into()),
            BridgeCall::SetText("text".into(), "Five six.".into()),
            BridgeCall::Click("button".into()),
            BridgeCall::SetText("text".into(), "Seven eight.".into()),
            BridgeCall::Click("button".into()),
        ]
    );
}

#[tokio::test]
async fn test_stuck_or_broken_status_falls_back_to_sleep() {
    for script in [StatusScript::Stuck, StatusScript::Broken] {
        let speaker = speaker(MockBridge::new(script.clone()));

        let result = tokio::time::timeout(Duration::from_secs(5), speaker.speak(TEXT)).await;

        assert!(matches!(result, Ok(Ok(()))), "{:?} did not finish", script);
        assert_eq!(speaker.bridge().spoken().len(), 3);
    }
}

#[tokio::test]
async fn test_write_failure_aborts_remaining_chunks() {
    let speaker = speaker(MockBridge::new(StatusScript::Plays).failing_at(1));

    assert!(speaker.speak(TEXT).await.is_err());

    let calls = speaker.bridge().calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            BridgeCall::SetText("text".into(), "One two. Three four.".into()),
            BridgeCall::Click("button".into()),
        ]
    );
}

#[tokio::test]
async fn test_blank_text_touches_nothing() {
    let speaker = speaker(MockBridge::new(StatusScript::Plays));

    speaker.speak(" \n\t ").await.unwrap();

    assert!(speaker.bridge().calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_speak_messages_in_order() {
    let speaker = speaker(MockBridge::new(StatusScript::Plays).failing_at(2));
    let messages = vec![
        "Hello.".to_string(),
        "How are you?".to_string(),
        "Goodbye.".to_string(),
    ];

    speak_messages(&speaker, &messages).await;

    // the third message fails; earlier ones are unaffected
    assert_eq!(speaker.bridge().spoken(), vec!["Hello.", "How are you?"]);
}

#[tokio::test]
async fn test_shutdown_closes_bridge() {
    let bridge = MockBridge::new(StatusScript::Plays);
    let closed = bridge.closed.clone();
    let speaker = speaker(bridge);

    assert_eq!(speaker.name(), "browser");
    speaker.shutdown().await.unwrap();
    assert!(*closed.lock().unwrap());
}

#[tokio::test]
async fn test_page_not_ready_sends_nothing() {
    let speaker = speaker(MockBridge::new(StatusScript::Plays).not_ready());

    let err = speaker.speak(TEXT).await.unwrap_err();

    assert!(err.to_string().contains("no such element"));
    assert!(speaker.bridge().calls.lock().unwrap().is_empty());
}

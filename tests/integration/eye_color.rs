//! End-to-end stories over the eye-color domain: live drive, exact recorded
//! traces, replay as a fixed point, and divergence reporting.

use super::common::eye::{
    app_control, app_store, eye_control, eye_store, eye_store_with, refresh_control, AppCommit,
    AppState, CannedHttp, EyeCommit, EyeState, HttpEffect, R2D2_URL, VADER_URL,
};
use reprise::{lift, record, replay, run, StepKind, Store, TraceItem};
use serde_json::Value;

type Item = TraceItem<HttpEffect, EyeCommit, EyeState>;

fn get(url: &str) -> HttpEffect {
    HttpEffect::Get {
        url: url.to_string(),
    }
}

#[tokio::test]
async fn fetch_first_story_produces_the_exact_trace() {
    super::common::init_tracing();
    let probe = "http://swapi.test/api/people/3/";
    let load = "http://swapi.test/api/people/3/full/";
    let handler = CannedHttp::new(&[
        (probe, r#"{"eye_color":"red"}"#),
        (load, r#"{"eye_color":"red"}"#),
    ]);
    let store = eye_store();

    let flow = record(refresh_control(probe, load));
    let recording = run(&handler, &store, flow).await.unwrap();

    let expected: Vec<Item> = vec![
        TraceItem::Effect {
            effect: get(probe),
            result: Some(Value::from(r#"{"eye_color":"red"}"#)),
        },
        TraceItem::Commit {
            commit: EyeCommit::LoadStart,
        },
        TraceItem::Effect {
            effect: get(load),
            result: Some(Value::from(r#"{"eye_color":"red"}"#)),
        },
        TraceItem::Commit {
            commit: EyeCommit::LoadSuccess {
                color: "red".to_string(),
            },
        },
    ];
    assert_eq!(recording.trace, expected);
    assert_eq!(
        store.state(),
        EyeState {
            color: Some("red".to_string()),
            is_loading: false,
        }
    );

    // Replaying the controller against its own recording reproduces it.
    let replayed = replay(refresh_control(probe, load), &recording.trace);
    assert_eq!(replayed, recording.trace);
}

#[tokio::test]
async fn cache_miss_story_records_the_parallel_load() {
    let handler = CannedHttp::swapi();
    let store = eye_store();

    let recording = run(&handler, &store, record(eye_control())).await.unwrap();

    let r2d2_body = r#"{"eye_color":"red","name":"R2-D2"}"#;
    let vader_body = r#"{"eye_color":"yellow","name":"Darth Vader"}"#;
    let expected: Vec<Item> = vec![
        TraceItem::State {
            state: EyeState::default(),
        },
        TraceItem::Commit {
            commit: EyeCommit::LoadStart,
        },
        TraceItem::All {
            branches: vec![
                vec![
                    TraceItem::Effect {
                        effect: get(R2D2_URL),
                        result: Some(Value::from(r2d2_body)),
                    },
                    TraceItem::Return {
                        result: Value::from(r2d2_body),
                    },
                ],
                vec![
                    TraceItem::Effect {
                        effect: get(VADER_URL),
                        result: Some(Value::from(vader_body)),
                    },
                    TraceItem::Return {
                        result: Value::from(vader_body),
                    },
                ],
            ],
        },
        TraceItem::Commit {
            commit: EyeCommit::LoadSuccess {
                color: "red".to_string(),
            },
        },
    ];
    assert_eq!(recording.trace, expected);

    let replayed = replay(eye_control(), &recording.trace);
    assert_eq!(replayed, recording.trace);
}

#[tokio::test]
async fn cache_hit_story_is_a_single_state_read() {
    let handler = CannedHttp::swapi();
    let store = eye_store_with("red");

    let recording = run(&handler, &store, record(eye_control())).await.unwrap();
    assert_eq!(
        recording.trace,
        vec![TraceItem::State {
            state: EyeState {
                color: Some("red".to_string()),
                is_loading: false,
            },
        }]
    );

    let replayed = replay(eye_control(), &recording.trace);
    assert_eq!(replayed, recording.trace);
}

#[tokio::test]
async fn substituted_commit_item_is_rejected_structurally() {
    let probe = "http://swapi.test/api/people/3/";
    let load = "http://swapi.test/api/people/3/full/";
    let handler = CannedHttp::new(&[
        (probe, r#"{"eye_color":"red"}"#),
        (load, r#"{"eye_color":"red"}"#),
    ]);
    let store = eye_store();
    let recording = run(&handler, &store, record(refresh_control(probe, load)))
        .await
        .unwrap();

    // Corrupt the recording: where the flow asks for an effect, the tampered
    // trace claims a commit happened.
    let mut tampered = recording.trace.clone();
    tampered[0] = TraceItem::Commit {
        commit: EyeCommit::LoadStart,
    };

    let replayed = replay(refresh_control(probe, load), &tampered);
    assert_eq!(
        replayed,
        vec![TraceItem::Diverged {
            expected: StepKind::Commit,
            actual: StepKind::Effect,
        }]
    );
}

#[tokio::test]
async fn tampered_state_item_is_rejected_structurally() {
    let handler = CannedHttp::swapi();
    let store = eye_store();
    let recording = run(&handler, &store, record(eye_control())).await.unwrap();

    let mut tampered = recording.trace.clone();
    tampered[0] = TraceItem::Commit {
        commit: EyeCommit::LoadStart,
    };

    let replayed = replay(eye_control(), &tampered);
    assert_eq!(
        replayed,
        vec![TraceItem::Diverged {
            expected: StepKind::Commit,
            actual: StepKind::State,
        }]
    );
}

#[tokio::test]
async fn lifted_controller_wraps_commits_and_projects_state() {
    let handler = CannedHttp::swapi();
    let store = app_store();

    let recording = run(&handler, &store, record(app_control())).await.unwrap();

    assert_eq!(
        recording.trace[0],
        TraceItem::State {
            state: AppState::default(),
        }
    );
    assert_eq!(
        recording.trace[1],
        TraceItem::Commit {
            commit: AppCommit::Eye {
                commit: EyeCommit::LoadStart,
            },
        }
    );
    assert_eq!(
        store.state().eye.color.as_deref(),
        Some("red"),
        "lifted commits must reach the wrapped store slice"
    );

    // Same suspension sequence as the unlifted controller.
    assert_eq!(recording.trace.len(), 4);

    let replayed = replay(app_control(), &recording.trace);
    assert_eq!(replayed, recording.trace);
}

#[tokio::test]
async fn identity_lift_is_observably_transparent() {
    let handler = CannedHttp::swapi();

    let plain = run(&handler, &eye_store(), record(eye_control()))
        .await
        .unwrap();
    let lifted_flow = lift(eye_control(), |commit| commit, |state: EyeState| state);
    let lifted = run(&handler, &eye_store(), record(lifted_flow))
        .await
        .unwrap();

    assert_eq!(lifted.trace, plain.trace);
}

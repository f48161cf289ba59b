//! Test: Failure handling - fail fast at the first failing stage

use crate::helpers::*;
use mrchain::core::{ChainBuilder, Pipeline};
use mrchain::execution::{PipelineRunner, RunError, RunStatus};

fn three_stage_chain() -> Pipeline {
    ChainBuilder::create()
        .name("histogram")
        .temp_dir("/tmp/histogram-")
        .mapper(TokenMapper)
        .unwrap()
        .reducer(SumReducer)
        .unwrap()
        .mapper(SwapMapper)
        .unwrap()
        .reducer(GroupReducer)
        .unwrap()
        .mapper(KeysMapper)
        .unwrap()
        .build()
        .unwrap()
}

/// All stages succeed and run in order
#[tokio::test]
async fn test_all_stages_run_in_order() {
    let engine = MockEngine::new();
    let report = three_stage_chain().run(&engine, "/in", "/out").await.unwrap();

    assert_eq!(report.status, RunStatus::Succeeded);
    assert_eq!(report.pipeline_name, "histogram");
    assert_eq!(engine.submitted_ordinals(), vec![0, 1, 2]);
    assert_eq!(engine.await_count(), 3);
    assert_wired(&engine.submitted(), "/in", "/out");

    let outputs: Vec<&str> = report.stages.iter().map(|s| s.output.as_str()).collect();
    assert_eq!(outputs, vec!["/tmp/histogram-1", "/tmp/histogram-2", "/out"]);
}

/// A failing middle stage stops the run before the last stage is submitted
#[tokio::test]
async fn test_middle_stage_failure_stops_run() {
    let engine = MockEngine::failing_at(&[1]);
    let err = three_stage_chain().run(&engine, "/in", "/out").await.unwrap_err();

    match &err {
        RunError::StageFailed { ordinal, name } => {
            assert_eq!(*ordinal, 1);
            assert_eq!(name, "histogram");
        }
        other => panic!("expected StageFailed, got {:?}", other),
    }
    assert_eq!(err.ordinal(), 1);
    assert!(err.to_string().contains("Stage 1"));
    assert_eq!(engine.submitted_ordinals(), vec![0, 1]);
}

/// A failing first stage never submits anything else
#[tokio::test]
async fn test_first_stage_failure() {
    let engine = MockEngine::failing_at(&[0, 2]);
    let err = three_stage_chain().run(&engine, "/in", "/out").await.unwrap_err();

    assert_eq!(err.ordinal(), 0);
    assert_eq!(engine.submitted_ordinals(), vec![0]);
}

/// Submission errors are reported with the stage that could not be submitted
#[tokio::test]
async fn test_submit_error() {
    let err = three_stage_chain()
        .run(&RejectingEngine, "/in", "/out")
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::Submit { ordinal: 0, .. }));
    assert!(err.to_string().contains("cluster unavailable"));
}

/// Events trace the run up to the failing stage
#[tokio::test]
async fn test_events_on_failure() {
    let engine = MockEngine::failing_at(&[1]);
    let (log, handler) = event_log();
    let mut runner = PipelineRunner::new(&engine);
    runner.add_event_handler(handler);

    let pipeline = three_stage_chain();
    assert!(runner.run(&pipeline, "/in", "/out").await.is_err());

    assert_eq!(
        *log.lock().unwrap(),
        vec!["start 3", "submit 0", "done 0", "submit 1", "fail 1", "end Failed"]
    );
}

//! Test: Wiring - locations connecting consecutive stages

use crate::helpers::*;
use mrchain::core::{ChainBuilder, Pipeline};

fn histogram() -> Pipeline {
    ChainBuilder::create()
        .name("histogram")
        .temp_dir("hdfs:///tmp/histogram/step")
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

#[test]
fn test_neighbours_share_locations() {
    let specs = histogram().wire_locations("hdfs:///data/books", "hdfs:///out/histogram");
    assert_eq!(specs.len(), 3);
    assert_wired(&specs, "hdfs:///data/books", "hdfs:///out/histogram");
}

#[test]
fn test_intermediate_paths_append_index_to_root() {
    let pipeline = histogram();
    let specs = pipeline.wire_locations("/in", "/out");

    assert_eq!(specs[0].output, "hdfs:///tmp/histogram/step1");
    assert_eq!(specs[1].input, "hdfs:///tmp/histogram/step1");
    assert_eq!(specs[1].output, "hdfs:///tmp/histogram/step2");
    assert_eq!(specs[2].input, pipeline.intermediate_path(2));
}

#[test]
fn test_wiring_is_idempotent() {
    let pipeline = histogram();
    let first = pipeline.wire_locations("/in", "/out");
    let second = pipeline.wire_locations("/in", "/out");
    assert_eq!(first, second);
}

#[test]
fn test_wiring_leaves_pipeline_untouched() {
    let pipeline = histogram();
    let before = pipeline.clone();
    let _ = pipeline.wire_locations("/a", "/b");
    let _ = pipeline.wire_locations("/c", "/d");
    assert_eq!(pipeline, before);
}

#[test]
fn test_wired_stage_keeps_its_types() {
    let pipeline = histogram();
    let specs = pipeline.wire_locations("/in", "/out");
    for (spec, stage) in specs.iter().zip(pipeline.stages()) {
        assert_eq!(&spec.stage, stage);
    }
}

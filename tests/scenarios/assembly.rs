//! Test: Assembly - how mapper/reducer call sequences become stages

use crate::helpers::*;
use mrchain::core::types::{IntWritable, Text, TypeTag};
use mrchain::core::{BuildError, ChainBuilder, MapPhase, Signature};

/// mapper, mapper, reducer seals the first mapper on its own
#[test]
fn test_mapper_mapper_reducer_yields_two_stages() {
    let pipeline = ChainBuilder::create()
        .name("wc")
        .temp_dir("/tmp/wc-")
        .mapper(TokenMapper)
        .unwrap()
        .mapper(SwapMapper)
        .unwrap()
        .reducer(GroupReducer)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(pipeline.stage_count(), 2);
    assert_eq!(stage_shapes(&pipeline), vec![(true, false), (true, true)]);
    assert_eq!(pipeline.stage(0).unwrap().num_reduce_tasks, Some(0));
    assert_eq!(pipeline.stage(1).unwrap().num_reduce_tasks, None);
}

/// A lone mapper becomes a map-only stage carrying the mapper's output types
#[test]
fn test_single_mapper_is_map_only() {
    let pipeline = ChainBuilder::create()
        .name("tokens")
        .temp_dir("/tmp/tokens-")
        .mapper(TokenMapper)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(pipeline.stage_count(), 1);
    let stage = pipeline.stage(0).unwrap();
    assert_eq!(stage.output_key, TypeTag::of::<Text>());
    assert_eq!(stage.output_value, TypeTag::of::<IntWritable>());
    assert_eq!(stage.num_reduce_tasks, Some(0));
    assert!(stage.reducer.is_none());
    assert_eq!(stage.job_name, "tokens");
}

/// Two mappers in a row produce two map-only stages
#[test]
fn test_consecutive_mappers_auto_seal() {
    let pipeline = ChainBuilder::create()
        .name("maps")
        .temp_dir("/tmp/maps-")
        .mapper(TokenMapper)
        .unwrap()
        .mapper(SwapMapper)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(pipeline.stage_count(), 2);
    for (i, stage) in pipeline.stages().iter().enumerate() {
        assert!(stage.is_map_only(), "stage {} should be map-only", i);
        assert_eq!(stage.num_reduce_tasks, Some(0));
    }
    assert!(pipeline.stage(0).unwrap().mapper.as_deref().unwrap().ends_with("TokenMapper"));
    assert!(pipeline.stage(1).unwrap().mapper.as_deref().unwrap().ends_with("SwapMapper"));
}

/// A reducer without a preceding mapper takes its intermediate types from its inputs
#[test]
fn test_reducer_first_is_reduce_only() {
    let pipeline = ChainBuilder::create()
        .name("sum")
        .temp_dir("/tmp/sum-")
        .reducer(SumReducer)
        .unwrap()
        .build()
        .unwrap();

    let stage = pipeline.stage(0).unwrap();
    assert!(stage.mapper.is_none());
    assert_eq!(stage.map_output_key, TypeTag::of::<Text>());
    assert_eq!(stage.map_output_value, TypeTag::of::<IntWritable>());
    assert_eq!(stage.num_reduce_tasks, None);
}

/// A reducer right after a sealed stage starts a new reduce-only stage
#[test]
fn test_reducer_after_reducer() {
    let pipeline = ChainBuilder::create()
        .name("twice")
        .temp_dir("/tmp/twice-")
        .mapper(TokenMapper)
        .unwrap()
        .reducer(SumReducer)
        .unwrap()
        .reducer(SumReducer)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(stage_shapes(&pipeline), vec![(true, true), (false, true)]);
}

/// The full word-count-then-group chain
#[test]
fn test_long_chain() {
    let pipeline = ChainBuilder::create()
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
        .unwrap();

    assert_eq!(
        stage_shapes(&pipeline),
        vec![(true, true), (true, true), (true, false)]
    );
    let last = pipeline.stage(2).unwrap();
    assert_eq!(last.output_key, TypeTag::of::<IntWritable>());
    assert_eq!(last.output_value.as_str(), "NullWritable");
}

/// An external mapper with unbound output types aborts the chain
#[test]
fn test_unbound_external_mapper() {
    let raw = MapPhase::external("org.example.RawMapper", Signature::unbound());
    let result = ChainBuilder::create()
        .name("raw")
        .temp_dir("/tmp/raw-")
        .mapper(TokenMapper)
        .unwrap()
        .mapper(raw);

    match result {
        Err(BuildError::TypeInference { class_name, parameter, .. }) => {
            assert_eq!(class_name, "org.example.RawMapper");
            assert_eq!(parameter, "KEYOUT");
        }
        Err(other) => panic!("expected TypeInference, got {:?}", other),
        Ok(_) => panic!("expected TypeInference, got a builder"),
    }
}

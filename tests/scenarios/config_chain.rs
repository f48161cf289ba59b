//! Test: Config-driven chains - YAML declarations through the same builder rules

use crate::helpers::*;
use mrchain::core::config::ChainConfig;
use mrchain::core::{BuildError, InputFormat, OutputFormat};

const HISTOGRAM: &str = r#"
name: "histogram"
temp_dir: "/tmp/histogram-"
configuration:
  mapreduce.job.queuename: batch
stages:
  - mapper:
      class: org.example.TokenMapper
      types: [LongWritable, Text, Text, IntWritable]
      options:
        "-I": KeyValueTextInputFormat
  - mapper:
      class: org.example.LowercaseMapper
      types: [Text, IntWritable, Text, IntWritable]
    reducer:
      class: org.example.SumReducer
      types: [Text, IntWritable, Text, IntWritable]
      options:
        "-M": "TRUE"
        sum.min: 2
  - reducer:
      class: org.example.GroupReducer
      types: [Text, IntWritable, IntWritable, Text]
"#;

#[test]
fn test_config_follows_builder_rules() {
    let pipeline = ChainConfig::from_yaml(HISTOGRAM).unwrap().to_pipeline().unwrap();

    assert_eq!(
        stage_shapes(&pipeline),
        vec![(true, false), (true, true), (false, true)]
    );

    let first = pipeline.stage(0).unwrap();
    assert_eq!(first.mapper.as_deref(), Some("org.example.TokenMapper"));
    assert_eq!(first.input_format, InputFormat::KeyValueText);
    assert_eq!(first.num_reduce_tasks, Some(0));

    let second = pipeline.stage(1).unwrap();
    assert_eq!(second.output_format, OutputFormat::LazyText);
    assert_eq!(second.configuration.get("sum.min"), Some("2"));
    assert_eq!(second.configuration.get("mapreduce.job.queuename"), Some("batch"));

    let third = pipeline.stage(2).unwrap();
    assert_eq!(third.output_key.as_str(), "IntWritable");
}

#[tokio::test]
async fn test_config_chain_runs() {
    let pipeline = ChainConfig::from_yaml(HISTOGRAM).unwrap().to_pipeline().unwrap();
    let engine = MockEngine::new();

    pipeline.run(&engine, "/books", "/histogram").await.unwrap();

    let submitted = engine.submitted();
    assert_eq!(submitted.len(), 3);
    assert_wired(&submitted, "/books", "/histogram");
}

#[test]
fn test_config_without_stages() {
    let yaml = r#"
name: "empty"
temp_dir: "/tmp/empty-"
"#;
    let config = ChainConfig::from_yaml(yaml).unwrap();
    assert_eq!(config.to_pipeline().unwrap_err(), BuildError::EmptyPipeline);
}

#[test]
fn test_config_file_round_trip_through_disk() {
    let path = std::env::temp_dir().join(format!("mrchain-{}.yaml", std::process::id()));
    std::fs::write(&path, HISTOGRAM).unwrap();

    let config = ChainConfig::from_file(&path).unwrap();
    assert_eq!(config.stages.len(), 3);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_missing_config_file() {
    assert!(ChainConfig::from_file("/nonexistent/mrchain/chain.yaml").is_err());
}

mod helpers;

use helpers::test_pipeline_with;
use souschef::config::EmbeddingFallback;
use souschef::embedding::fake::FakeEmbedder;
use souschef::error::PipelineError;
use souschef::generation::fake::FakeGenerator;

#[tokio::test]
async fn batch_isolates_failures_and_preserves_input_order() {
    let generator = FakeGenerator::default();
    generator.add_response("garbled", "this is not a recipe");
    let pipeline = test_pipeline_with(
        generator,
        FakeEmbedder::new(),
        EmbeddingFallback::Reject,
    );

    let prompts: Vec<String> = [
        "tomato soup",
        "lentil curry",
        "garbled nonsense",
        "pasta salad",
        "beef stew",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let results = pipeline.generate_batch(&prompts, "alice").await;
    assert_eq!(results.len(), prompts.len());

    // The one bad prompt fails in place; every other slot commits
    for (index, result) in results.iter().enumerate() {
        if index == 2 {
            assert!(matches!(result, Err(PipelineError::Generation(_))));
        } else {
            assert!(result.is_ok(), "slot {index} failed: {result:?}");
        }
    }

    let committed = pipeline.repository().list_by_owner("alice").unwrap();
    assert_eq!(committed.len(), prompts.len() - 1);
}

#[tokio::test]
async fn batch_of_one_group_still_completes() {
    let pipeline = test_pipeline_with(
        FakeGenerator::default(),
        FakeEmbedder::new(),
        EmbeddingFallback::Reject,
    );

    let prompts = vec!["quick lunch".to_string()];
    let results = pipeline.generate_batch(&prompts, "bob").await;
    assert_eq!(results.len(), 1);
    assert!(results[0].is_ok());
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let pipeline = test_pipeline_with(
        FakeGenerator::empty(),
        FakeEmbedder::new(),
        EmbeddingFallback::Reject,
    );

    let results = pipeline.generate_batch(&[], "alice").await;
    assert!(results.is_empty());
    assert!(pipeline.repository().list_by_owner("alice").unwrap().is_empty());
}

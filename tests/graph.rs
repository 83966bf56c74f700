//! Cache correctness of the computation tree under edits.

mod common;

use common::*;
use statchain::graph::kinds::{Divide, FiveNumber, Histogram, Mean, Passthrough, Summation, TTest};
use statchain::graph::{Answers, InfoAnswer, PromptKind};
use statchain::{Column, DataSource, GraphError, OperationNode};

fn scripted() -> ScriptedEngine {
    ScriptedEngine::new()
        .on("$statistic", "[1] -1.1619\n")
        .on("$p.value", "[1] 0.3125\n")
        .on("mean(", "[1] 2.5\n")
        .on("sd(", "[1] 1.291\n")
        .on("sum(", "[1] 10\n")
        .on("quantile(", "[1] 1 1.75 2.5 3.25 4\n")
        .on(" / 2", "[1] 1.25\n")
}

fn ttest_answers() -> Answers {
    let mut answers = Answers::default();
    answers.insert("column".into(), InfoAnswer::Choice("size".into()));
    answers.insert("mu".into(), InfoAnswer::Number(2.0));
    answers
}

#[tokio::test]
async fn fresh_nodes_are_dirty_and_compute_lazily() {
    let mut engine = scripted();
    let mut table = sample_table();
    let path = table.attach(&[], OperationNode::from_kind(Mean)).unwrap();
    assert_eq!(path, vec![0]);
    assert!(table.node(&path).unwrap().is_dirty());
    assert!(table.node(&path).unwrap().cached_columns().is_none());

    table.check_cache(&path, &mut engine).await.unwrap();

    let node = table.node(&path).unwrap();
    assert!(!node.is_dirty());
    assert_eq!(
        node.cached_columns().unwrap(),
        &[Column::numeric("mean(size)", vec![2.5])]
    );

    // Clean node: a second check issues no further engine traffic.
    let issued = engine.commands.len();
    table.check_cache(&path, &mut engine).await.unwrap();
    assert_eq!(engine.commands.len(), issued);
}

#[tokio::test]
async fn unanswered_prompts_fail_without_touching_the_cache() {
    let mut engine = scripted();
    let mut table = sample_table();
    let path = table.attach(&[], OperationNode::from_kind(TTest)).unwrap();

    let err = table.check_cache(&path, &mut engine).await.unwrap_err();
    match err {
        GraphError::InfoRequired {
            path: at,
            kind,
            prompts,
        } => {
            assert_eq!(at, path);
            assert_eq!(kind, "t-test");
            assert_eq!(prompts.len(), 2);
            assert!(matches!(prompts[0].kind, PromptKind::Choice { .. }));
            assert!(matches!(prompts[1].kind, PromptKind::Numeric));
        }
        other => panic!("expected InfoRequired, got {other:?}"),
    }
    // Nothing was computed and nothing reached the engine.
    assert!(table.node(&path).unwrap().cached_columns().is_none());
    assert!(engine.commands.is_empty());

    table.set_answers(&path, ttest_answers()).unwrap();
    table.check_cache(&path, &mut engine).await.unwrap();
    assert_eq!(
        table.node(&path).unwrap().cached_columns().unwrap(),
        &[Column::numeric("t.test(size)", vec![-1.1619, 0.3125])]
    );
}

#[tokio::test]
async fn summary_kinds_skip_text_columns() {
    let mut engine = scripted();
    let mut table = sample_table();
    let sum = table
        .attach(&[], OperationNode::from_kind(Summation))
        .unwrap();
    let five = table
        .attach(&[], OperationNode::from_kind(FiveNumber))
        .unwrap();

    table.check_cache(&sum, &mut engine).await.unwrap();
    table.check_cache(&five, &mut engine).await.unwrap();

    // One output column per numeric parent column; the text column
    // contributes nothing.
    assert_eq!(
        table.node(&sum).unwrap().cached_columns().unwrap(),
        &[Column::numeric("sum(size)", vec![10.0])]
    );
    assert_eq!(
        table.node(&five).unwrap().cached_columns().unwrap(),
        &[Column::numeric(
            "quantile(size)",
            vec![1.0, 1.75, 2.5, 3.25, 4.0]
        )]
    );
}

#[tokio::test]
async fn info_required_on_an_ancestor_names_the_ancestor() {
    let mut engine = scripted();
    let mut table = sample_table();
    let parent = table.attach(&[], OperationNode::from_kind(TTest)).unwrap();
    let child = table
        .attach(&parent, OperationNode::from_kind(Passthrough))
        .unwrap();

    let err = table.check_cache(&child, &mut engine).await.unwrap_err();
    match err {
        GraphError::InfoRequired { path, .. } => assert_eq!(path, parent),
        other => panic!("expected InfoRequired, got {other:?}"),
    }
}

#[tokio::test]
async fn lazy_check_recomputes_dirty_ancestors_first() {
    let mut engine = scripted();
    let mut table = sample_table();
    let mean = table.attach(&[], OperationNode::from_kind(Mean)).unwrap();
    let divide = table
        .attach(&mean, OperationNode::from_kind(Divide { divisor: 2.0 }))
        .unwrap();

    table.check_cache(&divide, &mut engine).await.unwrap();

    assert!(!table.node(&mean).unwrap().is_dirty());
    assert!(!table.node(&divide).unwrap().is_dirty());
    assert_eq!(
        table.node(&divide).unwrap().cached_columns().unwrap(),
        &[Column::numeric("mean(size)", vec![1.25])]
    );

    // Parent commands were issued before child commands.
    let mean_at = engine
        .commands
        .iter()
        .position(|c| c.contains("mean("))
        .unwrap();
    let divide_at = engine
        .commands
        .iter()
        .position(|c| c.contains(" / 2"))
        .unwrap();
    assert!(mean_at < divide_at);
}

#[tokio::test]
async fn answer_edits_invalidate_the_whole_subtree() {
    let mut engine = scripted();
    let mut table = sample_table();
    let mean = table.attach(&[], OperationNode::from_kind(Mean)).unwrap();
    let divide = table
        .attach(&mean, OperationNode::from_kind(Divide { divisor: 2.0 }))
        .unwrap();
    table.check_cache(&divide, &mut engine).await.unwrap();

    table.set_answers(&mean, Answers::default()).unwrap();
    assert!(table.node(&mean).unwrap().is_dirty());
    assert!(table.node(&divide).unwrap().is_dirty());
    // Dirty caches stop being served.
    assert!(table.node(&divide).unwrap().cached_columns().is_none());
}

#[tokio::test]
async fn refresh_cascades_parent_before_child() {
    let mut engine = scripted();
    let mut table = sample_table();
    let mean = table.attach(&[], OperationNode::from_kind(Mean)).unwrap();
    let divide = table
        .attach(&mean, OperationNode::from_kind(Divide { divisor: 2.0 }))
        .unwrap();
    table.check_cache(&divide, &mut engine).await.unwrap();

    // Eager refresh at the subtree root recomputes everything below,
    // clean or not.
    engine.commands.clear();
    table.refresh(&mean, &mut engine).await.unwrap();

    assert!(!table.node(&mean).unwrap().is_dirty());
    assert!(!table.node(&divide).unwrap().is_dirty());
    let mean_at = engine
        .commands
        .iter()
        .position(|c| c.contains("mean("))
        .unwrap();
    let divide_at = engine
        .commands
        .iter()
        .position(|c| c.contains(" / 2"))
        .unwrap();
    assert!(mean_at < divide_at);
}

#[tokio::test]
async fn program_text_records_the_commands_of_the_last_recompute() {
    let mut engine = scripted();
    let mut table = sample_table();
    let mean = table.attach(&[], OperationNode::from_kind(Mean)).unwrap();
    table.check_cache(&mean, &mut engine).await.unwrap();

    let program = table.node(&mean).unwrap().program_text().unwrap();
    assert!(program.contains("= c(1, 2, 3, 4)"));
    assert!(program.contains("mean("));
}

#[tokio::test]
async fn detach_severs_the_subtree() {
    let mut table = sample_table();
    let mean = table.attach(&[], OperationNode::from_kind(Mean)).unwrap();
    let _divide = table
        .attach(&mean, OperationNode::from_kind(Divide { divisor: 2.0 }))
        .unwrap();

    let removed = table.detach(&mean).unwrap();
    assert_eq!(removed.children().len(), 1);
    assert!(table.children().is_empty());
    assert!(matches!(
        table.node(&mean),
        Err(GraphError::NodeNotFound { .. })
    ));
}

#[tokio::test]
async fn unknown_paths_are_reported() {
    let mut engine = scripted();
    let mut table = sample_table();
    let err = table.check_cache(&[3], &mut engine).await.unwrap_err();
    assert!(matches!(err, GraphError::NodeNotFound { path } if path == vec![3]));
}

#[tokio::test]
async fn plot_kinds_cache_an_artifact_instead_of_columns() {
    let mut engine = scripted();
    let mut table = sample_table();
    let mut answers = Answers::default();
    answers.insert("column".into(), InfoAnswer::Choice("size".into()));
    let hist = table
        .attach(
            &[],
            OperationNode::from_kind(Histogram).with_answers(answers),
        )
        .unwrap();

    table.check_cache(&hist, &mut engine).await.unwrap();

    let node = table.node(&hist).unwrap();
    assert!(node.cached_columns().is_none());
    let plot = node.plot().unwrap();
    assert_eq!(plot.extension().unwrap(), "png");
    assert!(node.program_text().unwrap().contains("hist("));
}

#[test]
fn equality_is_subtree_only() {
    // Same kind, answers, and children: equal, regardless of what the
    // nodes are attached to or whether they have computed.
    let mut a = OperationNode::from_kind(TTest).with_answers(ttest_answers());
    a.attach(OperationNode::from_kind(Passthrough));
    let mut b = OperationNode::from_kind(TTest).with_answers(ttest_answers());
    b.attach(OperationNode::from_kind(Passthrough));
    assert_eq!(a, b);

    // Different answers: not equal.
    let c = OperationNode::from_kind(TTest);
    assert_ne!(a, c);

    // Different kind parameters: not equal.
    let d1 = OperationNode::from_kind(Divide { divisor: 2.0 });
    let d2 = OperationNode::from_kind(Divide { divisor: 3.0 });
    assert_ne!(d1, d2);
}

#[test]
fn nodes_expose_the_table_capability() {
    let node = OperationNode::from_kind(Mean);
    // Dirty nodes serve no columns.
    assert!(node.current_columns().is_none());
    assert!(node.view().is_none());

    let table = sample_table();
    let view = table.view().unwrap();
    assert_eq!(view.name, "samples");
    assert_eq!(view.numeric_column_names(), vec!["size".to_string()]);
    assert_eq!(view.column("grade").unwrap().name(), "grade");
}

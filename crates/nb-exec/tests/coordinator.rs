//! Coordinator behavior against a scripted runner

use nb_exec::{Coordinator, CoordinatorConfig, ExecError, RunState, TickOutcome};
use nb_model::{Cursor, OutputVariant, StreamName};
use nb_test_utils::{code_document, document_of, code_cell, markdown_cell, failure, stdout, ScriptedRunner};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn print_one_appends_single_stream_output() {
    let runner = ScriptedRunner::new().with_script("print(1)", vec![stdout("1\n")]);
    let mut coordinator = Coordinator::new(runner);
    let mut doc = code_document(&["print(1)"]);
    let mut cursor = Cursor::new();

    coordinator.execute_cell(&mut doc, &mut cursor, 0).unwrap();
    coordinator.run_to_completion(&mut doc, &mut cursor).unwrap();

    assert_eq!(
        doc.cells()[0].outputs(),
        &[OutputVariant::Stream {
            name: StreamName::Stdout,
            text: vec!["1\n".to_string()],
        }]
    );
    assert_eq!(cursor.running_index(), -1);
    assert_eq!(coordinator.state(), RunState::Idle);
}

#[test]
fn second_run_request_is_rejected() {
    let runner = ScriptedRunner::new().with_script("a", vec![stdout("x"), stdout("y")]);
    let mut coordinator = Coordinator::new(runner);
    let mut doc = code_document(&["a", "b"]);
    let mut cursor = Cursor::new();

    coordinator.execute_cell(&mut doc, &mut cursor, 0).unwrap();
    let err = coordinator.execute_cell(&mut doc, &mut cursor, 1).unwrap_err();
    assert!(err.is_busy());
    assert!(coordinator.execute_all(&mut doc, &mut cursor).unwrap_err().is_busy());

    assert_eq!(coordinator.state(), RunState::Running(0));
    assert_eq!(cursor.running(), Some(0));
    assert_eq!(coordinator.runner().started(), &["a".to_string()]);
    assert_eq!(doc.cells()[1].execution_count(), None);
}

#[test]
fn stop_waits_for_acknowledgement_and_keeps_outputs() {
    let runner = ScriptedRunner::new()
        .with_script("loop", vec![stdout("1"), stdout("2"), stdout("3")])
        .with_cancel_delay(1);
    let mut coordinator = Coordinator::new(runner);
    let mut doc = code_document(&["loop"]);
    let mut cursor = Cursor::new();

    coordinator.execute_cell(&mut doc, &mut cursor, 0).unwrap();
    coordinator.tick(&mut doc, &mut cursor).unwrap();
    assert!(coordinator.stop());
    assert!(!coordinator.stop());
    assert_eq!(coordinator.state(), RunState::Cancelling);

    assert_eq!(
        coordinator.tick(&mut doc, &mut cursor).unwrap(),
        TickOutcome::CancelPending
    );
    assert_eq!(
        coordinator.tick(&mut doc, &mut cursor).unwrap(),
        TickOutcome::Cancelled { cell: 0 }
    );

    assert!(coordinator.is_idle());
    assert_eq!(cursor.running_index(), -1);
    assert_eq!(doc.cells()[0].outputs().len(), 1);
}

#[test]
fn cancelled_execute_all_does_not_continue() {
    let runner = ScriptedRunner::new().with_script("a", vec![stdout("1"), stdout("2")]);
    let mut coordinator = Coordinator::new(runner);
    let mut doc = code_document(&["a", "b"]);
    let mut cursor = Cursor::new();

    coordinator.execute_all(&mut doc, &mut cursor).unwrap();
    coordinator.tick(&mut doc, &mut cursor).unwrap();
    coordinator.stop();
    coordinator.run_to_completion(&mut doc, &mut cursor).unwrap();

    assert_eq!(coordinator.runner().started(), &["a".to_string()]);
    assert!(doc.cells()[1].outputs().is_empty());
}

#[test]
fn failed_cell_ends_execute_all() {
    let runner = ScriptedRunner::new()
        .with_script("a", vec![stdout("ok\n")])
        .with_script("b", vec![stdout("partial\n"), failure("NameError", "name 'x' is not defined")])
        .with_script("c", vec![stdout("never\n")]);
    let mut coordinator = Coordinator::new(runner);
    let mut doc = code_document(&["a", "b", "c"]);
    let mut cursor = Cursor::new();

    coordinator.execute_all(&mut doc, &mut cursor).unwrap();
    coordinator.run_to_completion(&mut doc, &mut cursor).unwrap();

    let outputs = doc.cells()[1].outputs();
    assert_eq!(outputs.len(), 2);
    assert_eq!(
        outputs[1].summary().as_deref(),
        Some("NameError: name 'x' is not defined")
    );
    assert!(doc.cells()[2].outputs().is_empty());
    assert_eq!(coordinator.runner().started(), &["a".to_string(), "b".to_string()]);
}

#[test]
fn execution_counts_can_be_disabled() {
    let runner = ScriptedRunner::new();
    let config = CoordinatorConfig::new().with_execution_counts(false);
    let mut coordinator = Coordinator::with_config(runner, config);
    let mut doc = document_of(vec![markdown_cell("# T"), code_cell("a")]);
    let mut cursor = Cursor::new();

    coordinator.execute_all(&mut doc, &mut cursor).unwrap();
    assert_eq!(coordinator.state(), RunState::Running(1));
    coordinator.run_to_completion(&mut doc, &mut cursor).unwrap();
    assert_eq!(doc.cells()[1].execution_count(), None);
    assert_eq!(coordinator.execution_count(), 0);
}

#[test]
fn execute_all_without_code_cells_stays_idle() {
    let mut coordinator = Coordinator::new(ScriptedRunner::new());
    let mut doc = document_of(vec![markdown_cell("text")]);
    let mut cursor = Cursor::new();

    coordinator.execute_all(&mut doc, &mut cursor).unwrap();
    assert!(coordinator.is_idle());
    assert!(matches!(
        coordinator.execute_cell(&mut doc, &mut cursor, 0),
        Err(ExecError::NotExecutable { .. })
    ));
}

proptest! {
    #[test]
    fn outputs_keep_production_order(chunks in prop::collection::vec("[a-z]{1,6}", 0..12)) {
        let items = chunks.iter().map(|c| stdout(c)).collect();
        let runner = ScriptedRunner::new().with_script("gen", items);
        let mut coordinator = Coordinator::new(runner);
        let mut doc = code_document(&["gen"]);
        let mut cursor = Cursor::new();

        coordinator.execute_cell(&mut doc, &mut cursor, 0).unwrap();
        let ticks = coordinator.run_to_completion(&mut doc, &mut cursor).unwrap();
        prop_assert_eq!(ticks, chunks.len() + 1);

        let produced: Vec<String> = doc.cells()[0]
            .outputs()
            .iter()
            .filter_map(OutputVariant::summary)
            .collect();
        prop_assert_eq!(produced, chunks);
    }
}

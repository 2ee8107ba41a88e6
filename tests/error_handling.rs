use codeplag::{
    extract, CodeplagConfig, CompareConfig, CompareError, ConfigLoadError, CorpusOrchestrator,
    ExtractConfig, IngestError, Language, LoadError, NodeKind, ParseError, RunConfig, RunError,
    SourceUnit, WorkLoader,
};

#[test]
fn invalid_utf8_is_rejected_at_ingest() {
    let err = SourceUnit::from_bytes("bad.py", Language::Py, vec![0xc3, 0x28]).unwrap_err();
    assert!(matches!(err, IngestError::InvalidUtf8(_)));
}

#[test]
fn blank_origin_is_rejected_at_ingest() {
    let err = SourceUnit::new("   ", Language::Py, "x = 1\n").unwrap_err();
    assert_eq!(err, IngestError::MissingOrigin);
}

#[test]
fn parse_errors_carry_origin_and_position() {
    let unit = SourceUnit::new("broken.cpp", Language::Cpp, "int main() {\n  return 0\n").unwrap();
    let err = extract(&unit, &ExtractConfig::default()).unwrap_err();
    assert_eq!(err.origin(), "broken.cpp");
    assert!(matches!(err, ParseError::Syntax { .. }));
    assert!(err.position().is_some());
}

#[test]
fn lenient_extraction_walks_recovered_trees() {
    let unit = SourceUnit::new("broken.py", Language::Py, "x = (1 +\ny = 2\n").unwrap();
    let cfg = ExtractConfig::default().with_reject_syntax_errors(false);
    let features = extract(&unit, &cfg).expect("recovered tree is accepted");
    assert_eq!(features.head_sequence[0], NodeKind::Module);
}

#[test]
fn configuration_errors_abort_before_work() {
    let bad_weights = CompareConfig::default().with_weights(codeplag::MetricWeights {
        operators: 0.0,
        literals: 0.0,
        size: 0.0,
    });
    let err = CorpusOrchestrator::new(ExtractConfig::default(), bad_weights, RunConfig::default())
        .err()
        .expect("zero weights are invalid");
    assert!(matches!(err, RunError::Compare(CompareError::InvalidConfig(_))));

    let module_ignored = ExtractConfig::default().with_ignored(Language::Py, [NodeKind::Module]);
    let err = CorpusOrchestrator::new(module_ignored, CompareConfig::default(), RunConfig::default())
        .err()
        .expect("ignoring the root is invalid");
    assert!(matches!(err, RunError::Extract(_)));
}

#[test]
fn one_to_one_with_unequal_lists_is_refused() {
    let orchestrator = CorpusOrchestrator::new(
        ExtractConfig::default(),
        CompareConfig::default(),
        RunConfig::default(),
    )
    .unwrap();
    let a = SourceUnit::new("a.py", Language::Py, "x = 1\n").unwrap();
    let err = orchestrator.one_to_one(vec![a], Vec::new()).unwrap_err();
    assert_eq!(err, RunError::UnequalLists { first: 1, second: 0 });
}

#[test]
fn oversized_pairs_are_reported_not_dropped() {
    let orchestrator = CorpusOrchestrator::new(
        ExtractConfig::default(),
        CompareConfig::default().with_max_alignment_cells(4),
        RunConfig::default(),
    )
    .unwrap();
    let text = "a = 1\nb = a + 2\nprint(b)\n";
    let outcome = orchestrator.many_to_many(vec![
        SourceUnit::new("a.py", Language::Py, text).unwrap(),
        SourceUnit::new("b.py", Language::Py, text).unwrap(),
    ]);

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].precise_metric, None);
    assert_eq!(outcome.skipped_pairs.len(), 1);
    assert_eq!(outcome.skipped_pairs[0].first, "a.py");
    assert!(outcome.skipped_pairs[0].reason.contains("alignment"));
}

#[test]
fn malformed_yaml_is_a_load_error() {
    let err = CodeplagConfig::from_yaml("compare: [unclosed").unwrap_err();
    assert!(matches!(err, ConfigLoadError::YamlParse(_)));
}

#[test]
fn unknown_node_kind_in_ignore_list_is_a_load_error() {
    let yaml = "version: \"1.0\"\nextract:\n  python_ignore: [not_a_kind]\n";
    assert!(matches!(
        CodeplagConfig::from_yaml(yaml),
        Err(ConfigLoadError::YamlParse(_))
    ));
}

#[test]
fn missing_directory_is_fatal_for_the_loader() {
    let dir = tempfile::tempdir().unwrap();
    let err: LoadError = WorkLoader::new(Language::Cpp)
        .directory(dir.path().join("absent"))
        .find_map(Result::err)
        .expect("walk error");
    assert!(err.is_fatal());
}

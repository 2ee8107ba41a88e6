use std::collections::HashSet;
use std::fs;

use codeplag::{
    CompareConfig, CorpusOrchestrator, ExtractConfig, Language, Mode, ReportBuilder, ReportWriter,
    RunConfig, SourceUnit, WorkLoader, WorksReport,
};

fn py(origin: &str, text: &str) -> SourceUnit {
    SourceUnit::new(origin, Language::Py, text).expect("unit")
}

fn cpp(origin: &str, text: &str) -> SourceUnit {
    SourceUnit::new(origin, Language::Cpp, text).expect("unit")
}

fn orchestrator(run: RunConfig) -> CorpusOrchestrator {
    CorpusOrchestrator::new(ExtractConfig::default(), CompareConfig::default(), run)
        .expect("orchestrator")
}

#[test]
fn many_to_many_covers_every_unordered_pair_once() {
    let units: Vec<SourceUnit> = (0..7)
        .map(|i| py(&format!("w{i}.py"), &format!("x = {i}\nprint(x * {i})\n")))
        .collect();
    let outcome = orchestrator(RunConfig::default().with_workers(3)).many_to_many(units);

    assert_eq!(outcome.results.len(), 7 * 6 / 2);
    let mut seen = HashSet::new();
    for result in &outcome.results {
        assert_ne!(result.first, result.second);
        let key = if result.first < result.second {
            (result.first.clone(), result.second.clone())
        } else {
            (result.second.clone(), result.first.clone())
        };
        assert!(seen.insert(key), "pair repeated");
    }
}

#[test]
fn one_to_one_pairs_corresponding_elements() {
    let submissions = vec![
        py("new/a.py", "def f(n):\n    return n + 1\n"),
        py("new/b.py", "for i in range(3):\n    print(i)\n"),
    ];
    let references = vec![
        py("ref/a.py", "def g(m):\n    return m + 1\n"),
        py("ref/b.py", "class C:\n    pass\n"),
    ];
    let outcome = orchestrator(RunConfig::default().with_mode(Mode::OneToOne))
        .one_to_one(submissions, references)
        .expect("equal lengths");

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results[0].first, "new/a.py");
    assert_eq!(outcome.results[0].second, "ref/a.py");
    assert_eq!(outcome.results[1].first, "new/b.py");
    assert_eq!(outcome.results[1].second, "ref/b.py");
    assert!(outcome.results[0].matched);
    assert_eq!(outcome.results[0].precise_metric, Some(1.0));
}

#[test]
fn loop_rewrite_is_flagged_by_the_precise_tier() {
    let original = py(
        "orig.py",
        "def total(n):\n    s = 0\n    for i in range(n):\n        s += i\n    return s\n",
    );
    let rewritten = py(
        "copy.py",
        "def total(n):\n    s = 0\n    i = 0\n    while i < n:\n        s += i\n        i += 1\n    return s\n",
    );
    let outcome = orchestrator(RunConfig::default()).many_to_many(vec![original, rewritten]);
    let result = &outcome.results[0];
    let precise = result.precise_metric.expect("escalated past the prefilter");
    assert!(precise > result.fast_metric);
    assert!(!result.matched_fragments.is_empty());
}

#[test]
fn cpp_corpus_end_to_end() {
    let a = cpp(
        "a.cpp",
        "#include <iostream>\nusing namespace std;\nint main() {\n  int s = 0;\n  for (int i = 0; i < 10; i++) {\n    s += i;\n  }\n  cout << s;\n  return 0;\n}\n",
    );
    let b = cpp(
        "b.cpp",
        "#include <cstdio>\nint main() {\n  int total = 0;\n  for (int k = 0; k < 10; k++) {\n    total += k;\n  }\n  cout << total;\n  return 0;\n}\n",
    );
    let c = cpp(
        "c.cpp",
        "struct Point { int x; int y; };\ndouble norm(Point p) { return p.x * p.x + p.y * p.y; }\n",
    );
    let outcome = orchestrator(RunConfig::default()).many_to_many(vec![a, b, c]);
    assert_eq!(outcome.results.len(), 3);

    let ab = outcome
        .results
        .iter()
        .find(|r| r.first == "a.cpp" && r.second == "b.cpp")
        .expect("a/b pair");
    assert_eq!(ab.fast_metric, 1.0);
    assert!(ab.matched);
}

#[test]
fn reports_from_loaded_directory_carry_every_field() {
    let src = tempfile::tempdir().expect("tempdir");
    fs::write(src.path().join("a.py"), "x = 1\nprint(x + 1)\n").expect("write");
    fs::write(src.path().join("b.py"), "y = 1\nprint(y + 1)\n").expect("write");
    fs::write(src.path().join("broken.py"), "def (:\n").expect("write");
    fs::write(src.path().join("readme.md"), "# not code\n").expect("write");

    let units: Vec<SourceUnit> = WorkLoader::new(Language::Py)
        .directory(src.path())
        .collect::<Result<_, _>>()
        .expect("load");
    assert_eq!(units.len(), 3);

    let compare = CompareConfig::default();
    let outcome = orchestrator(RunConfig::default()).many_to_many(units);
    let builder = ReportBuilder::new(&compare, outcome.mode);
    let reports = builder.build_all(&outcome);
    assert_eq!(reports.len(), 1);

    let out = tempfile::tempdir().expect("tempdir");
    let writer = ReportWriter::new(out.path().join("reports")).expect("writer");
    assert_eq!(writer.write_all(&reports).expect("write reports"), 1);
    let path = writer.dir().join(ReportWriter::file_name(
        &reports[0].first_path,
        &reports[0].second_path,
    ));
    let summary_path = builder
        .summary(&outcome)
        .save(out.path().join("summary.json"))
        .expect("write summary");

    for entry in fs::read_dir(writer.dir()).expect("list reports") {
        let bytes = fs::read(entry.expect("entry").path()).expect("read");
        let decoded: WorksReport = serde_json::from_slice(&bytes).expect("only pair reports");
        assert_eq!(decoded.threshold, 65);
    }

    let report: WorksReport =
        serde_json::from_slice(&fs::read(&path).expect("read")).expect("decode report");
    assert_eq!(report.threshold, 65);
    assert_eq!(report.mode, Mode::ManyToMany);
    assert!(!report.first_heads.is_empty());
    assert_eq!(report.first_heads, report.second_heads);

    let summary: serde_json::Value =
        serde_json::from_slice(&fs::read(summary_path).expect("read")).expect("decode summary");
    assert_eq!(summary["planned_pairs"], 3);
    assert_eq!(summary["compared_pairs"], 1);
    let skipped = summary["skipped_units"].as_array().expect("array");
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0]["origin"]
        .as_str()
        .expect("origin")
        .ends_with("broken.py"));
    assert!(!skipped[0]["reason"].as_str().expect("reason").is_empty());
}

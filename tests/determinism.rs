use std::fs;
use std::path::Path;

use codeplag::{
    extract, CompareConfig, CorpusOrchestrator, ExtractConfig, Language, ReportBuilder,
    ReportWriter, RunConfig, SourceUnit,
};

const WORKS: &[(&str, &str)] = &[
    (
        "w1.py",
        "def area(w, h):\n    return w * h\n\nprint(area(2, 3))\n",
    ),
    (
        "w2.py",
        "def surface(a, b):\n    return a * b\n\nprint(surface(4, 5))\n",
    ),
    (
        "w3.py",
        "total = 0\nfor i in range(10):\n    if i % 2 == 0:\n        total += i\nprint(total)\n",
    ),
    (
        "w4.py",
        "acc = 0\ni = 0\nwhile i < 10:\n    if i % 2 == 0:\n        acc += i\n    i += 1\nprint(acc)\n",
    ),
    (
        "w5.py",
        "class Stack:\n    def __init__(self):\n        self.items = []\n\n    def push(self, x):\n        self.items.append(x)\n",
    ),
];

fn corpus(reverse: bool) -> Vec<SourceUnit> {
    let mut units: Vec<SourceUnit> = WORKS
        .iter()
        .map(|(origin, text)| SourceUnit::new(*origin, Language::Py, *text).expect("unit"))
        .collect();
    if reverse {
        units.reverse();
    }
    units
}

fn run_into(dir: &Path, units: Vec<SourceUnit>, workers: usize) {
    let compare = CompareConfig::default();
    let orchestrator = CorpusOrchestrator::new(
        ExtractConfig::default(),
        compare.clone(),
        RunConfig::default().with_workers(workers),
    )
    .expect("orchestrator");
    let outcome = orchestrator.many_to_many(units);
    let builder = ReportBuilder::new(&compare, outcome.mode);
    let writer = ReportWriter::new(dir).expect("writer");
    writer
        .write_all(&builder.build_all(&outcome))
        .expect("reports");
}

fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = fs::read_dir(dir)
        .expect("read reports dir")
        .map(|entry| {
            let entry = entry.expect("entry");
            (
                entry.file_name().to_string_lossy().into_owned(),
                fs::read(entry.path()).expect("read report"),
            )
        })
        .collect();
    files.sort();
    files
}

#[test]
fn repeated_runs_write_byte_identical_reports() {
    let first = tempfile::tempdir().expect("tempdir");
    let second = tempfile::tempdir().expect("tempdir");

    run_into(first.path(), corpus(false), 1);
    run_into(second.path(), corpus(true), 4);

    let a = snapshot(first.path());
    let b = snapshot(second.path());
    // one record per pair of the five works
    assert_eq!(a.len(), 10);
    assert_eq!(a, b);
}

#[test]
fn results_follow_plan_order_regardless_of_workers() {
    let run = |workers| {
        CorpusOrchestrator::new(
            ExtractConfig::default(),
            CompareConfig::default(),
            RunConfig::default().with_workers(workers),
        )
        .expect("orchestrator")
        .many_to_many(corpus(false))
        .results
    };
    let serial = run(1);
    let parallel = run(8);
    assert_eq!(serial, parallel);

    let keys: Vec<(String, String)> = serial
        .iter()
        .map(|r| (r.first.clone(), r.second.clone()))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn renamed_and_reformatted_work_extracts_identically() {
    let original = SourceUnit::new(
        "orig.py",
        Language::Py,
        "def area(w, h):\n    return w * h\n\nprint(area(2, 3))\n",
    )
    .expect("unit");
    let disguised = SourceUnit::new(
        "copy.py",
        Language::Py,
        "# compute it\ndef   surface( x,y ):\n\n    return x*y\nprint( surface(2,3) )\n",
    )
    .expect("unit");

    let cfg = ExtractConfig::default();
    let a = extract(&original, &cfg).expect("features");
    let b = extract(&disguised, &cfg).expect("features");
    assert_eq!(a, b);
}

//! Filesystem acquisition of works.
//!
//! [`WorkLoader`] is a pull-based iterator: nothing is read until `next()` is
//! called, so `loader.take(n)` touches at most `n` matching files. Directory
//! traversal is iterative and sorted by file name, which keeps the order of
//! produced units stable across machines.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ingest::{ingest_bytes, IngestError, Language, SourceUnit};
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("directory traversal failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{path}: {source}")]
    Ingest {
        path: PathBuf,
        #[source]
        source: IngestError,
    },
    #[error("{path} does not have a {language} extension")]
    ExtensionMismatch { path: PathBuf, language: Language },
    #[error("invalid file name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl LoadError {
    /// Fatal errors mean a requested input cannot be acquired at all; the
    /// rest only lose a single file.
    pub fn is_fatal(&self) -> bool {
        match self {
            LoadError::InvalidPattern(_) => true,
            LoadError::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            LoadError::Walk(err) => err.depth() == 0,
            LoadError::Ingest { .. } | LoadError::ExtensionMismatch { .. } => false,
        }
    }

    /// The file or directory the error is about, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Ingest { path, .. }
            | LoadError::ExtensionMismatch { path, .. } => Some(path),
            LoadError::Walk(err) => err.path(),
            LoadError::InvalidPattern(_) => None,
        }
    }
}

enum Source {
    Files(Vec<PathBuf>),
    Directory(PathBuf),
}

enum Cursor {
    Files(std::vec::IntoIter<PathBuf>),
    Walk(walkdir::IntoIter),
}

/// Lazy iterator of [`SourceUnit`]s from explicit files and directories.
pub struct WorkLoader {
    language: Language,
    pattern: Option<Regex>,
    sources: VecDeque<Source>,
    cursor: Option<Cursor>,
}

impl WorkLoader {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            pattern: None,
            sources: VecDeque::new(),
            cursor: None,
        }
    }

    /// Queue explicit files. Each must carry one of the language's extensions.
    pub fn files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        if !paths.is_empty() {
            self.sources.push_back(Source::Files(paths));
        }
        self
    }

    /// Queue a directory; matching files anywhere below it are loaded.
    pub fn directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push_back(Source::Directory(path.into()));
        self
    }

    pub fn directories<I, P>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths.into_iter().fold(self, |loader, path| loader.directory(path))
    }

    /// Only load files whose name matches `pattern`.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, LoadError> {
        self.pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    fn name_matches(&self, path: &Path) -> bool {
        let Some(pattern) = &self.pattern else {
            return true;
        };
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| pattern.is_match(name))
    }

    fn load(&self, path: &Path) -> Result<SourceUnit, LoadError> {
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ingest_bytes(path.display().to_string(), self.language, bytes).map_err(|source| {
            LoadError::Ingest {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    fn open(&self, source: Source) -> Cursor {
        match source {
            Source::Files(paths) => {
                info!("Getting works features from files");
                Cursor::Files(paths.into_iter())
            }
            Source::Directory(root) => {
                info!("Getting works features from {}", root.display());
                Cursor::Walk(WalkDir::new(root).sort_by_file_name().into_iter())
            }
        }
    }
}

impl Iterator for WorkLoader {
    type Item = Result<SourceUnit, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(cursor) = self.cursor.as_mut() {
                match cursor {
                    Cursor::Files(paths) => {
                        if let Some(path) = paths.next() {
                            if !self.language.matches_path(&path) {
                                return Some(Err(LoadError::ExtensionMismatch {
                                    path,
                                    language: self.language,
                                }));
                            }
                            if !self.name_matches(&path) {
                                debug!(path = %path.display(), "file_filtered");
                                continue;
                            }
                            return Some(self.load(&path));
                        }
                    }
                    Cursor::Walk(entries) => match entries.next() {
                        Some(Ok(entry)) => {
                            let path = entry.path();
                            if entry.file_type().is_file()
                                && self.language.matches_path(path)
                                && self.name_matches(path)
                            {
                                return Some(self.load(path));
                            }
                            continue;
                        }
                        Some(Err(err)) => return Some(Err(LoadError::Walk(err))),
                        None => {}
                    },
                }
                self.cursor = None;
            }

            let source = self.sources.pop_front()?;
            self.cursor = Some(self.open(source));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str, text: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn directory_walk_is_sorted_and_filtered_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.cpp", "int main() {}\n");
        write(dir.path(), "a.c", "int f() { return 1; }\n");
        write(dir.path(), "nested/c.h", "int g();\n");
        write(dir.path(), "notes.txt", "not code\n");
        write(dir.path(), "script.py", "print(1)\n");

        let units: Vec<SourceUnit> = WorkLoader::new(Language::Cpp)
            .directory(dir.path())
            .collect::<Result<_, _>>()
            .unwrap();
        let names: Vec<String> = units
            .iter()
            .map(|u| Path::new(u.origin()).file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.c", "b.cpp", "c.h"]);
        assert!(units.iter().all(|u| u.language() == Language::Cpp));
    }

    #[test]
    fn pattern_filters_file_names() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lab1_alice.py", "x = 1\n");
        write(dir.path(), "lab1_bob.py", "x = 2\n");
        write(dir.path(), "lab2_alice.py", "x = 3\n");

        let units: Vec<SourceUnit> = WorkLoader::new(Language::Py)
            .directory(dir.path())
            .with_pattern(r"^lab1_")
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(units.len(), 2);
        assert!(units.iter().all(|u| u.origin().contains("lab1_")));
    }

    #[test]
    fn loading_is_lazy() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            write(dir.path(), &format!("w{i}.py"), "pass\n");
        }
        let mut loader = WorkLoader::new(Language::Py).directory(dir.path());
        let first: Vec<_> = loader.by_ref().take(2).collect();
        assert_eq!(first.len(), 2);
        // the rest is still there for a later pull
        assert_eq!(loader.count(), 3);
    }

    #[test]
    fn explicit_files_keep_their_order() {
        let dir = tempfile::tempdir().unwrap();
        let b = write(dir.path(), "b.py", "y = 2\n");
        let a = write(dir.path(), "a.py", "x = 1\n");
        let origins: Vec<String> = WorkLoader::new(Language::Py)
            .files([&b, &a])
            .map(|unit| unit.unwrap().origin().to_string())
            .collect();
        assert_eq!(origins, vec![b.display().to_string(), a.display().to_string()]);
    }

    #[test]
    fn per_file_errors_do_not_stop_the_iterator() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "good.py", "x = 1\n");
        let wrong = write(dir.path(), "wrong.cpp", "int x;\n");
        let binary = dir.path().join("binary.py");
        fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();

        let results: Vec<_> = WorkLoader::new(Language::Py)
            .files([&wrong, &binary, &good])
            .collect();
        assert_eq!(results.len(), 3);
        let mismatch = results[0].as_ref().unwrap_err();
        assert!(matches!(mismatch, LoadError::ExtensionMismatch { .. }));
        assert_eq!(mismatch.path(), Some(wrong.as_path()));
        assert!(!mismatch.is_fatal());
        assert!(matches!(
            results[1].as_ref().unwrap_err(),
            LoadError::Ingest {
                source: IngestError::InvalidUtf8(_),
                ..
            }
        ));
        assert!(results[2].is_ok());
    }

    #[test]
    fn missing_inputs_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.py");
        let err = WorkLoader::new(Language::Py)
            .files([&missing])
            .next()
            .unwrap()
            .unwrap_err();
        assert!(err.is_fatal());

        let err = WorkLoader::new(Language::Py)
            .directory(dir.path().join("nowhere"))
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, LoadError::Walk(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn invalid_pattern_is_rejected_up_front() {
        let err = WorkLoader::new(Language::Py).with_pattern("(").err().unwrap();
        assert!(err.is_fatal());
    }
}

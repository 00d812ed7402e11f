// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

/// Runner script that records the node id it was given and fails for any
/// node id containing "fail".
const RECORDER_SCRIPT: &str = r#"#!/bin/sh
last=""
for arg in "$@"; do last="$arg"; done
echo "$PL_RUNNING_SPECIAL_TESTS $last" >> "$RECORD_LOG"
case "$last" in
  *fail*) echo "deliberate failure for $last"; exit 3 ;;
esac
echo "ran $last"
"#;

/// Profiler stand-in that records the full command line it wraps.
const PROFILER_SCRIPT: &str = r#"#!/bin/sh
echo "PROFILE $*" >> "$RECORD_LOG"
"#;

/// A temporary project with a `tests/` tree, runner scripts and a log file.
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = tempdir().expect("Failed to create temporary directory");
        fs::create_dir_all(dir.path().join("tests")).expect("Failed to create tests directory");
        fs::write(dir.path().join("record.sh"), RECORDER_SCRIPT).expect("Failed to write record.sh");
        fs::write(dir.path().join("profile.sh"), PROFILER_SCRIPT).expect("Failed to write profile.sh");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn log_path(&self) -> PathBuf {
        self.path().join("record.log")
    }

    /// Writes a file relative to the project root, creating directories.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Lines recorded by the runner and profiler scripts; empty if nothing ran.
    pub fn recorded(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// The runner command used by the generated configurations.
    pub fn runner(&self) -> String {
        format!(
            "sh {} --source pkg --append -m pytest --verbose --capture=no",
            self.path().join("record.sh").display()
        )
    }

    /// Writes `SpecialTests.toml` using the recorder scripts. `extra` is
    /// appended verbatim before the `[env]` table.
    pub fn write_config(&self, extra: &str, with_profile: bool) -> PathBuf {
        let profile = if with_profile {
            format!(
                "\n[profile]\nwrapper = '{}'\ntarget = 'tests/test_profiler.py::test_nested_emit_nvtx'\n",
                format!("sh {}", self.path().join("profile.sh").display())
            )
        } else {
            String::new()
        };
        let content = format!(
            r#"language = "en"
roots = ["tests"]
marker = "special=True"
runner = '{runner}'
{extra}

[env]
PL_RUNNING_SPECIAL_TESTS = "1"
RECORD_LOG = '{log}'
{profile}"#,
            runner = self.runner(),
            extra = extra,
            log = self.log_path().display(),
            profile = profile,
        );
        let path = self.path().join("SpecialTests.toml");
        fs::write(&path, content).expect("Failed to write config");
        path
    }
}

/// A test module with one special test and one regular test.
pub fn special_module(test_name: &str) -> String {
    format!(
        r#"import pytest
from tests.helpers.runif import RunIf


@RunIf(min_gpus=2, special=True)
def {test_name}(tmpdir):
    assert True


def test_regular(tmpdir):
    assert True
"#
    )
}

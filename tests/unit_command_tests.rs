//! # Command Module Unit Tests / Command 模块单元测试
//!
//! Tests for `CommandLine` parsing and composition and for `spawn_and_stream`.
//!
//! `CommandLine` 解析与组合以及 `spawn_and_stream` 的测试。

use special_runner::infra::command::{CommandLine, spawn_and_stream};
use std::collections::BTreeMap;
use tokio::process::Command;

#[cfg(test)]
mod command_line_tests {
    use super::*;

    #[test]
    fn test_parse_splits_with_shell_quoting() {
        let line = CommandLine::parse(r#"python -m pytest -k "not slow" --capture=no"#).unwrap();
        assert_eq!(line.program, "python");
        assert_eq!(line.args, vec!["-m", "pytest", "-k", "not slow", "--capture=no"]);
    }

    #[test]
    fn test_parse_rejects_empty_command() {
        assert!(CommandLine::parse("   ").is_err());
    }

    #[test]
    fn test_parse_rejects_unbalanced_quotes() {
        assert!(CommandLine::parse(r#"python -c "print(1)"#).is_err());
    }

    #[test]
    fn test_parse_fails_on_undefined_variable() {
        assert!(CommandLine::parse("run $SPECIAL_RUNNER_SURELY_UNDEFINED_VAR_123").is_err());
    }

    #[test]
    fn test_with_arg_appends_node_id() {
        let runner = CommandLine::parse("python -m pytest --verbose").unwrap();
        let line = runner.with_arg("tests/test_a.py::test_alpha");

        assert_eq!(line.args.last().unwrap(), "tests/test_a.py::test_alpha");
        // `runner` itself is left as is.
        assert_eq!(runner.args.len(), 3);
    }

    #[test]
    fn test_wrapped_by_places_wrapper_first() {
        let runner = CommandLine::parse("python -m pytest").unwrap();
        let wrapper = CommandLine::parse("nvprof --profile-from-start off -o trace_name.prof --").unwrap();

        let line = runner.with_arg("tests/test_profiler.py::test_nvtx").wrapped_by(&wrapper);

        assert_eq!(line.program, "nvprof");
        assert_eq!(
            line.args,
            vec![
                "--profile-from-start",
                "off",
                "-o",
                "trace_name.prof",
                "--",
                "python",
                "-m",
                "pytest",
                "tests/test_profiler.py::test_nvtx"
            ]
        );
    }

    #[test]
    fn test_display_quotes_arguments() {
        let line = CommandLine {
            program: "pytest".to_string(),
            args: vec!["-k".to_string(), "not slow".to_string()],
        };
        assert_eq!(line.to_string(), "pytest -k 'not slow'");
    }
}

#[cfg(test)]
mod spawn_and_stream_tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout_and_stderr() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo to-stdout; echo to-stderr 1>&2");

        let (status, output) = spawn_and_stream(cmd).await;

        assert!(status.unwrap().success());
        assert!(output.contains("to-stdout"));
        assert!(output.contains("to-stderr"));
    }

    #[tokio::test]
    async fn test_reports_exit_code() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo before; exit 4");

        let (status, output) = spawn_and_stream(cmd).await;

        assert_eq!(status.unwrap().code(), Some(4));
        assert!(output.contains("before"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_output_is_captured_lossily() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(r"printf 'bad \377 byte\nafter the bad line\n'");

        let (status, output) = spawn_and_stream(cmd).await;

        assert!(status.unwrap().success());
        assert!(output.contains("bad \u{FFFD} byte"));
        assert!(output.contains("after the bad line"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_does_not_close_the_pipe() {
        // Enough output after the bad byte to block on a closed or full pipe.
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(r"printf '\377\n'; yes x | head -c 300000; echo; echo done");

        let (status, output) = spawn_and_stream(cmd).await;

        assert_eq!(status.unwrap().code(), Some(0));
        assert!(output.ends_with("done\n"));
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let cmd = Command::new("this_command_definitely_does_not_exist_12345");
        let (status, output) = spawn_and_stream(cmd).await;

        assert!(status.is_err());
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_to_command_applies_env_and_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let line = CommandLine {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "echo \"flag=$SPECIAL_FLAG\"; pwd".to_string()],
        };
        let env = BTreeMap::from([("SPECIAL_FLAG".to_string(), "1".to_string())]);

        let (status, output) = spawn_and_stream(line.to_command(dir.path(), &env)).await;

        assert!(status.unwrap().success());
        assert!(output.contains("flag=1"));
        let dir_name = dir.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(output.contains(&dir_name));
    }
}

//! # Discovery Module Unit Tests / Discovery 模块单元测试
//!
//! Tests for marker matching, definition scanning, name derivation and the
//! marker-scan and registry test sources.
//!
//! 标记匹配、定义扫描、名称推导以及标记扫描和注册表测试来源的测试。

mod common;

use common::{TestProject, special_module};
use special_runner::config::{DefinitionPattern, RegisteredTest, SpecialTestConfig};
use special_runner::core::{MarkerScan, TaggedRegistry, TestSource};
use special_runner::discovery::{derive_test_name, find_definition, marker_lines, marker_regex};
use std::path::PathBuf;

fn scan_config() -> SpecialTestConfig {
    SpecialTestConfig {
        extensions: vec![],
        runner: "true".to_string(),
        ..SpecialTestConfig::default()
    }
}

#[cfg(test)]
mod marker_tests {
    use super::*;

    #[test]
    fn test_marker_matches_whole_word_only() {
        let marker = marker_regex("special=True").unwrap();

        assert!(marker.is_match("@RunIf(special=True)"));
        assert!(marker.is_match("special=True"));
        assert!(marker.is_match("    pytest.param(1, marks=RunIf(min_gpus=2, special=True)),"));
        assert!(!marker.is_match("@RunIf(not_special=True)"));
        assert!(!marker.is_match("@RunIf(special=Truefully)"));
        assert!(!marker.is_match("@RunIf(special=False)"));
    }

    #[test]
    fn test_marker_is_escaped() {
        let marker = marker_regex("a.b").unwrap();
        assert!(marker.is_match("x a.b y"));
        assert!(!marker.is_match("x axb y"));
    }

    #[test]
    fn test_marker_lines_are_one_based_and_ordered() {
        let marker = marker_regex("special=True").unwrap();
        let content = "import x\n@RunIf(special=True)\ndef test_a():\n    pass\n@RunIf(special=True)\ndef test_b():\n";
        assert_eq!(marker_lines(content, &marker), vec![2, 5]);
    }

    #[test]
    fn test_marker_lines_empty_when_absent() {
        let marker = marker_regex("special=True").unwrap();
        assert!(marker_lines("def test_a():\n    pass\n", &marker).is_empty());
    }
}

#[cfg(test)]
mod definition_tests {
    use super::*;

    #[test]
    fn test_derive_name_strips_prefix_and_parameters() {
        let pattern = DefinitionPattern::default();
        let (function, name) = derive_test_name("def test_foo(tmpdir, x=1):", &pattern).unwrap();
        assert_eq!(function, "test_foo");
        assert_eq!(name, "foo");
    }

    #[test]
    fn test_derive_name_ignores_indentation() {
        let pattern = DefinitionPattern::default();
        let (function, _) = derive_test_name("    def test_method(self):", &pattern).unwrap();
        assert_eq!(function, "test_method");
    }

    #[test]
    fn test_derive_name_without_delimiter_keeps_rest() {
        let pattern = DefinitionPattern::default();
        let (function, name) = derive_test_name("def test_split_over_lines", &pattern).unwrap();
        assert_eq!(function, "test_split_over_lines");
        assert_eq!(name, "split_over_lines");
    }

    #[test]
    fn test_non_test_definitions_are_rejected() {
        let pattern = DefinitionPattern::default();
        assert!(derive_test_name("def helper(x):", &pattern).is_none());
        assert!(derive_test_name("class TestThing:", &pattern).is_none());
        assert!(derive_test_name("# def test_commented(x):", &pattern).is_none());
    }

    #[test]
    fn test_custom_pattern() {
        let pattern = DefinitionPattern {
            keyword: "fn ".to_string(),
            test_prefix: "it_".to_string(),
            delimiter: "(".to_string(),
        };
        let (function, name) = derive_test_name("fn it_works() {", &pattern).unwrap();
        assert_eq!(function, "it_works");
        assert_eq!(name, "works");
    }

    #[test]
    fn test_definition_three_lines_after_marker() {
        let content = "\
import pytest
@RunIf(special=True)
@pytest.mark.parametrize('x', [1, 2])
@pytest.mark.skipif(False, reason='')
def test_foo(x):
    assert x
";
        let (line, function, name) =
            find_definition(content, 2, &DefinitionPattern::default()).unwrap();
        assert_eq!(line, 5);
        assert_eq!(function, "test_foo");
        assert_eq!(name, "foo");
    }

    #[test]
    fn test_first_definition_wins() {
        let content = "@RunIf(special=True)\ndef test_first():\n    pass\ndef test_second():\n    pass\n";
        let (line, function, _) =
            find_definition(content, 1, &DefinitionPattern::default()).unwrap();
        assert_eq!(line, 2);
        assert_eq!(function, "test_first");
    }

    #[test]
    fn test_definitions_before_marker_are_ignored() {
        let content = "def test_before():\n    pass\n@RunIf(special=True)\ndef test_after():\n";
        let (_, function, _) = find_definition(content, 3, &DefinitionPattern::default()).unwrap();
        assert_eq!(function, "test_after");
    }

    #[test]
    fn test_no_definition_after_marker() {
        let content = "def test_before():\n    pass\nMARKERS = dict(special=True)\n";
        assert!(find_definition(content, 3, &DefinitionPattern::default()).is_none());
    }
}

#[cfg(test)]
mod marker_scan_tests {
    use super::*;

    #[test]
    fn test_scan_orders_by_file_then_line() {
        let project = TestProject::new();
        project.write("tests/test_b.py", &special_module("test_beta"));
        project.write("tests/test_a.py", &special_module("test_alpha"));
        project.write(
            "tests/models/test_c.py",
            "@RunIf(special=True)\ndef test_gamma():\n    pass\n\n@RunIf(special=True)\ndef test_delta():\n    pass\n",
        );

        let config = scan_config();
        let scan = MarkerScan::new(project.path(), &config).unwrap();
        let tests = scan.discover().unwrap();

        let ids: Vec<String> = tests.iter().map(|t| t.node_id()).collect();
        assert_eq!(
            ids,
            vec![
                "tests/models/test_c.py::test_gamma",
                "tests/models/test_c.py::test_delta",
                "tests/test_a.py::test_alpha",
                "tests/test_b.py::test_beta",
            ]
        );
        assert_eq!(tests[0].marker_line, Some(1));
        assert_eq!(tests[1].marker_line, Some(5));
        assert_eq!(tests[2].name, "alpha");
    }

    #[test]
    fn test_marker_matches_are_relative_to_project() {
        let project = TestProject::new();
        project.write("tests/test_a.py", &special_module("test_alpha"));

        let config = scan_config();
        let scan = MarkerScan::new(project.path(), &config).unwrap();
        let matches = scan.marker_matches().unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].file, PathBuf::from("tests/test_a.py"));
        assert_eq!(matches[0].line, 5);
    }

    #[test]
    fn test_marker_without_definition_yields_nothing() {
        let project = TestProject::new();
        project.write("tests/conftest.py", "SPECIAL = dict(special=True)\n");

        let config = scan_config();
        let scan = MarkerScan::new(project.path(), &config).unwrap();

        assert_eq!(scan.marker_matches().unwrap().len(), 1);
        assert!(scan.discover().unwrap().is_empty());
    }

    #[test]
    fn test_extension_filter() {
        let project = TestProject::new();
        project.write("tests/test_a.py", &special_module("test_alpha"));
        project.write("tests/notes.txt", &special_module("test_from_notes"));

        let mut config = scan_config();
        config.extensions = vec!["py".to_string()];
        let scan = MarkerScan::new(project.path(), &config).unwrap();
        let tests = scan.discover().unwrap();

        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].function, "test_alpha");
    }

    #[test]
    fn test_invalid_utf8_source_is_still_scanned() {
        let project = TestProject::new();
        std::fs::write(
            project.path().join("tests/test_latin1.py"),
            b"# caf\xe9 \xff\xfe\n@RunIf(special=True)\ndef test_latin1_module(tmpdir):\n    assert True\n",
        )
        .unwrap();

        let config = scan_config();
        let scan = MarkerScan::new(project.path(), &config).unwrap();
        let tests = scan.discover().unwrap();

        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].function, "test_latin1_module");
        assert_eq!(tests[0].marker_line, Some(2));
        assert_eq!(tests[0].definition_line, Some(3));
    }

    #[test]
    fn test_extensions_default_to_python_sources() {
        let config: SpecialTestConfig = toml::from_str(r#"runner = "true""#).unwrap();
        let project = TestProject::new();
        project.write("tests/test_a.py", &special_module("test_alpha"));
        project.write("tests/test_a.pyc", &special_module("test_compiled"));

        let scan = MarkerScan::new(project.path(), &config).unwrap();
        let functions: Vec<String> =
            scan.discover().unwrap().into_iter().map(|t| t.function).collect();

        assert_eq!(functions, vec!["test_alpha"]);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let project = TestProject::new();
        let mut config = scan_config();
        config.roots = vec![PathBuf::from("does_not_exist")];

        let scan = MarkerScan::new(project.path(), &config).unwrap();
        assert!(scan.discover().unwrap().is_empty());
    }

    #[test]
    fn test_roots_are_scanned_in_configured_order() {
        let project = TestProject::new();
        project.write("tests/test_a.py", &special_module("test_alpha"));
        project.write("benchmarks/test_speed.py", &special_module("test_speed"));

        let mut config = scan_config();
        config.roots = vec![PathBuf::from("tests"), PathBuf::from("benchmarks")];
        let scan = MarkerScan::new(project.path(), &config).unwrap();
        let functions: Vec<String> =
            scan.discover().unwrap().into_iter().map(|t| t.function).collect();

        assert_eq!(functions, vec!["test_alpha", "test_speed"]);
    }
}

#[cfg(test)]
mod registry_tests {
    use super::*;

    #[test]
    fn test_registry_selects_tagged_entries_in_order() {
        let mut config = scan_config();
        config.registry = vec![
            RegisteredTest {
                file: PathBuf::from("tests/test_ddp.py"),
                name: "test_ddp_spawn".to_string(),
                tags: vec!["special".to_string(), "gpu".to_string()],
            },
            RegisteredTest {
                file: PathBuf::from("tests/test_cpu.py"),
                name: "test_cpu_only".to_string(),
                tags: vec![],
            },
            RegisteredTest {
                file: PathBuf::from("tests/test_amp.py"),
                name: "test_amp".to_string(),
                tags: vec!["special".to_string()],
            },
        ];

        let tests = TaggedRegistry::new(&config).discover().unwrap();

        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].node_id(), "tests/test_ddp.py::test_ddp_spawn");
        assert_eq!(tests[0].name, "ddp_spawn");
        assert_eq!(tests[0].marker_line, None);
        assert_eq!(tests[1].function, "test_amp");
    }

    #[test]
    fn test_registry_uses_configured_tag() {
        let mut config = scan_config();
        config.isolation_tag = "isolated".to_string();
        config.registry = vec![RegisteredTest {
            file: PathBuf::from("tests/test_ddp.py"),
            name: "test_ddp_spawn".to_string(),
            tags: vec!["special".to_string()],
        }];

        assert!(TaggedRegistry::new(&config).discover().unwrap().is_empty());
    }

    #[test]
    fn test_registry_rejects_empty_names() {
        let mut config = scan_config();
        config.registry = vec![RegisteredTest {
            file: PathBuf::from("tests/test_ddp.py"),
            name: "  ".to_string(),
            tags: vec!["special".to_string()],
        }];

        assert!(TaggedRegistry::new(&config).discover().is_err());
    }
}

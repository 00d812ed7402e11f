//! # Test Registry Module / 测试注册表模块
//!
//! A structured alternative to marker scanning: tests are declared in the
//! configuration with capability tags, and the runner selects the ones tagged
//! as needing isolation.
//!
//! 标记扫描的结构化替代方案：测试在配置中带有能力标签声明，
//! 运行器选择被标记为需要隔离的测试。

use anyhow::{Result, bail};

use crate::core::config::{DefinitionPattern, RegisteredTest, SpecialTestConfig};
use crate::core::discovery::TestSource;
use crate::core::models::DiscoveredTest;

/// Selects registry entries carrying a given tag, in declaration order.
#[derive(Debug)]
pub struct TaggedRegistry<'a> {
    entries: &'a [RegisteredTest],
    tag: &'a str,
    pattern: &'a DefinitionPattern,
}

impl<'a> TaggedRegistry<'a> {
    pub fn new(config: &'a SpecialTestConfig) -> Self {
        Self {
            entries: &config.registry,
            tag: &config.isolation_tag,
            pattern: &config.definition,
        }
    }
}

impl TestSource for TaggedRegistry<'_> {
    fn discover(&self) -> Result<Vec<DiscoveredTest>> {
        let mut tests = Vec::new();
        for entry in self.entries.iter().filter(|e| e.tags.iter().any(|t| t == self.tag)) {
            if entry.name.trim().is_empty() {
                bail!("Registry entry for '{}' has an empty name", entry.file.display());
            }
            let name = entry
                .name
                .strip_prefix(self.pattern.test_prefix.as_str())
                .unwrap_or(&entry.name)
                .to_string();
            tests.push(DiscoveredTest {
                file: entry.file.clone(),
                marker_line: None,
                definition_line: None,
                function: entry.name.clone(),
                name,
            });
        }
        Ok(tests)
    }
}

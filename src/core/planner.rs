//! # Test Execution Planner Module / 测试执行计划模块
//!
//! Decides, for every discovered test, whether it runs or is skipped because
//! of the blocklist or the name filter. Discovery order is kept.
//!
//! 为每个发现的测试决定是运行还是因阻止列表或名称过滤器而跳过。
//! 保持发现顺序。

use crate::core::config::Blocklist;
use crate::core::models::{DiscoveredTest, SkipReason};

/// What to do with a single discovered test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    Run,
    Skip(SkipReason),
}

#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub test: DiscoveredTest,
    pub action: PlannedAction,
}

/// Represents a complete execution plan.
/// 表示完整的执行计划。
#[derive(Debug, Default)]
pub struct ExecutionPlan {
    /// Every discovered test, in discovery order.
    /// 每个发现的测试，按发现顺序排列。
    pub entries: Vec<PlanEntry>,
}

impl ExecutionPlan {
    pub fn to_run(&self) -> impl Iterator<Item = &DiscoveredTest> {
        self.entries
            .iter()
            .filter(|e| e.action == PlannedAction::Run)
            .map(|e| &e.test)
    }

    pub fn run_count(&self) -> usize {
        self.to_run().count()
    }

    pub fn skipped_count(&self, reason: SkipReason) -> usize {
        self.entries
            .iter()
            .filter(|e| e.action == PlannedAction::Skip(reason))
            .count()
    }
}

/// Checks the blocklist against both the test name and the function identifier.
pub fn is_blocklisted(test: &DiscoveredTest, blocklist: &Blocklist) -> bool {
    blocklist.contains(&test.name) || blocklist.contains(&test.function)
}

/// Creates an execution plan for the discovered tests.
///
/// # Arguments
/// * `tests` - Discovered tests, in discovery order
/// * `blocklist` - Names that never run
/// * `filter` - Optional substring the function identifier must contain
pub fn plan_execution(
    tests: Vec<DiscoveredTest>,
    blocklist: &Blocklist,
    filter: Option<&str>,
) -> ExecutionPlan {
    let entries = tests
        .into_iter()
        .map(|test| {
            let action = if is_blocklisted(&test, blocklist) {
                PlannedAction::Skip(SkipReason::Blocklisted)
            } else if filter.is_some_and(|pattern| !test.function.contains(pattern)) {
                PlannedAction::Skip(SkipReason::Filtered)
            } else {
                PlannedAction::Run
            };
            PlanEntry { test, action }
        })
        .collect();

    ExecutionPlan { entries }
}

//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Special Runner,
//! including data models, configuration, test discovery, planning and execution.
//!
//! 此模块包含 Special Runner 的核心功能，
//! 包括数据模型、配置、测试发现、计划和执行逻辑。

pub mod config;
pub mod discovery;
pub mod execution;
pub mod models;
pub mod planner;
pub mod registry;

// Re-exports
pub use config::SpecialTestConfig;
pub use discovery::{MarkerScan, TestSource};
pub use execution::run_plan;
pub use models::TestResult;
pub use registry::TaggedRegistry;

//! # List Command Module / 列表命令模块
//!
//! Shows the execution plan without running anything.
//!
//! 显示执行计划而不运行任何内容。

use anyhow::Result;
use std::path::PathBuf;

use super::Session;
use crate::core::planner;
use crate::reporting::print_plan;

pub fn execute(
    config: PathBuf,
    project_dir: PathBuf,
    filter: Option<String>,
    lang: Option<String>,
) -> Result<()> {
    let session = Session::open(&config, &project_dir, lang)?;
    let tests = session.discover()?;
    let plan = planner::plan_execution(tests, &session.config.blocklist, filter.as_deref());
    print_plan(&plan, &session.locale);
    Ok(())
}

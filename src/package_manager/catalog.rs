//! 目录获取、分类索引、包详情
//!
//! 失败一律降级为空结果或说明文本，不向上抛错。

use super::exec::{run_plain, CommandRunner};
use super::managers::Manager;
use super::parser::clean_terminal_output;
use super::types::{CategoryIndex, PackageRecord, RunOutcome, SearchHit};
use std::collections::HashSet;

pub const DETAILS_NOT_AVAILABLE: &str = "Details not available.";

fn run_listing(runner: &dyn CommandRunner, command: &str) -> Option<String> {
    match run_plain(runner, command) {
        RunOutcome::Success(out) => Some(clean_terminal_output(&out.stdout)),
        _ => None,
    }
}

/// 用已安装名单推导 `installed`，并丢掉空名字
pub fn mark_installed(records: Vec<PackageRecord>, installed: &HashSet<String>) -> Vec<PackageRecord> {
    records
        .into_iter()
        .filter(|r| !r.name.trim().is_empty())
        .map(|mut r| {
            r.installed = installed.contains(r.name.trim());
            r
        })
        .collect()
}

/// 获取目录：可用列表 + 已安装列表，任一失败返回空
pub fn fetch_catalog(runner: &dyn CommandRunner, manager: &dyn Manager) -> Vec<PackageRecord> {
    let (Some(available_cmd), Some(installed_cmd)) =
        (manager.list_available(), manager.list_installed())
    else {
        log::debug!("{} 没有目录命令", manager.kind());
        return Vec::new();
    };

    let Some(available) = run_listing(runner, &available_cmd) else {
        return Vec::new();
    };
    let Some(installed) = run_listing(runner, &installed_cmd) else {
        return Vec::new();
    };

    let installed: HashSet<String> = manager
        .parse_installed(&installed)
        .into_iter()
        .map(|name| name.trim().to_string())
        .collect();
    let records = mark_installed(manager.parse_available(&available), &installed);
    log::info!(
        "{}: {} 个包，其中 {} 个已安装",
        manager.kind(),
        records.len(),
        records.iter().filter(|r| r.installed).count()
    );
    records
}

/// 分类索引，每次都重新计算
pub fn category_map(runner: &dyn CommandRunner, manager: &dyn Manager) -> CategoryIndex {
    manager
        .category_map()
        .and_then(|cmd| run_listing(runner, &cmd))
        .map(|out| manager.parse_categories(&out))
        .unwrap_or_default()
}

/// 包详情原文
pub fn package_details(runner: &dyn CommandRunner, manager: &dyn Manager, name: &str) -> String {
    let Some(cmd) = manager.details_command(name) else {
        return DETAILS_NOT_AVAILABLE.to_string();
    };
    match run_plain(runner, &cmd) {
        RunOutcome::Success(out) => clean_terminal_output(&out.stdout),
        outcome => format!("Could not fetch details.\n{}", outcome.diagnostic()),
    }
}

/// 在多个包管理器的目录里按名字或描述搜索（不区分大小写）
pub fn search<'a>(
    runner: &dyn CommandRunner,
    managers: impl IntoIterator<Item = &'a dyn Manager>,
    query: &str,
) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    managers
        .into_iter()
        .flat_map(|manager| {
            let name = manager.kind().name();
            fetch_catalog(runner, manager)
                .into_iter()
                .filter(|r| {
                    r.name.to_lowercase().contains(&needle)
                        || r.description.to_lowercase().contains(&needle)
                })
                .map(move |package| SearchHit {
                    manager: name.to_string(),
                    package,
                })
        })
        .collect()
}

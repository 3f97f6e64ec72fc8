//! 批量安装队列

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use super::managers::ManagerKind;

/// 单个包的批量安装结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub name: String,
    pub manager: ManagerKind,
    pub ok: bool,
    pub at: DateTime<Local>,
}

/// 一次批量安装的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

impl BatchReport {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 批量安装过程中推送给界面的事件
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchEvent {
    Item(BatchEntry),
    Finished(BatchReport),
}

/// 同一个包管理器下选中的包，保持选择顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchQueue {
    manager: ManagerKind,
    selection: Vec<String>,
}

impl BatchQueue {
    pub fn new(manager: ManagerKind) -> Self {
        Self {
            manager,
            selection: Vec::new(),
        }
    }

    pub fn manager(&self) -> ManagerKind {
        self.manager
    }

    /// 已选中时什么也不做
    pub fn select(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.selection.contains(&name) {
            self.selection.push(name);
        }
    }

    pub fn deselect(&mut self, name: &str) {
        self.selection.retain(|n| n != name);
    }

    /// 切换选中状态，返回切换后是否选中
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.selection.iter().any(|n| n == name) {
            self.deselect(name);
            false
        } else {
            self.selection.push(name.to_string());
            true
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selection.iter().any(|n| n == name)
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn len(&self) -> usize {
        self.selection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    pub fn clear(&mut self) {
        self.selection.clear();
    }

    /// 按选择顺序逐个安装，一个失败不影响后续
    ///
    /// 每个包结束后推送一条 [`BatchEvent::Item`]，全部结束后推送
    /// [`BatchEvent::Finished`]，然后清空选择。接收端已关闭时照常执行。
    pub fn run(
        &mut self,
        mut install_one: impl FnMut(&str) -> bool,
        events: &UnboundedSender<BatchEvent>,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let selection = std::mem::take(&mut self.selection);

        for name in selection {
            let ok = install_one(&name);
            log::info!(
                "批量安装{}: {} [{}]",
                if ok { "成功" } else { "失败" },
                name,
                self.manager
            );
            let _ = events.send(BatchEvent::Item(BatchEntry {
                name: name.clone(),
                manager: self.manager,
                ok,
                at: Local::now(),
            }));
            if ok {
                report.succeeded.push(name);
            } else {
                report.failed.push(name);
            }
        }

        log::info!(
            "批量安装完成: {} 成功, {} 失败",
            report.succeeded.len(),
            report.failed.len()
        );
        let _ = events.send(BatchEvent::Finished(report.clone()));
        report
    }
}

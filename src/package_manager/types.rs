//! 包管理层的数据类型定义

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 单个包管理器的检测结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerDescriptor {
    pub name: String,
    pub label: String,
    /// 可执行文件在 PATH 中
    pub installed: bool,
    /// 与当前发行版匹配
    pub compatible: bool,
}

/// 目录中的一个包
///
/// `installed` 不是包管理器给出的元数据，而是由同一次获取的
/// 已安装名单推导出来的。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub description: String,
    pub version: Option<String>,
    pub author: Option<String>,
    pub size: Option<String>,
    pub installed: bool,
}

impl PackageRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            version: None,
            author: None,
            size: None,
            installed: false,
        }
    }
}

/// 包名 -> 分类集合，仅对一个包管理器有效
pub type CategoryIndex = BTreeMap<String, BTreeSet<String>>;

/// 子进程输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// 被信号终止时为 None
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn combined_output(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// 一次命令执行的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success(CommandOutput),
    Failed(CommandOutput),
    /// stderr 中出现 "incorrect password"
    AuthenticationFailed(CommandOutput),
    /// 进程无法启动
    LaunchFailed(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success(_))
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, RunOutcome::AuthenticationFailed(_))
    }

    /// 失败时给调用方看的诊断文本
    pub fn diagnostic(&self) -> String {
        match self {
            RunOutcome::Success(out) => out.stdout.clone(),
            RunOutcome::Failed(out) => {
                if !out.stderr.trim().is_empty() {
                    out.stderr.clone()
                } else {
                    match out.exit_code {
                        Some(code) => format!("Command failed (exit code {})", code),
                        None => "Command terminated by signal".to_string(),
                    }
                }
            }
            RunOutcome::AuthenticationFailed(_) => INCORRECT_PASSWORD_MSG.to_string(),
            RunOutcome::LaunchFailed(msg) => msg.clone(),
        }
    }
}

pub const INCORRECT_PASSWORD_MSG: &str = "Incorrect password.";

/// 从文件安装的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInstallResult {
    pub ok: bool,
    pub msg: String,
}

impl FileInstallResult {
    pub fn ok(msg: impl Into<String>) -> Self {
        Self { ok: true, msg: msg.into() }
    }

    pub fn fail(msg: impl Into<String>) -> Self {
        Self { ok: false, msg: msg.into() }
    }
}

/// 安装包管理器本身的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapResult {
    pub ok: bool,
    pub msg: String,
}

/// 跨包管理器搜索的命中项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub manager: String,
    #[serde(flatten)]
    pub package: PackageRecord,
}

//! 各包管理器的实现
//!
//! 每个包管理器实现一次 [`Manager`]，只描述"用什么命令、怎么解析输出"，
//! 执行和错误分类统一交给 `exec` / `catalog` / `ops`。
//! 新增包管理器 = 新增一个实现 + 在 [`Registry::new`] 里登记。

mod apt;
mod dnf;
mod flatpak;
mod nix;
mod pacman;
mod snap;
mod zypper;

pub use apt::Apt;
pub use dnf::Dnf;
pub use flatpak::Flatpak;
pub use nix::Nix;
pub use pacman::Pacman;
pub use snap::Snap;
pub use zypper::Zypper;

use super::types::{CategoryIndex, PackageRecord};
use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// 已知包管理器的闭集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerKind {
    Apt,
    Dnf,
    Pacman,
    Zypper,
    Flatpak,
    Snap,
    Nix,
}

impl ManagerKind {
    pub const ALL: [ManagerKind; 7] = [
        ManagerKind::Apt,
        ManagerKind::Dnf,
        ManagerKind::Pacman,
        ManagerKind::Zypper,
        ManagerKind::Flatpak,
        ManagerKind::Snap,
        ManagerKind::Nix,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ManagerKind::Apt => "apt",
            ManagerKind::Dnf => "dnf",
            ManagerKind::Pacman => "pacman",
            ManagerKind::Zypper => "zypper",
            ManagerKind::Flatpak => "flatpak",
            ManagerKind::Snap => "snap",
            ManagerKind::Nix => "nix",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ManagerKind::Apt => "Debian/Ubuntu",
            ManagerKind::Dnf => "Fedora/RHEL",
            ManagerKind::Pacman => "Arch/Manjaro",
            ManagerKind::Zypper => "openSUSE",
            ManagerKind::Flatpak => "Flatpak",
            ManagerKind::Snap => "Snap",
            ManagerKind::Nix => "Nix",
        }
    }
}

impl fmt::Display for ManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ManagerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ManagerKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown package manager: {}", s))
    }
}

/// 包管理器命令模板的一次实例化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerCommand {
    pub line: String,
    /// 需要经过提权工具执行
    pub elevated: bool,
}

impl ManagerCommand {
    pub fn elevated(line: impl Into<String>) -> Self {
        Self { line: line.into(), elevated: true }
    }

    pub fn plain(line: impl Into<String>) -> Self {
        Self { line: line.into(), elevated: false }
    }

    /// 完整命令行，仅用于日志和展示
    pub fn render(&self, elevation_command: &str) -> String {
        if self.elevated {
            format!("{} {}", elevation_command, self.line)
        } else {
            self.line.clone()
        }
    }
}

/// 单个包管理器的能力描述
///
/// 返回 `None` 表示该包管理器不支持对应操作。
/// 传入的包名已经过 `ops::is_safe_package_name` 校验。
pub trait Manager: Send + Sync {
    fn kind(&self) -> ManagerKind;

    /// PATH 中探测的可执行文件名
    fn binary(&self) -> &'static str {
        self.kind().name()
    }

    /// 兼容的发行版 ID；空表示与发行版无关（通用包管理器）
    fn distro_ids(&self) -> &'static [&'static str] {
        &[]
    }

    /// 列出全部可用包的命令
    fn list_available(&self) -> Option<String> {
        None
    }

    fn parse_available(&self, _output: &str) -> Vec<PackageRecord> {
        Vec::new()
    }

    /// 列出已安装包名的命令
    fn list_installed(&self) -> Option<String> {
        None
    }

    fn parse_installed(&self, _output: &str) -> HashSet<String> {
        HashSet::new()
    }

    /// 分类数据来源命令
    fn category_map(&self) -> Option<String> {
        None
    }

    fn parse_categories(&self, _output: &str) -> CategoryIndex {
        CategoryIndex::new()
    }

    fn install_command(&self, _name: &str) -> Option<ManagerCommand> {
        None
    }

    fn uninstall_command(&self, _name: &str) -> Option<ManagerCommand> {
        None
    }

    /// show / info 命令，直接返回原始输出
    fn details_command(&self, _name: &str) -> Option<String> {
        None
    }

    /// "全部更新"命令
    fn update_command(&self) -> Option<ManagerCommand> {
        None
    }

    /// 本机还没有该包管理器时，用来安装它自己的命令
    fn bootstrap_command(&self) -> Option<ManagerCommand> {
        None
    }
}

/// 固定的包管理器集合，按展示顺序排列
pub struct Registry {
    managers: Vec<Box<dyn Manager>>,
}

impl Registry {
    pub fn new(config: &Config) -> Self {
        Self {
            managers: vec![
                Box::new(Apt),
                Box::new(Dnf),
                Box::new(Pacman),
                Box::new(Zypper),
                Box::new(Flatpak::new(&config.flatpak_remote)),
                Box::new(Snap),
                Box::new(Nix),
            ],
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &dyn Manager> {
        self.managers.iter().map(|m| m.as_ref())
    }

    pub fn get(&self, kind: ManagerKind) -> Option<&dyn Manager> {
        self.all().find(|m| m.kind() == kind)
    }

    /// 按名字查找；未知名字返回 None（即"不支持"）
    pub fn lookup(&self, name: &str) -> Option<&dyn Manager> {
        name.parse::<ManagerKind>()
            .ok()
            .and_then(|kind| self.get(kind))
    }
}

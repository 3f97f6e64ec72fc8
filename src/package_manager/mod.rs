//! 包管理层：apt / dnf / pacman / zypper / flatpak / snap / nix 的统一封装
//!
//! 核心操作全部是同步阻塞的，异步边界在 [`crate::service`]。

pub mod batch;
pub mod catalog;
pub mod detect;
pub mod exec;
pub mod file_install;
pub mod managers;
pub mod ops;
pub mod parser;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchEntry, BatchEvent, BatchQueue, BatchReport};
pub use exec::{CommandRunner, Credential, ShellRunner};
pub use managers::{Manager, ManagerCommand, ManagerKind, Registry};
pub use types::{
    BootstrapResult, CategoryIndex, CommandOutput, FileInstallResult, ManagerDescriptor, PackageRecord, RunOutcome,
    SearchHit,
};

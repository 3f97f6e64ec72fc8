use super::{Manager, ManagerCommand, ManagerKind};
use crate::package_manager::parser;
use crate::package_manager::types::PackageRecord;
use std::collections::HashSet;

/// Fedora / RHEL 系
///
/// 没有卸载映射：只提供安装，卸载请求直接返回 false。
pub struct Dnf;

impl Manager for Dnf {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Dnf
    }

    fn distro_ids(&self) -> &'static [&'static str] {
        &["fedora", "rhel", "centos"]
    }

    fn list_available(&self) -> Option<String> {
        Some("dnf list --available -q".to_string())
    }

    fn parse_available(&self, output: &str) -> Vec<PackageRecord> {
        parser::parse_dnf_list(output)
    }

    fn list_installed(&self) -> Option<String> {
        Some("dnf list --installed -q".to_string())
    }

    fn parse_installed(&self, output: &str) -> HashSet<String> {
        parser::parse_dnf_installed(output)
    }

    fn install_command(&self, name: &str) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated(format!("dnf install -y {}", name)))
    }

    fn details_command(&self, name: &str) -> Option<String> {
        Some(format!("dnf info {}", name))
    }

    fn update_command(&self) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated("dnf upgrade -y"))
    }

    fn bootstrap_command(&self) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated("dnf install -y dnf"))
    }
}

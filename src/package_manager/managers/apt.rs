use super::{Manager, ManagerCommand, ManagerKind};
use crate::package_manager::parser;
use crate::package_manager::types::{CategoryIndex, PackageRecord};
use std::collections::HashSet;

/// Debian / Ubuntu 系
pub struct Apt;

impl Manager for Apt {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Apt
    }

    fn distro_ids(&self) -> &'static [&'static str] {
        &["debian", "ubuntu"]
    }

    // 不加 --all-versions：每个包只出现一行
    fn list_available(&self) -> Option<String> {
        Some("apt list 2>/dev/null".to_string())
    }

    fn parse_available(&self, output: &str) -> Vec<PackageRecord> {
        parser::parse_apt_list(output)
    }

    fn list_installed(&self) -> Option<String> {
        Some("apt list --installed 2>/dev/null".to_string())
    }

    fn parse_installed(&self, output: &str) -> HashSet<String> {
        parser::parse_apt_installed(output)
    }

    fn category_map(&self) -> Option<String> {
        Some("apt-cache dumpavail".to_string())
    }

    fn parse_categories(&self, output: &str) -> CategoryIndex {
        parser::parse_apt_sections(output)
    }

    fn install_command(&self, name: &str) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated(format!("apt install -y {}", name)))
    }

    fn uninstall_command(&self, name: &str) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated(format!("apt remove -y {}", name)))
    }

    fn details_command(&self, name: &str) -> Option<String> {
        Some(format!("apt-cache show {}", name))
    }

    fn update_command(&self) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated(
            "sh -c 'apt update && apt upgrade -y'",
        ))
    }

    fn bootstrap_command(&self) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated("apt install -y apt"))
    }
}

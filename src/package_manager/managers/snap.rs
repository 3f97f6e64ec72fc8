use super::{Manager, ManagerCommand, ManagerKind};
use crate::package_manager::parser;
use crate::package_manager::types::PackageRecord;
use std::collections::HashSet;

pub struct Snap;

impl Manager for Snap {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Snap
    }

    // 不带查询词时 snap find 给出推荐列表
    fn list_available(&self) -> Option<String> {
        Some("snap find".to_string())
    }

    fn parse_available(&self, output: &str) -> Vec<PackageRecord> {
        parser::parse_snap_find(output)
    }

    fn list_installed(&self) -> Option<String> {
        Some("snap list".to_string())
    }

    fn parse_installed(&self, output: &str) -> HashSet<String> {
        parser::parse_first_column(output)
    }

    fn install_command(&self, name: &str) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated(format!("snap install {}", name)))
    }

    fn uninstall_command(&self, name: &str) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated(format!("snap remove {}", name)))
    }

    fn details_command(&self, name: &str) -> Option<String> {
        Some(format!("snap info {}", name))
    }

    fn update_command(&self) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated("snap refresh"))
    }

    fn bootstrap_command(&self) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated("pacman -S --noconfirm snapd"))
    }
}

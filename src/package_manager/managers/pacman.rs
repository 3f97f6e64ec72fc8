use super::{Manager, ManagerCommand, ManagerKind};
use crate::package_manager::parser;
use crate::package_manager::types::{CategoryIndex, PackageRecord};
use std::collections::HashSet;

/// Arch 系
pub struct Pacman;

impl Manager for Pacman {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Pacman
    }

    fn distro_ids(&self) -> &'static [&'static str] {
        &["arch", "manjaro", "arcolinux", "endeavouros", "garuda"]
    }

    fn list_available(&self) -> Option<String> {
        Some("pacman -Sl".to_string())
    }

    fn parse_available(&self, output: &str) -> Vec<PackageRecord> {
        parser::parse_pacman_sync_list(output)
    }

    fn list_installed(&self) -> Option<String> {
        Some("pacman -Qq".to_string())
    }

    fn parse_installed(&self, output: &str) -> HashSet<String> {
        parser::parse_name_per_line(output)
    }

    fn category_map(&self) -> Option<String> {
        Some("pacman -Sg".to_string())
    }

    fn parse_categories(&self, output: &str) -> CategoryIndex {
        parser::parse_pacman_groups(output)
    }

    fn install_command(&self, name: &str) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated(format!("pacman -S --noconfirm {}", name)))
    }

    fn uninstall_command(&self, name: &str) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated(format!("pacman -R --noconfirm {}", name)))
    }

    fn details_command(&self, name: &str) -> Option<String> {
        Some(format!("pacman -Si {}", name))
    }

    fn update_command(&self) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated("pacman -Syu --noconfirm"))
    }
}

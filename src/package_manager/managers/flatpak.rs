use super::{Manager, ManagerCommand, ManagerKind};
use crate::package_manager::parser;
use crate::package_manager::types::PackageRecord;
use std::collections::HashSet;

/// Flatpak，不需要提权，针对配置的远程仓库操作
pub struct Flatpak {
    remote: String,
}

impl Flatpak {
    pub fn new(remote: &str) -> Self {
        Self {
            remote: remote.to_string(),
        }
    }
}

impl Manager for Flatpak {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Flatpak
    }

    fn list_available(&self) -> Option<String> {
        Some(format!(
            "flatpak remote-ls {} --app --columns=application,description,version,download-size",
            self.remote
        ))
    }

    fn parse_available(&self, output: &str) -> Vec<PackageRecord> {
        parser::parse_flatpak_remote_ls(output)
    }

    fn list_installed(&self) -> Option<String> {
        Some("flatpak list --app --columns=application".to_string())
    }

    fn parse_installed(&self, output: &str) -> HashSet<String> {
        parser::parse_name_per_line(output)
    }

    fn install_command(&self, name: &str) -> Option<ManagerCommand> {
        Some(ManagerCommand::plain(format!(
            "flatpak install -y {} {}",
            self.remote, name
        )))
    }

    fn uninstall_command(&self, name: &str) -> Option<ManagerCommand> {
        Some(ManagerCommand::plain(format!("flatpak uninstall -y {}", name)))
    }

    fn details_command(&self, name: &str) -> Option<String> {
        Some(format!("flatpak remote-info {} {}", self.remote, name))
    }

    fn update_command(&self) -> Option<ManagerCommand> {
        Some(ManagerCommand::plain("flatpak update -y"))
    }

    // 只覆盖 Arch 系宿主
    fn bootstrap_command(&self) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated("pacman -S --noconfirm flatpak"))
    }
}

use super::{Manager, ManagerCommand, ManagerKind};

/// openSUSE；只有安装 / 卸载 / 详情 / 更新，没有目录
pub struct Zypper;

impl Manager for Zypper {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Zypper
    }

    fn distro_ids(&self) -> &'static [&'static str] {
        &["opensuse", "suse", "sles"]
    }

    fn install_command(&self, name: &str) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated(format!(
            "zypper --non-interactive install {}",
            name
        )))
    }

    fn uninstall_command(&self, name: &str) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated(format!(
            "zypper --non-interactive remove {}",
            name
        )))
    }

    fn details_command(&self, name: &str) -> Option<String> {
        Some(format!("zypper info {}", name))
    }

    fn update_command(&self) -> Option<ManagerCommand> {
        Some(ManagerCommand::elevated("zypper --non-interactive update"))
    }
}

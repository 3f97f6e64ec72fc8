use super::{Manager, ManagerKind};

/// Nix：只参与检测，目录和安装都没有映射
pub struct Nix;

impl Manager for Nix {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Nix
    }
}

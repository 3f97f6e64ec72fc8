//! 发行版识别与包管理器检测

use super::managers::Registry;
use super::types::ManagerDescriptor;
use std::fs;
use std::path::Path;

/// /etc/os-release 中与兼容性判断相关的部分
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostIdentity {
    /// ID 和 ID_LIKE 拆开后的小写标识
    pub ids: Vec<String>,
}

impl HostIdentity {
    /// 读取失败返回 None，由调用方决定默认兼容性
    pub fn read(path: &Path) -> Option<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Some(Self::parse(&content)),
            Err(e) => {
                log::warn!("无法读取 {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn parse(content: &str) -> Self {
        let mut ids = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            let value = line
                .strip_prefix("ID=")
                .or_else(|| line.strip_prefix("ID_LIKE="));
            if let Some(value) = value {
                let value = value.trim_matches(|c| c == '"' || c == '\'');
                ids.extend(
                    value
                        .split_whitespace()
                        .map(|id| id.to_ascii_lowercase()),
                );
            }
        }
        Self { ids }
    }

    pub fn matches(&self, patterns: &[&str]) -> bool {
        self.ids
            .iter()
            .any(|id| patterns.iter().any(|p| id == p || id.starts_with(&format!("{}-", p))))
    }
}

/// 对固定的包管理器集合做一次检测
///
/// `is_on_path` 抽出来是为了测试时不依赖宿主机。
pub fn detect_with(
    registry: &Registry,
    host: Option<&HostIdentity>,
    is_on_path: impl Fn(&str) -> bool,
) -> Vec<ManagerDescriptor> {
    registry
        .all()
        .map(|manager| {
            let patterns = manager.distro_ids();
            let compatible = if patterns.is_empty() {
                true
            } else {
                host.map(|h| h.matches(patterns)).unwrap_or(false)
            };
            ManagerDescriptor {
                name: manager.kind().name().to_string(),
                label: manager.kind().label().to_string(),
                installed: is_on_path(manager.binary()),
                compatible,
            }
        })
        .collect()
}

/// 读取宿主机信息并检测，只做只读探测，不会失败
pub fn detect(registry: &Registry, os_release: &Path) -> Vec<ManagerDescriptor> {
    detect_on(registry, os_release, |bin| which::which(bin).is_ok())
}

/// 同 [`detect`]，PATH 探测由调用方提供
pub fn detect_on(
    registry: &Registry,
    os_release: &Path,
    is_on_path: impl Fn(&str) -> bool,
) -> Vec<ManagerDescriptor> {
    let host = HostIdentity::read(os_release);
    let descriptors = detect_with(registry, host.as_ref(), is_on_path);
    log::debug!("检测结果: {:?}", descriptors);
    descriptors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn registry() -> Registry {
        Registry::new(&Config::default())
    }

    fn compatible(descriptors: &[ManagerDescriptor]) -> Vec<&str> {
        descriptors
            .iter()
            .filter(|d| d.compatible)
            .map(|d| d.name.as_str())
            .collect()
    }

    #[test]
    fn one_descriptor_per_known_manager() {
        let descriptors = detect_with(&registry(), None, |_| false);
        let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["apt", "dnf", "pacman", "zypper", "flatpak", "snap", "nix"]
        );
        assert!(descriptors.iter().all(|d| !d.installed));
    }

    #[test]
    fn detect_on_reads_host_and_uses_given_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let os_release = dir.path().join("os-release");
        std::fs::write(&os_release, "ID=arch\n").unwrap();
        let descriptors = detect_on(&registry(), &os_release, |bin| bin == "pacman");
        assert_eq!(compatible(&descriptors), vec!["pacman", "flatpak", "snap", "nix"]);
        let installed: Vec<&str> = descriptors
            .iter()
            .filter(|d| d.installed)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(installed, vec!["pacman"]);
    }

    #[test]
    fn unreadable_host_keeps_universal_managers_compatible() {
        let descriptors = detect(&registry(), Path::new("/nonexistent/os-release"));
        assert_eq!(compatible(&descriptors), vec!["flatpak", "snap", "nix"]);
    }

    #[test]
    fn arch_family_via_id_like() {
        let host = HostIdentity::parse("NAME=\"CachyOS\"\nID=cachyos\nID_LIKE=\"Arch\"\n");
        let descriptors = detect_with(&registry(), Some(&host), |_| false);
        assert_eq!(compatible(&descriptors), vec!["pacman", "flatpak", "snap", "nix"]);
    }

    #[test]
    fn ubuntu_derivative_matches_apt() {
        let host = HostIdentity::parse("ID=linuxmint\nID_LIKE=\"ubuntu debian\"\n");
        let descriptors = detect_with(&registry(), Some(&host), |_| false);
        assert_eq!(compatible(&descriptors), vec!["apt", "flatpak", "snap", "nix"]);
    }

    #[test]
    fn opensuse_variants_match_zypper() {
        let host = HostIdentity::parse("ID=\"opensuse-tumbleweed\"\nID_LIKE=\"opensuse suse\"\n");
        let descriptors = detect_with(&registry(), Some(&host), |_| false);
        assert!(compatible(&descriptors).contains(&"zypper"));
        assert!(!compatible(&descriptors).contains(&"dnf"));
    }

    #[test]
    fn installed_comes_from_path_lookup() {
        let descriptors = detect_with(&registry(), None, |bin| bin == "pacman" || bin == "flatpak");
        let installed: Vec<&str> = descriptors
            .iter()
            .filter(|d| d.installed)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(installed, vec!["pacman", "flatpak"]);
    }
}

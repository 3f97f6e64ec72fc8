//! 拖入文件安装：按扩展名找到包管理器和安装命令

use super::exec::{self, CommandRunner, Credential};
use super::managers::{ManagerCommand, ManagerKind};
use super::types::{FileInstallResult, ManagerDescriptor, RunOutcome, INCORRECT_PASSWORD_MSG};
use std::path::Path;

pub const INSTALLED_SUCCESSFULLY: &str = "Installed successfully.";

/// 一种可安装的文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFile {
    Deb,
    Rpm,
    FlatpakRef,
    Snap,
}

impl PackageFile {
    /// `ext` 带点、已转小写
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".deb" => Some(PackageFile::Deb),
            ".rpm" => Some(PackageFile::Rpm),
            ".flatpakref" => Some(PackageFile::FlatpakRef),
            ".snap" => Some(PackageFile::Snap),
            _ => None,
        }
    }

    /// 必须已安装的包管理器
    pub fn manager(&self) -> ManagerKind {
        match self {
            PackageFile::Deb => ManagerKind::Apt,
            PackageFile::Rpm => ManagerKind::Dnf,
            PackageFile::FlatpakRef => ManagerKind::Flatpak,
            PackageFile::Snap => ManagerKind::Snap,
        }
    }

    pub fn unsupported_message(&self) -> &'static str {
        match self {
            PackageFile::Deb => "Debian packages (.deb) are not supported on this system.",
            PackageFile::Rpm => "RPM packages (.rpm) are not supported on this system.",
            PackageFile::FlatpakRef => "Flatpak refs are not supported on this system.",
            PackageFile::Snap => "Snap packages are not supported on this system.",
        }
    }

    /// `quoted_path` 已经过 shell 转义
    pub fn command(&self, quoted_path: &str) -> ManagerCommand {
        match self {
            PackageFile::Deb => ManagerCommand::elevated(format!("dpkg -i {}", quoted_path)),
            PackageFile::Rpm => ManagerCommand::elevated(format!("rpm -i {}", quoted_path)),
            PackageFile::FlatpakRef => {
                ManagerCommand::plain(format!("flatpak install -y {}", quoted_path))
            }
            PackageFile::Snap => ManagerCommand::elevated(format!("snap install {}", quoted_path)),
        }
    }
}

/// 小写、带点的扩展名；没有扩展名时为空串
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// 依次检查：文件存在 -> 扩展名 -> 包管理器已安装 -> 执行
///
/// `detect` 只在扩展名识别成功后才调用。
pub fn install_from_file(
    runner: &dyn CommandRunner,
    elevation_command: &str,
    path: &Path,
    credential: &Credential,
    detect: impl FnOnce() -> Vec<ManagerDescriptor>,
) -> FileInstallResult {
    if !path.exists() {
        return FileInstallResult::fail("File does not exist");
    }

    let ext = extension_of(path);
    let Some(kind) = PackageFile::from_extension(&ext) else {
        return FileInstallResult::fail(format!("Unsupported package type: {}", ext));
    };

    let manager = kind.manager();
    let present = detect()
        .iter()
        .any(|d| d.name == manager.name() && d.installed);
    if !present {
        return FileInstallResult::fail(kind.unsupported_message());
    }

    let Some(path_str) = path.to_str() else {
        return FileInstallResult::fail("File path is not valid UTF-8");
    };
    let quoted = match shlex::try_quote(path_str) {
        Ok(q) => q.into_owned(),
        Err(e) => return FileInstallResult::fail(format!("Invalid file path: {}", e)),
    };

    let command = kind.command(&quoted);
    log::info!("从文件安装: {}", command.render(elevation_command));
    match exec::execute(runner, elevation_command, &command, credential) {
        RunOutcome::Success(_) => FileInstallResult::ok(INSTALLED_SUCCESSFULLY),
        RunOutcome::AuthenticationFailed(_) => FileInstallResult::fail(INCORRECT_PASSWORD_MSG),
        RunOutcome::Failed(out) if !out.stderr.trim().is_empty() => FileInstallResult::fail(out.stderr),
        RunOutcome::Failed(_) => FileInstallResult::fail("Unknown error"),
        RunOutcome::LaunchFailed(msg) => FileInstallResult::fail(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package_manager::testing::FakeRunner;
    use std::fs::File;

    fn descriptors(installed: &[&str]) -> Vec<ManagerDescriptor> {
        ManagerKind::ALL
            .iter()
            .map(|k| ManagerDescriptor {
                name: k.name().to_string(),
                label: k.label().to_string(),
                installed: installed.contains(&k.name()),
                compatible: true,
            })
            .collect()
    }

    #[test]
    fn missing_file_is_checked_first() {
        let runner = FakeRunner::new();
        let result = install_from_file(
            &runner,
            "sudo -S",
            Path::new("/definitely/not/here.deb"),
            &Credential::empty(),
            || panic!("detection must not run"),
        );
        assert_eq!(result, FileInstallResult::fail("File does not exist"));
    }

    #[test]
    fn unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo.xyz");
        File::create(&path).unwrap();
        let runner = FakeRunner::new();
        let result = install_from_file(&runner, "sudo -S", &path, &Credential::empty(), || {
            panic!("detection must not run")
        });
        assert_eq!(result, FileInstallResult::fail("Unsupported package type: .xyz"));
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(extension_of(Path::new("/tmp/Foo.DEB")), ".deb");
        assert_eq!(extension_of(Path::new("/tmp/noext")), "");
    }

    #[test]
    fn deb_requires_apt_installed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo.deb");
        File::create(&path).unwrap();
        let runner = FakeRunner::new();
        let result = install_from_file(&runner, "sudo -S", &path, &Credential::new("pw"), || {
            descriptors(&["flatpak"])
        });
        assert_eq!(
            result,
            FileInstallResult::fail("Debian packages (.deb) are not supported on this system.")
        );
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn rpm_install_quotes_path_and_elevates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my pkg.rpm");
        File::create(&path).unwrap();
        let runner = FakeRunner::new().on("sudo -S rpm -i", 0, "", "");
        let result = install_from_file(&runner, "sudo -S", &path, &Credential::new("pw"), || {
            descriptors(&["dnf"])
        });
        assert_eq!(result, FileInstallResult::ok(INSTALLED_SUCCESSFULLY));
        let expected = format!("sudo -S rpm -i '{}'", path.display());
        assert_eq!(runner.commands(), vec![expected]);
    }

    #[test]
    fn flatpakref_runs_unprivileged_and_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.flatpakref");
        File::create(&path).unwrap();
        let runner = FakeRunner::new().on("flatpak install -y", 1, "", "error: ref not found\n");
        let result = install_from_file(&runner, "sudo -S", &path, &Credential::empty(), || {
            descriptors(&["flatpak"])
        });
        assert_eq!(result, FileInstallResult::fail("error: ref not found\n"));
        assert_eq!(runner.inputs(), vec![None]);
    }

    #[test]
    fn silent_failure_is_unknown_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("core.snap");
        File::create(&path).unwrap();
        let runner = FakeRunner::new().on("sudo -S snap install", 1, "", "");
        let result = install_from_file(&runner, "sudo -S", &path, &Credential::new("pw"), || {
            descriptors(&["snap"])
        });
        assert_eq!(result, FileInstallResult::fail("Unknown error"));
    }
}

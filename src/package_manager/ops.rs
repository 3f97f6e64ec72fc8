//! 安装 / 卸载 / 更新 / 任意命令

use super::exec::{self, CommandRunner, Credential};
use super::managers::{Manager, ManagerCommand};
use super::types::{BootstrapResult, RunOutcome, INCORRECT_PASSWORD_MSG};
use regex::Regex;
use std::sync::LazyLock;

pub const UPDATE_NOT_SUPPORTED: &str = "Update not supported";

/// 各包管理器包名允许的字符：字母数字和 `@._+:/-`
static SAFE_PACKAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9@._+:/-]+$").expect("Invalid regex pattern"));

/// 包名会被拼进 shell 命令，只接受安全字符，且不能以 `-` 开头（防止被当成选项）
pub fn is_safe_package_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 256
        && !name.starts_with('-')
        && !name.contains("..")
        && SAFE_PACKAGE_NAME.is_match(name)
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Install,
    Uninstall,
}

impl Action {
    fn command_for(&self, manager: &dyn Manager, name: &str) -> Option<ManagerCommand> {
        match self {
            Action::Install => manager.install_command(name),
            Action::Uninstall => manager.uninstall_command(name),
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Action::Install => "安装",
            Action::Uninstall => "卸载",
        }
    }
}

fn transact(
    runner: &dyn CommandRunner,
    elevation_command: &str,
    manager: &dyn Manager,
    name: &str,
    credential: &Credential,
    action: Action,
) -> bool {
    if !is_safe_package_name(name) {
        log::warn!("拒绝不安全的包名: {:?}", name);
        return false;
    }
    let Some(command) = action.command_for(manager, name) else {
        log::warn!("{} 不支持{}", manager.kind(), action.verb());
        return false;
    };

    log::info!("{}: {}", action.verb(), command.render(elevation_command));
    let outcome = exec::execute(runner, elevation_command, &command, credential);
    let ok = outcome.is_success();
    if ok {
        log::info!("{}成功: {} [{}]", action.verb(), name, manager.kind());
    } else {
        log::warn!(
            "{}失败: {} [{}]: {}",
            action.verb(),
            name,
            manager.kind(),
            outcome.diagnostic().trim()
        );
    }
    ok
}

pub fn install(
    runner: &dyn CommandRunner,
    elevation_command: &str,
    manager: &dyn Manager,
    name: &str,
    credential: &Credential,
) -> bool {
    transact(runner, elevation_command, manager, name, credential, Action::Install)
}

pub fn uninstall(
    runner: &dyn CommandRunner,
    elevation_command: &str,
    manager: &dyn Manager,
    name: &str,
    credential: &Credential,
) -> bool {
    transact(runner, elevation_command, manager, name, credential, Action::Uninstall)
}

/// 提权命令的文本结果：密码错误单独一句，其余 stdout + stderr
fn elevated_text(outcome: RunOutcome) -> String {
    match outcome {
        RunOutcome::AuthenticationFailed(_) => INCORRECT_PASSWORD_MSG.to_string(),
        RunOutcome::Success(out) | RunOutcome::Failed(out) => out.combined_output(),
        RunOutcome::LaunchFailed(msg) => msg,
    }
}

fn plain_text(outcome: RunOutcome) -> String {
    match outcome {
        RunOutcome::Success(out) => out.stdout,
        other => other.diagnostic(),
    }
}

/// 通用命令入口：以 `sudo` 开头的命令走提权路径
pub fn run_command(
    runner: &dyn CommandRunner,
    elevation_command: &str,
    line: &str,
    credential: &Credential,
) -> String {
    match exec::strip_elevation_prefix(line) {
        Some(rest) => elevated_text(exec::run_elevated(runner, elevation_command, rest, credential)),
        None => plain_text(exec::run_plain(runner, line)),
    }
}

/// 更新某个包管理器的全部包
pub fn update(
    runner: &dyn CommandRunner,
    elevation_command: &str,
    manager: &dyn Manager,
    credential: &Credential,
) -> String {
    let Some(command) = manager.update_command() else {
        return UPDATE_NOT_SUPPORTED.to_string();
    };
    log::info!("更新: {}", command.render(elevation_command));
    let outcome = exec::execute(runner, elevation_command, &command, credential);
    if command.elevated {
        elevated_text(outcome)
    } else {
        plain_text(outcome)
    }
}

/// 用宿主机的原生包管理器安装某个包管理器
pub fn bootstrap(
    runner: &dyn CommandRunner,
    elevation_command: &str,
    manager: &dyn Manager,
    credential: &Credential,
) -> BootstrapResult {
    let name = manager.kind().name();
    let Some(command) = manager.bootstrap_command() else {
        return BootstrapResult {
            ok: false,
            msg: format!("Automatic install not available for {}.", name),
        };
    };
    log::info!("安装包管理器: {}", command.render(elevation_command));
    let outcome = exec::execute(runner, elevation_command, &command, credential);
    if outcome.is_success() {
        log::info!("{} 已安装", name);
        BootstrapResult {
            ok: true,
            msg: format!("{} installed! Please restart AnyPkg.", name),
        }
    } else {
        let text = if command.elevated {
            elevated_text(outcome)
        } else {
            plain_text(outcome)
        };
        log::warn!("{} 安装失败", name);
        BootstrapResult {
            ok: false,
            msg: format!("Install failed: {}", text),
        }
    }
}

//! 命令执行与提权
//!
//! 所有子进程都是同步阻塞执行的，没有超时，也不能取消。
//! 密码只在 [`run_elevated`] 里变成字节写进标准输入。

use super::managers::ManagerCommand;
use super::types::{CommandOutput, RunOutcome};
use std::fmt;
use std::io;

/// 一次性的密码
///
/// 不可 Clone，Debug 输出打码，Drop 时清零。
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        let mut bytes = std::mem::take(&mut self.0).into_bytes();
        wipe(&mut bytes);
    }
}

fn wipe(bytes: &mut [u8]) {
    for b in bytes.iter_mut() {
        // volatile 写，避免被当成死存储优化掉
        unsafe { std::ptr::write_volatile(b, 0) };
    }
}

/// 执行 shell 命令的抽象，测试时可以替换成假的实现
pub trait CommandRunner: Send + Sync {
    /// 以 `<shell> -c <command>` 执行，`input` 写入标准输入
    fn run(&self, command: &str, input: Option<&[u8]>) -> io::Result<CommandOutput>;
}

/// 基于 duct 的真实执行器
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self { shell: shell.into() }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, input: Option<&[u8]>) -> io::Result<CommandOutput> {
        let expr = duct::cmd(self.shell.as_str(), ["-c", command])
            .stdout_capture()
            .stderr_capture()
            .unchecked();
        let expr = match input {
            Some(bytes) => expr.stdin_bytes(bytes),
            None => expr.stdin_null(),
        };
        let output = expr.run()?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        })
    }
}

const AUTH_FAILURE_MARKER: &str = "incorrect password";

fn is_auth_failure(stderr: &str) -> bool {
    stderr.to_lowercase().contains(AUTH_FAILURE_MARKER)
}

/// 不提权执行
pub fn run_plain(runner: &dyn CommandRunner, command: &str) -> RunOutcome {
    log::debug!("执行: {}", command);
    match runner.run(command, None) {
        Ok(out) if out.success() => RunOutcome::Success(out),
        Ok(out) => {
            log::warn!("命令失败 ({:?}): {}", out.exit_code, command);
            RunOutcome::Failed(out)
        }
        Err(e) => {
            log::warn!("无法启动命令 {}: {}", command, e);
            RunOutcome::LaunchFailed(e.to_string())
        }
    }
}

/// 经提权工具执行，密码 + 换行作为标准输入
///
/// 唯一接触密码明文的地方，写入缓冲区在返回前清零。
pub fn run_elevated(
    runner: &dyn CommandRunner,
    elevation_command: &str,
    command: &str,
    credential: &Credential,
) -> RunOutcome {
    let line = format!("{} {}", elevation_command, command);
    log::debug!("提权执行: {}", line);

    let mut input = Vec::with_capacity(credential.0.len() + 1);
    input.extend_from_slice(credential.0.as_bytes());
    input.push(b'\n');
    let result = runner.run(&line, Some(&input));
    wipe(&mut input);

    match result {
        Ok(out) if is_auth_failure(&out.stderr) => {
            log::warn!("密码错误: {}", line);
            RunOutcome::AuthenticationFailed(out)
        }
        Ok(out) if out.success() => RunOutcome::Success(out),
        Ok(out) => {
            log::warn!("命令失败 ({:?}): {}", out.exit_code, line);
            RunOutcome::Failed(out)
        }
        Err(e) => {
            log::warn!("无法启动命令 {}: {}", line, e);
            RunOutcome::LaunchFailed(e.to_string())
        }
    }
}

/// 按模板是否需要提权选择执行路径
pub fn execute(
    runner: &dyn CommandRunner,
    elevation_command: &str,
    command: &ManagerCommand,
    credential: &Credential,
) -> RunOutcome {
    if command.elevated {
        run_elevated(runner, elevation_command, &command.line, credential)
    } else {
        run_plain(runner, &command.line)
    }
}

/// 去掉约定的 `sudo` / `sudo -S` 前缀；不是提权命令时返回 None
pub fn strip_elevation_prefix(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("sudo")?;
    if !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return None;
    }
    let rest = rest.trim_start();
    let rest = match rest.strip_prefix("-S") {
        Some(r) if r.is_empty() || r.starts_with(char::is_whitespace) => r.trim_start(),
        _ => rest,
    };
    Some(rest)
}

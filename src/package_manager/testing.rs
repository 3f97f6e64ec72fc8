//! 单元测试用的假执行器

use super::exec::CommandRunner;
use super::types::CommandOutput;
use std::io;
use std::sync::Mutex;

/// 按命令前缀返回预设输出，并记录每次调用
///
/// 未登记的命令返回 127（command not found）。
#[derive(Default)]
pub struct FakeRunner {
    rules: Vec<(String, CommandOutput)>,
    panics: Vec<String>,
    calls: Mutex<Vec<(String, Option<Vec<u8>>)>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, prefix: &str, code: i32, stdout: &str, stderr: &str) -> Self {
        self.rules.push((
            prefix.to_string(),
            CommandOutput {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                exit_code: Some(code),
            },
        ));
        self
    }

    /// 匹配到该前缀时直接 panic，模拟后台任务崩溃
    pub fn panic_on(mut self, prefix: &str) -> Self {
        self.panics.push(prefix.to_string());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(c, _)| c.clone())
            .collect()
    }

    pub fn inputs(&self) -> Vec<Option<Vec<u8>>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, i)| i.clone())
            .collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, command: &str, input: Option<&[u8]>) -> io::Result<CommandOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), input.map(|b| b.to_vec())));
        if self.panics.iter().any(|p| command.starts_with(p.as_str())) {
            panic!("scripted panic: {}", command);
        }
        let output = self
            .rules
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_else(|| CommandOutput {
                stdout: String::new(),
                stderr: format!("sh: {}: command not found", command),
                exit_code: Some(127),
            });
        Ok(output)
    }
}

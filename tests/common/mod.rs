#![allow(dead_code)]

use anypkg::package_manager::{CommandOutput, CommandRunner};
use anypkg::{AnyPkg, Config};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// 按命令前缀返回预设输出的执行器
#[derive(Default)]
pub struct MockRunner {
    rules: Vec<(String, CommandOutput)>,
    calls: Mutex<Vec<(String, Option<Vec<u8>>)>>,
}

impl MockRunner {
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

    pub fn commands(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn stdin_of(&self, index: usize) -> Option<Vec<u8>> {
        self.calls.lock().unwrap()[index].1.clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, command: &str, input: Option<&[u8]>) -> io::Result<CommandOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), input.map(<[u8]>::to_vec)));
        Ok(self
            .rules
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or(CommandOutput {
                stdout: String::new(),
                stderr: "command not found".to_string(),
                exit_code: Some(127),
            }))
    }
}

/// 构造一个使用假执行器、假 PATH 的服务
pub fn service(
    runner: MockRunner,
    os_release: Option<PathBuf>,
    on_path: &'static [&'static str],
) -> (AnyPkg, Arc<MockRunner>) {
    let runner = Arc::new(runner);
    let config = Config {
        os_release_path: os_release.unwrap_or_else(|| PathBuf::from("/nonexistent/os-release")),
        ..Config::default()
    };
    let service = AnyPkg::with_runner(config, runner.clone())
        .with_path_lookup(move |bin| on_path.iter().any(|p| *p == bin));
    (service, runner)
}

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 执行 `-c` 命令使用的 shell
    pub shell: String,
    /// 提权前缀，必须能从标准输入读取密码
    pub elevation_command: String,
    /// flatpak 目录 / 安装 / 详情使用的远程仓库
    pub flatpak_remote: String,
    /// 发行版识别文件
    pub os_release_path: PathBuf,
    /// 交互终端使用的 shell，未设置时取 $SHELL
    pub terminal_shell: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell: "/bin/bash".to_string(),
            elevation_command: "sudo -S".to_string(),
            flatpak_remote: "flathub".to_string(),
            os_release_path: PathBuf::from("/etc/os-release"),
            terminal_shell: None,
        }
    }
}

impl Config {
    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/anypkg/config.toml")
    }

    /// 交互终端 shell：配置 > $SHELL > bash
    pub fn terminal_shell(&self) -> String {
        self.terminal_shell
            .clone()
            .or_else(|| std::env::var("SHELL").ok())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "bash".to_string())
    }
}

//! 库内部错误类型
//!
//! 只用于配置加载、终端会话、密码输入这类"外围"操作。
//! 包管理核心操作（检测 / 目录 / 安装 / 卸载）从不返回错误，
//! 结果统一编码在返回值里。

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置文件解析失败 '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("终端会话错误: {0}")]
    Terminal(String),

    #[error("读取密码失败: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_and_config_errors_convert() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, Error::Io(_)));

        let source = toml::from_str::<toml::Value>("shell = ").unwrap_err();
        let err = Error::Config { path: PathBuf::from("/tmp/anypkg.toml"), source };
        assert!(err.to_string().starts_with("配置文件解析失败 '/tmp/anypkg.toml'"));
    }
}

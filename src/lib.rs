//! anypkg：在 apt / dnf / pacman / zypper / flatpak / snap / nix 之上的统一包管理层

pub mod config;
pub mod error;
pub mod package_manager;
pub mod prompt;
pub mod service;
pub mod sysinfo;
pub mod terminal;

pub use config::Config;
pub use error::{Error, Result};
pub use package_manager::{Credential, ManagerKind};
pub use service::AnyPkg;

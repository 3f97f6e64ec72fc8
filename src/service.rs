//! 异步边界
//!
//! 每个操作都把阻塞的子进程工作放到 `spawn_blocking` 里执行。
//! 核心操作从不返回错误：不支持的包管理器得到空结果 / false / 说明文本。
//! 密码随任务一起移动，任务结束即被清零丢弃。

use crate::config::Config;
use crate::error::Result;
use crate::package_manager::detect;
use crate::package_manager::{
    catalog, file_install, ops, BatchEvent, BatchQueue, BatchReport, BootstrapResult, CategoryIndex,
    CommandRunner, Credential, FileInstallResult, ManagerDescriptor, PackageRecord, Registry,
    SearchHit, ShellRunner,
};
use crate::sysinfo::SystemHealth;
use crate::terminal::TerminalSession;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

type PathLookup = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct AnyPkg {
    config: Arc<Config>,
    registry: Arc<Registry>,
    runner: Arc<dyn CommandRunner>,
    on_path: PathLookup,
}

impl AnyPkg {
    pub fn new(config: Config) -> Self {
        let runner = Arc::new(ShellRunner::new(config.shell.clone()));
        Self::with_runner(config, runner)
    }

    /// 指定命令执行器（测试时传入假的实现）
    pub fn with_runner(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            registry: Arc::new(Registry::new(&config)),
            config: Arc::new(config),
            runner,
            on_path: Arc::new(|bin| which::which(bin).is_ok()),
        }
    }

    /// 替换 PATH 探测
    pub fn with_path_lookup(mut self, lookup: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.on_path = Arc::new(lookup);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    async fn blocking<T, F>(&self, fallback: T, f: F) -> T
    where
        T: Send + 'static,
        F: FnOnce(AnyPkg) -> T + Send + 'static,
    {
        let this = self.clone();
        match tokio::task::spawn_blocking(move || f(this)).await {
            Ok(value) => value,
            Err(e) => {
                log::error!("后台任务异常退出: {}", e);
                fallback
            }
        }
    }

    fn detect_now(&self) -> Vec<ManagerDescriptor> {
        detect::detect_on(&self.registry, &self.config.os_release_path, |bin| (self.on_path)(bin))
    }

    fn installed_names(&self) -> Vec<String> {
        self.detect_now()
            .into_iter()
            .filter(|d| d.installed)
            .map(|d| d.name)
            .collect()
    }

    fn elevation(&self) -> &str {
        &self.config.elevation_command
    }

    pub async fn detect_managers(&self) -> Vec<ManagerDescriptor> {
        self.blocking(Vec::new(), |this| this.detect_now()).await
    }

    pub async fn fetch_categories(&self, manager: &str) -> CategoryIndex {
        let manager = manager.to_string();
        self.blocking(CategoryIndex::new(), move |this| match this.registry.lookup(&manager) {
            Some(m) => catalog::category_map(this.runner.as_ref(), m),
            None => CategoryIndex::new(),
        })
        .await
    }

    pub async fn fetch_packages(&self, manager: &str) -> Vec<PackageRecord> {
        let manager = manager.to_string();
        self.blocking(Vec::new(), move |this| match this.registry.lookup(&manager) {
            Some(m) => catalog::fetch_catalog(this.runner.as_ref(), m),
            None => Vec::new(),
        })
        .await
    }

    pub async fn fetch_package_details(&self, manager: &str, package: &str) -> String {
        let manager = manager.to_string();
        let package = package.to_string();
        self.blocking(catalog::DETAILS_NOT_AVAILABLE.to_string(), move |this| {
            match this.registry.lookup(&manager) {
                Some(m) => catalog::package_details(this.runner.as_ref(), m, &package),
                None => catalog::DETAILS_NOT_AVAILABLE.to_string(),
            }
        })
        .await
    }

    pub async fn install_package(&self, manager: &str, package: &str, credential: Credential) -> bool {
        let manager = manager.to_string();
        let package = package.to_string();
        self.blocking(false, move |this| {
            let Some(m) = this.registry.lookup(&manager) else {
                log::warn!("未知的包管理器: {}", manager);
                return false;
            };
            ops::install(this.runner.as_ref(), this.elevation(), m, &package, &credential)
        })
        .await
    }

    pub async fn uninstall_package(&self, manager: &str, package: &str, credential: Credential) -> bool {
        let manager = manager.to_string();
        let package = package.to_string();
        self.blocking(false, move |this| {
            let Some(m) = this.registry.lookup(&manager) else {
                log::warn!("未知的包管理器: {}", manager);
                return false;
            };
            ops::uninstall(this.runner.as_ref(), this.elevation(), m, &package, &credential)
        })
        .await
    }

    pub async fn install_from_file(&self, path: impl Into<PathBuf>, credential: Credential) -> FileInstallResult {
        let path = path.into();
        self.blocking(FileInstallResult::fail("Unknown error"), move |this| {
            file_install::install_from_file(
                this.runner.as_ref(),
                this.elevation(),
                &path,
                &credential,
                || this.detect_now(),
            )
        })
        .await
    }

    pub async fn run_command(&self, line: &str, credential: Credential) -> String {
        let line = line.to_string();
        self.blocking(String::new(), move |this| {
            ops::run_command(this.runner.as_ref(), this.elevation(), &line, &credential)
        })
        .await
    }

    pub async fn update_manager(&self, manager: &str, credential: Credential) -> String {
        let manager = manager.to_string();
        self.blocking(ops::UPDATE_NOT_SUPPORTED.to_string(), move |this| {
            match this.registry.lookup(&manager) {
                Some(m) => ops::update(this.runner.as_ref(), this.elevation(), m, &credential),
                None => ops::UPDATE_NOT_SUPPORTED.to_string(),
            }
        })
        .await
    }

    /// 依次更新所有已安装且支持更新的包管理器，返回 (名字, 输出)
    pub async fn update_all(&self, credential: Credential) -> Vec<(String, String)> {
        self.blocking(Vec::new(), move |this| {
            this.installed_names()
                .into_iter()
                .filter_map(|name| {
                    let m = this.registry.lookup(&name)?;
                    m.update_command()?;
                    let out = ops::update(this.runner.as_ref(), this.elevation(), m, &credential);
                    Some((name, out))
                })
                .collect()
        })
        .await
    }

    /// 在所有已安装包管理器的目录里搜索
    pub async fn search_all(&self, query: &str) -> Vec<SearchHit> {
        let query = query.to_string();
        self.blocking(Vec::new(), move |this| {
            let names = this.installed_names();
            let managers = names.iter().filter_map(|n| this.registry.lookup(n));
            catalog::search(this.runner.as_ref(), managers, &query)
        })
        .await
    }

    /// 批量安装，批次跑完后 `queue` 被清空
    ///
    /// 同一个密码用于整批，批次结束即丢弃。
    /// 后台任务异常退出时队列保持原样，调用方可以重试。
    pub async fn install_batch(
        &self,
        queue: &mut BatchQueue,
        credential: Credential,
        events: UnboundedSender<BatchEvent>,
    ) -> BatchReport {
        let mut work = queue.clone();
        let report = self
            .blocking(None, move |this| {
                let m = this.registry.get(work.manager())?;
                Some(work.run(
                    |name| ops::install(this.runner.as_ref(), this.elevation(), m, name, &credential),
                    &events,
                ))
            })
            .await;
        match report {
            Some(report) => {
                queue.clear();
                report
            }
            None => BatchReport::default(),
        }
    }

    /// 安装某个包管理器本身，未知或没有对应命令时给出说明
    pub async fn bootstrap_manager(&self, manager: &str, credential: Credential) -> BootstrapResult {
        let manager = manager.to_string();
        let unavailable = format!("Automatic install not available for {}.", manager);
        self.blocking(
            BootstrapResult { ok: false, msg: unavailable.clone() },
            move |this| match this.registry.lookup(&manager) {
                Some(m) => ops::bootstrap(this.runner.as_ref(), this.elevation(), m, &credential),
                None => BootstrapResult { ok: false, msg: unavailable },
            },
        )
        .await
    }

    pub async fn system_health(&self) -> SystemHealth {
        self.blocking(SystemHealth::default(), |_| SystemHealth::read()).await
    }

    /// 打开交互终端，返回会话和输出接收端
    pub fn open_terminal(&self) -> Result<(TerminalSession, UnboundedReceiver<Vec<u8>>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = TerminalSession::open(&self.config.terminal_shell(), tx)?;
        Ok((session, rx))
    }
}

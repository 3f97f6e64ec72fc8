use anyhow::{bail, Context, Result};
use anypkg::package_manager::exec::strip_elevation_prefix;
use anypkg::package_manager::file_install::{extension_of, PackageFile};
use anypkg::package_manager::{BatchEvent, BatchQueue, ManagerKind};
use anypkg::{prompt, AnyPkg, Config, Credential};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{IsTerminal, Read, Write};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(
    name = "anypkg",
    about = "One interface over apt, dnf, pacman, zypper, flatpak, snap and nix",
    version
)]
struct Cli {
    /// 以 JSON 输出
    #[arg(long, global = true)]
    json: bool,

    /// 从标准输入读取一行作为密码
    #[arg(long, global = true)]
    password_stdin: bool,

    /// 配置文件路径
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect package managers on this host
    Detect,
    /// Show the category index of a manager
    Categories { manager: String },
    /// List the catalog of a manager
    List {
        manager: String,
        /// Only installed packages
        #[arg(long)]
        installed: bool,
    },
    /// Show package details
    Info { manager: String, package: String },
    /// Install packages (several names run as a batch)
    Install {
        manager: String,
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Uninstall a package
    Uninstall { manager: String, package: String },
    /// Install a local .deb / .rpm / .flatpakref / .snap file
    InstallFile { path: PathBuf },
    /// Run a shell command; a leading `sudo` runs it elevated
    Run {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },
    /// Update one manager, or every installed one
    Update { manager: Option<String> },
    /// Install a missing package manager through the host's native one
    Bootstrap { manager: String },
    /// Search the catalogs of every installed manager
    Search { query: String },
    /// Memory, load and disk usage
    Health,
    /// Interactive shell session
    Shell,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 需要提权时才读密码，否则给空密码
fn credential(cli: &Cli, needed: bool) -> Result<Credential> {
    if !needed {
        return Ok(Credential::empty());
    }
    if cli.password_stdin {
        return Ok(prompt::read_credential_line(std::io::stdin().lock())?);
    }
    if !std::io::stdin().is_terminal() {
        bail!("需要密码：请在终端中运行，或使用 --password-stdin");
    }
    Ok(prompt::read_credential("[anypkg] password: ")?)
}

fn install_needs_elevation(service: &AnyPkg, manager: &str, package: &str) -> bool {
    service
        .registry()
        .lookup(manager)
        .and_then(|m| m.install_command(package))
        .map(|c| c.elevated)
        .unwrap_or(false)
}

async fn run(cli: Cli, service: AnyPkg) -> Result<()> {
    match &cli.command {
        Command::Detect => {
            let found = service.detect_managers().await;
            if cli.json {
                return print_json(&found);
            }
            for d in found {
                println!(
                    "{:<8} {:<14} installed={:<5} compatible={}",
                    d.name, d.label, d.installed, d.compatible
                );
            }
        }
        Command::Categories { manager } => {
            let index = service.fetch_categories(manager).await;
            if cli.json {
                return print_json(&index);
            }
            for (package, labels) in index {
                let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
                println!("{}: {}", package, labels.join(", "));
            }
        }
        Command::List { manager, installed } => {
            let mut records = service.fetch_packages(manager).await;
            if *installed {
                records.retain(|r| r.installed);
            }
            if cli.json {
                return print_json(&records);
            }
            for r in records {
                println!(
                    "{}{} {} - {}",
                    if r.installed { "* " } else { "  " },
                    r.name,
                    r.version.as_deref().unwrap_or(""),
                    r.description
                );
            }
        }
        Command::Info { manager, package } => {
            println!("{}", service.fetch_package_details(manager, package).await);
        }
        Command::Install { manager, packages } => {
            let needed = packages
                .iter()
                .any(|p| install_needs_elevation(&service, manager, p));
            let cred = credential(&cli, needed)?;

            if let [package] = packages.as_slice() {
                let ok = service.install_package(manager, package, cred).await;
                if cli.json {
                    return print_json(&ok);
                }
                if !ok {
                    bail!("安装失败: {}", package);
                }
                println!("已安装: {}", package);
                return Ok(());
            }

            let kind: ManagerKind = manager.parse().map_err(anyhow::Error::msg)?;
            let mut queue = BatchQueue::new(kind);
            for p in packages {
                queue.select(p.as_str());
            }
            let (tx, mut rx) = mpsc::unbounded_channel();
            let json = cli.json;
            let printer = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    if json {
                        if let Ok(line) = serde_json::to_string(&event) {
                            println!("{}", line);
                        }
                        continue;
                    }
                    match event {
                        BatchEvent::Item(e) => println!(
                            "[{}] {} {} [{}]",
                            e.at.format("%H:%M:%S"),
                            if e.ok { "✓" } else { "✗" },
                            e.name,
                            e.manager
                        ),
                        BatchEvent::Finished(r) => println!(
                            "Batch install finished: {} ok, {} failed",
                            r.succeeded.len(),
                            r.failed.len()
                        ),
                    }
                }
            });
            let report = service.install_batch(&mut queue, cred, tx).await;
            let _ = printer.await;
            if !report.all_ok() {
                bail!("部分包安装失败: {}", report.failed.join(", "));
            }
        }
        Command::Uninstall { manager, package } => {
            let needed = service
                .registry()
                .lookup(manager)
                .and_then(|m| m.uninstall_command(package))
                .map(|c| c.elevated)
                .unwrap_or(false);
            let cred = credential(&cli, needed)?;
            let ok = service.uninstall_package(manager, package, cred).await;
            if cli.json {
                return print_json(&ok);
            }
            if !ok {
                bail!("卸载失败: {}", package);
            }
            println!("已卸载: {}", package);
        }
        Command::InstallFile { path } => {
            let needed = PackageFile::from_extension(&extension_of(path))
                .map(|kind| kind.command("").elevated)
                .unwrap_or(false);
            let cred = credential(&cli, needed && path.exists())?;
            let result = service.install_from_file(path.clone(), cred).await;
            if cli.json {
                return print_json(&result);
            }
            println!("{}", result.msg);
            if !result.ok {
                std::process::exit(1);
            }
        }
        Command::Run { line } => {
            let line = line.join(" ");
            let cred = credential(&cli, strip_elevation_prefix(&line).is_some())?;
            let out = service.run_command(&line, cred).await;
            if cli.json {
                return print_json(&out);
            }
            print!("{}", out);
        }
        Command::Update { manager } => match manager {
            Some(manager) => {
                let needed = service
                    .registry()
                    .lookup(manager)
                    .and_then(|m| m.update_command())
                    .map(|c| c.elevated)
                    .unwrap_or(false);
                let cred = credential(&cli, needed)?;
                let out = service.update_manager(manager, cred).await;
                if cli.json {
                    return print_json(&out);
                }
                print!("{}", out);
            }
            None => {
                let cred = credential(&cli, true)?;
                let results = service.update_all(cred).await;
                if cli.json {
                    return print_json(&results);
                }
                for (name, out) in results {
                    println!("==> {}", name);
                    print!("{}", out);
                }
            }
        },
        Command::Bootstrap { manager } => {
            let needed = service
                .registry()
                .lookup(manager)
                .and_then(|m| m.bootstrap_command())
                .map(|c| c.elevated)
                .unwrap_or(false);
            let cred = credential(&cli, needed)?;
            let result = service.bootstrap_manager(manager, cred).await;
            if cli.json {
                return print_json(&result);
            }
            println!("{}", result.msg);
            if !result.ok {
                std::process::exit(1);
            }
        }
        Command::Search { query } => {
            let hits = service.search_all(query).await;
            if cli.json {
                return print_json(&hits);
            }
            for hit in hits {
                println!("[{}] {} - {}", hit.manager, hit.package.name, hit.package.description);
            }
        }
        Command::Health => {
            let health = service.system_health().await;
            if cli.json {
                return print_json(&health);
            }
            const MIB: u64 = 1024 * 1024;
            println!(
                "内存: {} / {} MiB 可用",
                health.freemem / MIB,
                health.totalmem / MIB
            );
            println!(
                "负载: {:.2} {:.2} {:.2}",
                health.loadavg[0], health.loadavg[1], health.loadavg[2]
            );
            println!(
                "磁盘 /: {} / {} 已用 ({})",
                health.disk.used.as_deref().unwrap_or("?"),
                health.disk.size.as_deref().unwrap_or("?"),
                health.disk.percent.as_deref().unwrap_or("?")
            );
        }
        Command::Shell => {
            let (mut session, mut rx) = service.open_terminal()?;
            let printer = tokio::spawn(async move {
                let mut out = tokio::io::stdout();
                while let Some(chunk) = rx.recv().await {
                    out.write_all(&chunk).await?;
                    out.flush().await?;
                }
                Ok::<_, std::io::Error>(())
            });

            let session = tokio::task::spawn_blocking(move || {
                let mut stdin = std::io::stdin().lock();
                let mut buf = [0u8; 1024];
                loop {
                    match stdin.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if session.write(&buf[..n]).is_err() || !session.is_alive() {
                                break;
                            }
                        }
                    }
                }
                session
            })
            .await
            .context("终端输入线程异常退出")?;
            session.close()?;
            let _ = printer.await;
            let _ = std::io::stdout().flush();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // 加载配置
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default()?,
    };

    run(cli, AnyPkg::new(config)).await
}

mod common;

use anypkg::package_manager::{BatchEvent, BatchQueue, ManagerKind};
use anypkg::Credential;
use common::{service, MockRunner};
use std::fs;
use tokio::sync::mpsc;

#[tokio::test]
async fn descriptors_follow_os_release() {
    let dir = tempfile::tempdir().unwrap();
    let os_release = dir.path().join("os-release");
    fs::write(&os_release, "NAME=\"Linux Mint\"\nID=linuxmint\nID_LIKE=\"ubuntu debian\"\n").unwrap();

    let (svc, _) = service(MockRunner::new(), Some(os_release), &["apt", "flatpak"]);
    let found = svc.detect_managers().await;

    let names: Vec<&str> = found.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["apt", "dnf", "pacman", "zypper", "flatpak", "snap", "nix"]);
    let compatible: Vec<&str> = found.iter().filter(|d| d.compatible).map(|d| d.name.as_str()).collect();
    assert_eq!(compatible, ["apt", "flatpak", "snap", "nix"]);
    let installed: Vec<&str> = found.iter().filter(|d| d.installed).map(|d| d.name.as_str()).collect();
    assert_eq!(installed, ["apt", "flatpak"]);
}

#[tokio::test]
async fn catalog_marks_installed_from_installed_listing() {
    let runner = MockRunner::new()
        .on(
            "apt list 2>",
            0,
            "Listing...\nvim/jammy 2:8.2 amd64\ncurl/jammy 7.81 amd64\n",
            "",
        )
        .on(
            "apt list --installed",
            0,
            "Listing...\ncurl/jammy,now 7.81 amd64 [installed]\n",
            "",
        );
    let (svc, _) = service(runner, None, &["apt"]);
    let records = svc.fetch_packages("apt").await;

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| !r.name.is_empty()));
    assert!(!records[0].installed);
    assert!(records[1].installed);
}

#[tokio::test]
async fn categories_for_managers_without_source_are_empty() {
    let (svc, runner) = service(MockRunner::new(), None, &[]);
    for manager in ["dnf", "zypper", "flatpak", "snap", "nix", "brew"] {
        assert!(svc.fetch_categories(manager).await.is_empty(), "{}", manager);
    }
    assert!(runner.commands().is_empty());
}

#[tokio::test]
async fn pacman_groups_become_categories() {
    let runner = MockRunner::new().on("pacman -Sg", 0, "base-devel gcc\nbase-devel make\nxorg xorg-server\n", "");
    let (svc, _) = service(runner, None, &["pacman"]);
    let index = svc.fetch_categories("pacman").await;
    assert!(index["gcc"].contains("base-devel"));
    assert!(index["xorg-server"].contains("xorg"));
}

#[tokio::test]
async fn install_sends_credential_once_on_stdin() {
    let runner = MockRunner::new().on("sudo -S apt install -y htop", 0, "", "");
    let (svc, runner) = service(runner, None, &["apt"]);

    assert!(svc.install_package("apt", "htop", Credential::new("correct horse")).await);
    assert_eq!(runner.commands(), ["sudo -S apt install -y htop"]);
    assert_eq!(runner.stdin_of(0).as_deref(), Some(&b"correct horse\n"[..]));
}

#[tokio::test]
async fn unmapped_install_launches_nothing() {
    let (svc, runner) = service(MockRunner::new(), None, &["nix", "dnf"]);
    assert!(!svc.install_package("nix", "hello", Credential::new("pw")).await);
    assert!(!svc.uninstall_package("dnf", "vim", Credential::new("pw")).await);
    assert!(runner.commands().is_empty());
}

#[tokio::test]
async fn run_command_reports_wrong_password() {
    let runner = MockRunner::new().on("sudo -S ", 1, "", "Sorry, try again.\nsudo: 1 Incorrect Password attempt\n");
    let (svc, _) = service(runner, None, &[]);
    assert_eq!(svc.run_command("sudo whoami", Credential::new("nope")).await, "Incorrect password.");
}

#[tokio::test]
async fn file_install_checks_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, runner) = service(MockRunner::new(), None, &["flatpak"]);

    let missing = svc.install_from_file(dir.path().join("gone.deb"), Credential::empty()).await;
    assert!(!missing.ok);
    assert_eq!(missing.msg, "File does not exist");

    let xyz = dir.path().join("foo.xyz");
    fs::write(&xyz, b"").unwrap();
    let result = svc.install_from_file(&xyz, Credential::empty()).await;
    assert_eq!(result.msg, "Unsupported package type: .xyz");

    let deb = dir.path().join("foo.deb");
    fs::write(&deb, b"").unwrap();
    let result = svc.install_from_file(&deb, Credential::new("pw")).await;
    assert!(!result.ok);
    assert_eq!(result.msg, "Debian packages (.deb) are not supported on this system.");

    assert!(runner.commands().is_empty());
}

#[tokio::test]
async fn batch_continues_after_failure() {
    let runner = MockRunner::new()
        .on("sudo -S pacman -S --noconfirm a", 0, "", "")
        .on("sudo -S pacman -S --noconfirm b", 1, "", "error: target not found: b")
        .on("sudo -S pacman -S --noconfirm c", 0, "", "");
    let (svc, runner) = service(runner, None, &["pacman"]);

    let mut queue = BatchQueue::new(ManagerKind::Pacman);
    for name in ["a", "b", "c"] {
        queue.select(name);
    }
    let (tx, mut rx) = mpsc::unbounded_channel();
    let report = svc.install_batch(&mut queue, Credential::new("pw"), tx).await;

    assert_eq!(runner.commands().len(), 3);
    assert_eq!(report.succeeded, ["a", "c"]);
    assert_eq!(report.failed, ["b"]);
    assert!(queue.is_empty());

    let mut finished = false;
    while let Some(event) = rx.recv().await {
        if let BatchEvent::Finished(r) = event {
            assert_eq!(r, report);
            finished = true;
        }
    }
    assert!(finished);
}

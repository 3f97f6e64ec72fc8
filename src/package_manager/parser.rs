//! 输出解析函数
//!
//! 各包管理器的列表格式都是随意的纯文本，这里一律当作不可信输入：
//! 字段不足、表头、空行都直接跳过，不让整次获取失败。

use super::types::{CategoryIndex, PackageRecord};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// 两个以上空格分隔的列（snap 的对齐输出）
static COLUMN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("Invalid regex pattern"));

/// 清理终端输出中的 ANSI 转义序列和特殊字符
pub fn clean_terminal_output(input: &str) -> String {
    let mut result = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\x1b' => {
                if chars.peek() == Some(&'[') {
                    chars.next();
                    while let Some(&next) = chars.peek() {
                        chars.next();
                        if next.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
            }
            '\r' => {
                if chars.peek() != Some(&'\n') && !result.ends_with('\n') {
                    result.push('\n');
                }
            }
            c if c.is_control() && c != '\n' && c != '\t' => {}
            _ => result.push(c),
        }
    }

    result
}

/// 按表格列切分一行
///
/// 含制表符时逐个 `\t` 切分并保留空列，列位置不会错位；
/// 否则按两个以上空格切分（snap 这类对齐输出）。
pub fn split_columns(line: &str) -> Vec<&str> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.contains('\t') {
        return line.split('\t').map(str::trim).collect();
    }
    COLUMN_SEPARATOR
        .split(line.trim())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(s: Option<&&str>) -> Option<String> {
    s.map(|v| v.trim())
        .filter(|v| !v.is_empty() && *v != "-")
        .map(|v| v.to_string())
}

// ========== 已安装名单 ==========

/// 每行一个包名（pacman -Qq / flatpak list --columns=application）
pub fn parse_name_per_line(output: &str) -> HashSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect()
}

/// apt list --installed：`name/suite,now version arch [installed]`
pub fn parse_apt_installed(output: &str) -> HashSet<String> {
    output
        .lines()
        .filter_map(|line| line.split_once('/'))
        .map(|(name, _)| name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
        .collect()
}

/// dnf list --installed：`name.arch version @repo`
pub fn parse_dnf_installed(output: &str) -> HashSet<String> {
    parse_dnf_list(output).into_iter().map(|r| r.name).collect()
}

/// 表格第一列，跳过 `Name` 表头（snap list）
pub fn parse_first_column(output: &str) -> HashSet<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|name| !name.eq_ignore_ascii_case("name"))
        .map(|name| name.to_string())
        .collect()
}

// ========== 可用包列表 ==========

/// pacman -Sl：`repo name version [installed]`
pub fn parse_pacman_sync_list(output: &str) -> Vec<PackageRecord> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                return None;
            }
            let mut record = PackageRecord::named(parts[1]);
            record.version = Some(parts[2].to_string());
            Some(record)
        })
        .collect()
}

/// apt list：`name/suite[,now] version arch [flags]`，第一行 `Listing...` 没有斜杠
pub fn parse_apt_list(output: &str) -> Vec<PackageRecord> {
    output
        .lines()
        .filter_map(|line| {
            let (name, rest) = line.trim().split_once('/')?;
            if name.is_empty() || name.contains(char::is_whitespace) {
                return None;
            }
            let mut record = PackageRecord::named(name);
            record.version = rest.split_whitespace().nth(1).map(|v| v.to_string());
            Some(record)
        })
        .collect()
}

/// dnf list：`name.arch version repo`，折行的长包名会被当作字段不足跳过
pub fn parse_dnf_list(output: &str) -> Vec<PackageRecord> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                return None;
            }
            let name = match parts[0].rsplit_once('.') {
                Some((name, _arch)) if !name.is_empty() => name,
                _ => return None,
            };
            let mut record = PackageRecord::named(name);
            record.version = Some(parts[1].to_string());
            Some(record)
        })
        .collect()
}

/// flatpak remote-ls --columns=application,description,version,download-size
///
/// 应用 ID 一定是反向域名形式，借此过滤掉表头。
pub fn parse_flatpak_remote_ls(output: &str) -> Vec<PackageRecord> {
    output
        .lines()
        .filter_map(|line| {
            let cols = split_columns(line);
            let app = *cols.first()?;
            if !app.contains('.') || app.contains(' ') {
                return None;
            }
            let mut record = PackageRecord::named(app);
            record.description = cols.get(1).map(|s| s.to_string()).unwrap_or_default();
            record.version = non_empty(cols.get(2));
            record.size = non_empty(cols.get(3));
            Some(record)
        })
        .collect()
}

/// snap find：`Name  Version  Publisher  Notes  Summary`
pub fn parse_snap_find(output: &str) -> Vec<PackageRecord> {
    output
        .lines()
        .filter_map(|line| {
            let cols = split_columns(line);
            if cols.len() < 3 || cols[0].eq_ignore_ascii_case("name") {
                return None;
            }
            let mut record = PackageRecord::named(cols[0]);
            record.version = non_empty(cols.get(1));
            record.author = non_empty(cols.get(2));
            record.description = cols.get(4).map(|s| s.to_string()).unwrap_or_default();
            Some(record)
        })
        .collect()
}

// ========== 分类 ==========

/// pacman -Sg：`group pkg`，同一个包可以属于多个组
pub fn parse_pacman_groups(output: &str) -> CategoryIndex {
    let mut map = CategoryIndex::new();
    for line in output.lines() {
        let mut parts = line.split_whitespace();
        if let (Some(group), Some(pkg)) = (parts.next(), parts.next()) {
            map.entry(pkg.to_string())
                .or_default()
                .insert(group.to_string());
        }
    }
    map
}

/// apt-cache dumpavail：按空行分段，取 `Package:` 和 `Section:`
pub fn parse_apt_sections(output: &str) -> CategoryIndex {
    let mut map = CategoryIndex::new();
    let mut name: Option<String> = None;
    let mut section: Option<String> = None;

    let mut flush = |name: &mut Option<String>, section: &mut Option<String>| {
        if let (Some(n), Some(s)) = (name.take(), section.take()) {
            map.entry(n).or_default().insert(s);
        }
    };

    for line in output.lines() {
        if line.trim().is_empty() {
            flush(&mut name, &mut section);
            continue;
        }
        if let Some(val) = line.strip_prefix("Package:") {
            let val = val.trim();
            if !val.is_empty() {
                name = Some(val.to_string());
            }
        } else if let Some(val) = line.strip_prefix("Section:") {
            let val = val.trim();
            if !val.is_empty() {
                section = Some(val.to_string());
            }
        }
    }
    flush(&mut name, &mut section);

    map
}

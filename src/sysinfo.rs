use serde::Serialize;
use std::process::Command;

/// 根分区占用，字段取自 `df -h /` 的原始文本
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiskUsage {
    pub size: Option<String>,
    pub used: Option<String>,
    pub avail: Option<String>,
    pub percent: Option<String>,
}

/// 主机健康状况快照
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemHealth {
    /// 字节
    pub freemem: u64,
    /// 字节
    pub totalmem: u64,
    /// 1 / 5 / 15 分钟平均负载
    pub loadavg: [f64; 3],
    pub disk: DiskUsage,
}

impl SystemHealth {
    /// 读取当前状态，任何一项失败都只留空，不报错
    pub fn read() -> Self {
        let (freemem, totalmem, loadavg) = Self::get_memory_and_load();
        Self {
            freemem,
            totalmem,
            loadavg,
            disk: Self::get_disk(),
        }
    }

    fn get_memory_and_load() -> (u64, u64, [f64; 3]) {
        let mut info: libc::sysinfo = unsafe { std::mem::zeroed() };
        if unsafe { libc::sysinfo(&mut info) } != 0 {
            log::warn!("sysinfo 调用失败: {}", std::io::Error::last_os_error());
            return (0, 0, [0.0; 3]);
        }
        let unit = u64::from(info.mem_unit.max(1));
        // loads 是 1 << SI_LOAD_SHIFT 的定点数
        let scale = f64::from(1u32 << 16);
        (
            info.freeram as u64 * unit,
            info.totalram as u64 * unit,
            [
                info.loads[0] as f64 / scale,
                info.loads[1] as f64 / scale,
                info.loads[2] as f64 / scale,
            ],
        )
    }

    fn get_disk() -> DiskUsage {
        Command::new("df")
            .args(["-h", "/"])
            .output()
            .ok()
            .filter(|o| o.status.success())
            .map(|o| parse_df(&String::from_utf8_lossy(&o.stdout)))
            .unwrap_or_else(|| {
                log::warn!("df -h / 执行失败");
                DiskUsage::default()
            })
    }
}

/// 解析 `df -h /` 的第二行：Filesystem Size Used Avail Use% Mounted
pub fn parse_df(output: &str) -> DiskUsage {
    let Some(line) = output.lines().nth(1) else {
        return DiskUsage::default();
    };
    let fields: Vec<&str> = line.split_whitespace().collect();
    let field = |i: usize| fields.get(i).map(|s| s.to_string());
    DiskUsage {
        size: field(1),
        used: field(2),
        avail: field(3),
        percent: field(4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn df_second_line() {
        let out = "Filesystem      Size  Used Avail Use% Mounted on\n\
                   /dev/nvme0n1p2  468G  201G  244G  46% /\n";
        let disk = parse_df(out);
        assert_eq!(disk.size.as_deref(), Some("468G"));
        assert_eq!(disk.used.as_deref(), Some("201G"));
        assert_eq!(disk.avail.as_deref(), Some("244G"));
        assert_eq!(disk.percent.as_deref(), Some("46%"));
    }

    #[test]
    fn df_without_data_line() {
        assert_eq!(parse_df("Filesystem Size Used Avail Use% Mounted on\n"), DiskUsage::default());
        assert_eq!(parse_df(""), DiskUsage::default());
    }

    #[test]
    fn live_snapshot_is_sane() {
        let health = SystemHealth::read();
        assert!(health.totalmem >= health.freemem);
        assert!(health.loadavg.iter().all(|l| *l >= 0.0));
    }
}

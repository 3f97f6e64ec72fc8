//! 交互式终端会话
//!
//! 子 shell 放在独立进程组里，输出按读取顺序原样转发到 channel，
//! 关闭或 Drop 时整组终止。

use crate::error::{Error, Result};
use std::io::{Read, Write};
use std::os::unix::process::CommandExt;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;

const READER_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

pub struct TerminalSession {
    child: Child,
    stdin: Option<ChildStdin>,
    readers: Vec<JoinHandle<()>>,
    closed: bool,
}

/// 把读到的字节块原样发出去，接收端关闭或 EOF 时退出
fn forward_stream(mut reader: impl Read, tx: UnboundedSender<Vec<u8>>) {
    let mut buffer = [0u8; 4096];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buffer[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::debug!("终端输出读取结束: {}", e);
                break;
            }
        }
    }
}

impl TerminalSession {
    /// 以 `<shell> -i` 启动，工作目录为 $HOME，TERM=xterm-color
    pub fn open(shell: &str, output_tx: UnboundedSender<Vec<u8>>) -> Result<Self> {
        let mut cmd = Command::new(shell);
        cmd.arg("-i")
            .env("TERM", "xterm-color")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Ok(home) = std::env::var("HOME") {
            cmd.current_dir(home);
        }
        unsafe {
            cmd.pre_exec(|| {
                // 独立进程组，方便整组终止；父进程退出时收到 SIGTERM
                libc::setpgid(0, 0);
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::Terminal(format!("无法启动 {}: {}", shell, e)))?;
        log::info!("终端会话已启动: {} (pid {})", shell, child.id());

        let stdin = child.stdin.take();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            let tx = output_tx.clone();
            readers.push(std::thread::spawn(move || forward_stream(stdout, tx)));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(std::thread::spawn(move || forward_stream(stderr, output_tx)));
        }

        Ok(Self {
            child,
            stdin,
            readers,
            closed: false,
        })
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// 写入 shell 的标准输入
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| Error::Terminal("终端会话已关闭".to_string()))?;
        stdin.write_all(bytes)?;
        stdin.flush()?;
        Ok(())
    }

    /// shell 是否仍在运行
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    pub fn close(mut self) -> Result<()> {
        self.terminate();
        Ok(())
    }

    /// 信号阶梯：SIGHUP -> SIGTERM -> SIGKILL，均针对整个进程组
    ///
    /// shell 自己已经退出时，后台任务仍可能留在组里占着管道，
    /// 所以不看 shell 是否还活着，只看整组是否还有进程。
    /// 交互式 shell 会忽略 SIGTERM，所以先发 SIGHUP。
    fn terminate(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // 先关 stdin，shell 读到 EOF 也会退出
        self.stdin.take();

        let pgid = -(self.child.id() as i32);
        for (signal, grace) in [
            (libc::SIGHUP, Duration::from_millis(500)),
            (libc::SIGTERM, Duration::from_millis(500)),
            (libc::SIGKILL, Duration::from_millis(500)),
        ] {
            // ESRCH：整组已经不存在
            if unsafe { libc::kill(pgid, signal) } != 0 {
                break;
            }
            if self.wait_for_group_exit(pgid, grace) {
                break;
            }
        }
        let _ = self.child.wait();

        // 逃出进程组的孙进程可能还占着管道，读线程最多等一会儿，之后不再等待
        let deadline = Instant::now() + READER_JOIN_TIMEOUT;
        for handle in self.readers.drain(..) {
            while !handle.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(20));
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                log::warn!("终端输出线程未退出，放弃等待");
            }
        }
        log::info!("终端会话已关闭 (pid {})", self.child.id());
    }

    /// 回收 shell 并检查组内是否还有进程
    fn wait_for_group_exit(&mut self, pgid: i32, grace: Duration) -> bool {
        let deadline = Instant::now() + grace;
        loop {
            // 未回收的僵尸 shell 也算组成员
            let _ = self.child.try_wait();
            if unsafe { libc::kill(pgid, 0) } != 0 {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn echoes_through_the_output_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = TerminalSession::open("sh", tx).unwrap();
        session.write(b"echo anypkg-$((20+22))\n").unwrap();

        let mut seen = Vec::new();
        while let Some(chunk) = rx.blocking_recv() {
            seen.extend_from_slice(&chunk);
            if String::from_utf8_lossy(&seen).contains("anypkg-42") {
                break;
            }
        }
        assert!(String::from_utf8_lossy(&seen).contains("anypkg-42"));
        session.close().unwrap();
    }

    #[test]
    fn drop_kills_the_shell() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = TerminalSession::open("sh", tx).unwrap();
        let pid = session.pid() as i32;
        drop(session);
        // 已回收，进程不存在
        assert_ne!(unsafe { libc::kill(pid, 0) }, 0);
    }

    #[test]
    fn close_kills_background_jobs_after_shell_exit() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut session = TerminalSession::open("sh", tx).unwrap();
        session.write(b"sleep 20 &\nexit\n").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while session.is_alive() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(50));
        }
        assert!(!session.is_alive());

        let started = Instant::now();
        session.close().unwrap();
        assert!(started.elapsed() < Duration::from_secs(5), "{:?}", started.elapsed());
    }

    #[test]
    fn missing_shell_is_terminal_error() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = TerminalSession::open("/no/such/shell", tx).err().unwrap();
        assert!(matches!(err, Error::Terminal(_)));
    }
}

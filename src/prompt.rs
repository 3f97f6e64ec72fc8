//! 密码输入
//!
//! 读到的明文直接包进 [`Credential`]，不落盘、不进日志。

use crate::error::{Error, Result};
use crate::package_manager::Credential;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{BufRead, Write};

/// 恢复终端模式，提前返回或 panic 时也会执行
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().map_err(|e| Error::Prompt(e.to_string()))?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// 在终端上不回显地读取密码
pub fn read_credential(label: &str) -> Result<Credential> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{}", label)?;
    stderr.flush()?;

    let mut secret = String::new();
    {
        let _guard = RawModeGuard::enable()?;
        loop {
            let ev = event::read().map_err(|e| Error::Prompt(e.to_string()))?;
            let Event::Key(KeyEvent { code, modifiers, kind, .. }) = ev else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Enter => break,
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    drop(Credential::new(secret));
                    let _ = writeln!(stderr, "\r");
                    return Err(Error::Prompt("已取消".to_string()));
                }
                KeyCode::Backspace => {
                    secret.pop();
                }
                KeyCode::Char(c) => secret.push(c),
                _ => {}
            }
        }
    }
    writeln!(stderr)?;
    Ok(Credential::new(secret))
}

/// 从输入流读一行作为密码（`--password-stdin`），去掉行尾换行
pub fn read_credential_line(mut reader: impl BufRead) -> Result<Credential> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Credential::new(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn stdin_line_strips_newline() {
        let credential = read_credential_line(Cursor::new("s3cret\r\nignored\n")).unwrap();
        assert_eq!(credential.expose(), "s3cret");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
    }

    #[test]
    fn empty_stdin_is_empty_credential() {
        assert!(read_credential_line(Cursor::new("")).unwrap().is_empty());
    }
}

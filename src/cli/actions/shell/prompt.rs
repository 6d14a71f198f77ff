//! Line and password input. Reads run on the blocking pool so the runtime
//! keeps driving background work (startup reconciliation) while the user
//! types.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::io::{self, BufRead, IsTerminal, Write};

/// Typing this at any form prompt abandons the form.
pub const CANCEL: &str = ":q";

/// Reads one line after printing `prompt`. `None` on end of input.
pub async fn line(prompt: &str) -> Result<Option<String>> {
    let prompt = prompt.to_string();
    tokio::task::spawn_blocking(move || read_line(&prompt))
        .await
        .context("input task failed")?
}

/// Reads a line without echoing it when stdin is a terminal.
pub async fn secret(prompt: &str) -> Result<Option<String>> {
    let prompt = prompt.to_string();
    tokio::task::spawn_blocking(move || {
        if io::stdin().is_terminal() {
            read_hidden(&prompt)
        } else {
            read_line(&prompt)
        }
    })
    .await
    .context("input task failed")?
}

fn read_line(prompt: &str) -> Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;

    let mut buffer = String::new();
    let read = io::stdin().lock().read_line(&mut buffer)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(buffer.trim_end_matches(['\r', '\n']).to_string()))
}

fn read_hidden(prompt: &str) -> Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;

    enable_raw_mode().context("failed to enable raw mode")?;
    let result = collect_hidden();
    disable_raw_mode().context("failed to restore terminal")?;
    writeln!(stdout)?;
    result
}

fn collect_hidden() -> Result<Option<String>> {
    let mut buffer = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(Some(buffer)),
            KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(None)
            }
            KeyCode::Char(ch) => buffer.push(ch),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Esc => return Ok(Some(CANCEL.to_string())),
            _ => {}
        }
    }
}

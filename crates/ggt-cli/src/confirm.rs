//! Keep-or-revert countdown prompt.

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, queue};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tracing::warn;

/// Seconds the user has to accept a change.
pub const COUNTDOWN_SECONDS: u32 = 10;

/// A key press relevant to the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character.
    Char(char),
    /// Ctrl-C.
    Interrupt,
    /// Anything else.
    Other,
}

/// Source of key presses.
pub trait KeySource {
    /// Waits up to `timeout` for a key. `Ok(None)` means the time ran out.
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<Key>>;
}

/// Reads keys from the terminal in raw mode.
///
/// Raw mode is enabled on construction and restored on drop.
pub struct CrosstermKeys {
    _private: (),
}

impl CrosstermKeys {
    /// Switches the terminal to raw mode.
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for CrosstermKeys {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl KeySource for CrosstermKeys {
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<Key>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                return Ok(None);
            }
            // Resize, focus and release events do not answer the prompt.
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            return Ok(Some(match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Key::Interrupt
                }
                KeyCode::Char(c) => Key::Char(c),
                _ => Key::Other,
            }));
        }
    }
}

/// Counts down from `seconds` asking whether to keep the new settings.
///
/// Only `y` keeps them. Any other key, Ctrl-C or the countdown running out
/// declines.
pub fn ask_keep_changes<K, W>(keys: &mut K, out: &mut W, seconds: u32) -> io::Result<bool>
where
    K: KeySource,
    W: Write,
{
    for remaining in (1..=seconds).rev() {
        queue!(out, cursor::MoveToColumn(0), terminal::Clear(ClearType::CurrentLine))?;
        write!(
            out,
            "Settings will revert in {remaining} seconds... Keep these changes? [y/N] "
        )?;
        out.flush()?;

        match keys.next_key(Duration::from_secs(1))? {
            None => continue,
            Some(Key::Char('y')) => {
                write!(out, "y\r\n")?;
                return Ok(true);
            }
            Some(_) => {
                write!(out, "\r\n")?;
                return Ok(false);
            }
        }
    }
    write!(out, "\r\n")?;
    out.flush()?;
    Ok(false)
}

/// Runs the countdown on the terminal. Prompt failures decline the change.
pub fn confirm_interactively() -> bool {
    let answer = CrosstermKeys::new()
        .and_then(|mut keys| ask_keep_changes(&mut keys, &mut io::stdout(), COUNTDOWN_SECONDS));
    match answer {
        Ok(keep) => keep,
        Err(e) => {
            warn!(error = %e, "Confirmation prompt failed");
            false
        }
    }
}

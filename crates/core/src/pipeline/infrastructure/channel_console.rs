use std::io::Write;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::pipeline::operator_console::{OperatorCommand, OperatorConsole, OperatorKey};

const KEY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Operator console fed by a key channel.
///
/// With [`ChannelConsole::terminal`], the terminal is put in raw mode and a
/// reader thread forwards each key press as it happens; it holds no kiosk
/// state. Raw mode is left again on drop. A dropped sender reads as quit.
pub struct ChannelConsole {
    keys: Receiver<OperatorKey>,
    out: Box<dyn Write + Send>,
    raw_mode: bool,
}

impl ChannelConsole {
    pub fn new(keys: Receiver<OperatorKey>, out: Box<dyn Write + Send>) -> Self {
        Self {
            keys,
            out,
            raw_mode: false,
        }
    }

    /// Fails when there is no controlling terminal.
    pub fn terminal() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        let (tx, rx) = crossbeam_channel::unbounded();
        spawn_key_reader(tx);
        Ok(Self {
            keys: rx,
            out: Box::new(std::io::stdout()),
            raw_mode: true,
        })
    }

    /// Raw mode turns off output post-processing, so newlines need an
    /// explicit carriage return.
    fn write_text(&mut self, text: &str) {
        let text = if self.raw_mode {
            text.replace('\n', "\r\n")
        } else {
            text.to_string()
        };
        if let Err(e) = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
        {
            log::warn!("Failed to write to operator console: {e}");
        }
    }
}

impl Drop for ChannelConsole {
    fn drop(&mut self) {
        if self.raw_mode {
            if let Err(e) = terminal::disable_raw_mode() {
                log::warn!("Failed to restore terminal mode: {e}");
            }
        }
    }
}

fn spawn_key_reader(tx: Sender<OperatorKey>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        loop {
            match event::poll(KEY_POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    log::warn!("Terminal input failed: {e}");
                    break;
                }
            }
            let key = match event::read() {
                Ok(Event::Key(key)) => map_key(key),
                Ok(_) => None,
                Err(e) => {
                    log::warn!("Terminal input failed: {e}");
                    break;
                }
            };
            let Some(key) = key else {
                continue;
            };
            if tx.send(key).is_err() {
                break;
            }
        }
        log::debug!("Operator input closed");
    })
}

/// Presses only; repeats, releases and unbound keys are dropped.
fn map_key(key: KeyEvent) -> Option<OperatorKey> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c' | 'd') => Some(OperatorKey::Interrupt),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char(c) => Some(OperatorKey::Char(c)),
        KeyCode::Enter => Some(OperatorKey::Enter),
        KeyCode::Backspace => Some(OperatorKey::Backspace),
        KeyCode::Esc => Some(OperatorKey::Escape),
        _ => None,
    }
}

impl OperatorConsole for ChannelConsole {
    fn poll_command(&mut self) -> Option<OperatorCommand> {
        match self.keys.try_recv() {
            Ok(key) => Some(OperatorCommand::from_key(key)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(OperatorCommand::Quit),
        }
    }

    /// Echoes typed characters. Escape abandons the line (empty result);
    /// Ctrl+C or closed input gives `None`.
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.write_text(prompt);
        let mut line = String::new();
        loop {
            match self.keys.recv().ok()? {
                OperatorKey::Char(c) => {
                    line.push(c);
                    self.write_text(c.encode_utf8(&mut [0u8; 4]));
                }
                OperatorKey::Backspace => {
                    if line.pop().is_some() {
                        self.write_text("\u{8} \u{8}");
                    }
                }
                OperatorKey::Enter => {
                    self.write_text("\n");
                    return Some(line);
                }
                OperatorKey::Escape => {
                    self.write_text("\n");
                    return Some(String::new());
                }
                OperatorKey::Interrupt => {
                    self.write_text("\n");
                    return None;
                }
            }
        }
    }

    fn report(&mut self, message: &str) {
        self.write_text(message);
        self.write_text("\n");
    }
}

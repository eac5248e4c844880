/// One key press on the operator terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorKey {
    Char(char),
    Enter,
    Backspace,
    Escape,
    /// Ctrl+C; raw terminal mode delivers it as a key, not a signal.
    Interrupt,
}

/// Single-key operator command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorCommand {
    Quit,
    OpenMenu,
    Cancel,
    Other(OperatorKey),
}

impl OperatorCommand {
    pub fn from_key(key: OperatorKey) -> Self {
        match key {
            OperatorKey::Char('q' | 'Q') | OperatorKey::Interrupt => OperatorCommand::Quit,
            OperatorKey::Char('m' | 'M') => OperatorCommand::OpenMenu,
            OperatorKey::Escape => OperatorCommand::Cancel,
            other => OperatorCommand::Other(other),
        }
    }
}

/// Operator-facing terminal.
///
/// `None` from either read means the input is gone; callers treat that
/// as a quit.
pub trait OperatorConsole: Send {
    /// Non-blocking; `Some(Quit)` once input has closed.
    fn poll_command(&mut self) -> Option<OperatorCommand>;

    /// Blocks until the operator finishes a line with Enter.
    fn read_line(&mut self, prompt: &str) -> Option<String>;

    fn report(&mut self, message: &str);
}

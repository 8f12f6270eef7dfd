// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Boot Console Seam
// ─────────────────────────────────────────────────────────────────────
//! Single-character, non-blocking input used only during the handshake
//! to let an operator pick the bridge mode.

/// Non-blocking byte source.
pub trait BootConsole {
    /// Returns `None` when no byte is pending.
    fn poll_byte(&mut self) -> Option<u8>;
}

impl<F> BootConsole for F
where
    F: FnMut() -> Option<u8>,
{
    fn poll_byte(&mut self) -> Option<u8> {
        self()
    }
}

/// Operator selection parsed from a console byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorChoice {
    Simulation,
    Hardware,
}

impl OperatorChoice {
    /// `s`/`S` selects simulation, `h`/`H` hardware; anything else is ignored.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b's' | b'S' => Some(OperatorChoice::Simulation),
            b'h' | b'H' => Some(OperatorChoice::Hardware),
            _ => None,
        }
    }
}

/// A console nobody types on. The boot window always runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentConsole;

impl BootConsole for SilentConsole {
    fn poll_byte(&mut self) -> Option<u8> {
        None
    }
}

/// Delivers one byte on a given poll, nothing otherwise.
#[derive(Debug, Clone)]
pub struct ScriptedConsole {
    byte: u8,
    at_poll: u32,
    polls: u32,
}

impl ScriptedConsole {
    /// Deliver `byte` on the `at_poll`-th poll (1-based).
    pub fn new(byte: u8, at_poll: u32) -> Self {
        Self {
            byte,
            at_poll,
            polls: 0,
        }
    }

    /// Deliver `byte` on the first poll.
    pub fn immediate(byte: u8) -> Self {
        Self::new(byte, 1)
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }
}

impl BootConsole for ScriptedConsole {
    fn poll_byte(&mut self) -> Option<u8> {
        self.polls = self.polls.saturating_add(1);
        (self.polls == self.at_poll).then_some(self.byte)
    }
}

// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore CPU Relax Primitive
// ─────────────────────────────────────────────────────────────────────
//! The single yield primitive used by every busy-wait in the kernel.

/// Yield hint issued between polls, plus the terminal low-power halt.
pub trait Relax {
    /// One spin-wait hint.
    fn relax(&mut self);

    /// Park the execution context forever.
    fn halt(&mut self) -> ! {
        loop {
            self.relax();
        }
    }
}

impl<X: Relax + ?Sized> Relax for &mut X {
    fn relax(&mut self) {
        (**self).relax()
    }

    fn halt(&mut self) -> ! {
        (**self).halt()
    }
}

/// Architecture spin-loop hint (`pause` on x86, `yield` on aarch64).
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinRelax;

impl Relax for SpinRelax {
    #[inline]
    fn relax(&mut self) {
        core::hint::spin_loop();
    }
}

/// Counts hints instead of spinning. Host-side runs and tests use it to
/// observe how long each wait took.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingRelax {
    hints: u64,
}

impl CountingRelax {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hints(&self) -> u64 {
        self.hints
    }
}

impl Relax for CountingRelax {
    #[inline]
    fn relax(&mut self) {
        self.hints += 1;
    }
}

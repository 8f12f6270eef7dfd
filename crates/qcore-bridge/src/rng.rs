// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Simulation Pseudo-Random Source
// ─────────────────────────────────────────────────────────────────────

/// Linear congruential generator with the classic `rand()` constants.
///
/// Deterministic from the seed, so a simulated run replays bit-for-bit.
/// Each draw yields 15 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudoRng {
    state: u32,
}

impl PseudoRng {
    const MULTIPLIER: u32 = 1_103_515_245;
    const INCREMENT: u32 = 12_345;

    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next 15-bit value in `0..32768`.
    #[inline]
    pub fn next_u15(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        (self.state / 65_536) % 32_768
    }

    /// Next collapse outcome, 0 or 1.
    #[inline]
    pub fn next_bit(&mut self) -> u8 {
        (self.next_u15() % 2) as u8
    }

    /// A full 32-bit word assembled from three draws.
    pub fn next_word(&mut self) -> u32 {
        let hi = self.next_u15();
        let mid = self.next_u15();
        let lo = self.next_u15();
        (hi << 17) | (mid << 2) | (lo & 0x3)
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for PseudoRng {
    fn default() -> Self {
        Self::new(1)
    }
}

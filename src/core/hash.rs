//! State hashing for determinism verification.
//!
//! Wraps SHA-256 with helpers for the primitive types that make up game
//! state. Order of updates is critical: hashing the same fields in a
//! different order produces a different digest even for equal state.

use sha2::{Digest, Sha256};

/// Hash output type (256 bits / 32 bytes).
pub type StateHash = [u8; 32];

/// Deterministic hasher for game state.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Hasher scoped to a match's player/projectile state.
    pub fn for_match_state() -> Self {
        Self::new(b"PVP_CORE_STATE_V1")
    }

    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// `f32` values are hashed by bit pattern, not formatted text, so NaN
    /// payloads and negative zero hash consistently within one process.
    #[inline]
    pub fn update_f32(&mut self, value: f32) {
        self.hasher.update(value.to_bits().to_le_bytes());
    }

    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.update_u32(value.len() as u32);
        self.update_bytes(value.as_bytes());
    }

    pub fn finalize(self) -> StateHash {
        let digest = self.hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_sensitive() {
        let mut a = StateHasher::for_match_state();
        a.update_u32(1);
        a.update_u32(2);

        let mut b = StateHasher::for_match_state();
        b.update_u32(2);
        b.update_u32(1);

        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn deterministic_repeat() {
        let mut a = StateHasher::for_match_state();
        a.update_f32(1.5);
        a.update_str("player-a");

        let mut b = StateHasher::for_match_state();
        b.update_f32(1.5);
        b.update_str("player-a");

        assert_eq!(a.finalize(), b.finalize());
    }
}

use sha2::{Digest, Sha256};

/// Upper bound on resampling when a raw draw falls in the biased zone.
/// With a 128-bit draw the zone is at most half the space, so running out of
/// attempts is astronomically unlikely.
const MAX_RESAMPLES: u8 = 8;

/// A source of bounded pseudo-random integers.
///
/// Allocators only ever see this trait; where the entropy comes from is the
/// host's business.
pub trait RandomnessSource {
    /// Returns an integer uniformly distributed in `[0, modulus)`.
    /// A modulus of 0 or 1 always yields 0.
    fn next_below(&mut self, modulus: u128) -> u128;
}

/// Counter-mode generator over SHA-256.
///
/// Block `n` is `sha256(seed || n_be)`; each draw consumes one block (more
/// when resampling). Deterministic for a given seed, so callers must derive a
/// fresh seed for every call.
#[derive(Clone, Debug)]
pub struct Sha256Rng {
    seed: [u8; 32],
    counter: u64,
}

impl Sha256Rng {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self { seed, counter: 0 }
    }

    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }

    fn next_block(&mut self) -> u128 {
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(self.counter.to_be_bytes());
        self.counter += 1;
        let digest: [u8; 32] = hasher.finalize().into();

        let mut head = [0u8; 16];
        head.copy_from_slice(&digest[0..16]);
        u128::from_be_bytes(head)
    }
}

impl RandomnessSource for Sha256Rng {
    fn next_below(&mut self, modulus: u128) -> u128 {
        if modulus <= 1 {
            return 0;
        }
        if modulus.is_power_of_two() {
            return self.next_block() & (modulus - 1);
        }

        // 2^128 mod modulus: values below this are the over-represented tail.
        let threshold = modulus.wrapping_neg() % modulus;
        let mut value = self.next_block();
        for _ in 0..MAX_RESAMPLES {
            if value >= threshold {
                break;
            }
            value = self.next_block();
        }
        value % modulus
    }
}

/// Accumulates entropy inputs into a 32-byte seed.
///
/// Every input is length-prefixed so that adjacent fields cannot be shifted
/// into one another.
pub struct SeedBuilder {
    hasher: Sha256,
}

impl SeedBuilder {
    pub fn new(domain: &[u8]) -> Self {
        let mut builder = Self {
            hasher: Sha256::new(),
        };
        builder.absorb(domain);
        builder
    }

    pub fn mix(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.absorb(bytes.as_ref());
        self
    }

    pub fn finish(self) -> [u8; 32] {
        self.hasher.finalize().into()
    }

    fn absorb(&mut self, bytes: &[u8]) {
        self.hasher.update((bytes.len() as u64).to_be_bytes());
        self.hasher.update(bytes);
    }
}

/// Hex form of a seed, for event attributes.
pub fn seed_hex(seed: &[u8; 32]) -> String {
    hex::encode(seed)
}

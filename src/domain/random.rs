//! Random text generation used by fake builders.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of random text.
pub trait Random {
    /// A short lowercase token; `length` fixes the number of characters.
    fn chars(&mut self, length: Option<usize>) -> String;
    /// Sentences of random words; `sentences` fixes the sentence count.
    fn paragraphs(&mut self, sentences: Option<usize>) -> String;
}

/// [`Random`] backed by a seedable `rand` generator.
pub struct RandRandom {
    rng: StdRng,
}

impl RandRandom {
    /// Generator seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic generator for reproducible fixtures.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn sentence(&mut self) -> String {
        let words = self.rng.random_range(12..=18);
        let mut sentence = (0..words)
            .map(|_| self.chars(None))
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(first) = sentence.get(0..1).map(str::to_uppercase) {
            sentence.replace_range(0..1, &first);
        }
        sentence.push('.');
        sentence
    }
}

impl Default for RandRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl Random for RandRandom {
    fn chars(&mut self, length: Option<usize>) -> String {
        let length = length.unwrap_or_else(|| self.rng.random_range(3..=9));
        (0..length)
            .map(|_| char::from(self.rng.random_range(b'a'..=b'z')))
            .collect()
    }

    fn paragraphs(&mut self, sentences: Option<usize>) -> String {
        let sentences = sentences.unwrap_or_else(|| self.rng.random_range(3..=7));
        (0..sentences)
            .map(|_| self.sentence())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

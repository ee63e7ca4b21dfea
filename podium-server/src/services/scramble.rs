//! Question masking
//!
//! Until a question is revealed its text is shown with every character
//! except spaces, `?` and `.` replaced by a random alphanumeric, keeping
//! the shape of the sentence.

use rand::distributions::{Alphanumeric, Distribution};
use rand::Rng;

fn is_kept(c: char) -> bool {
    matches!(c, ' ' | '?' | '.')
}

/// Scramble with the thread-local RNG
pub fn scramble(text: &str) -> String {
    scramble_with(text, &mut rand::thread_rng())
}

pub fn scramble_with<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    text.chars()
        .map(|c| {
            if is_kept(c) {
                c
            } else {
                char::from(Alphanumeric.sample(rng))
            }
        })
        .collect()
}

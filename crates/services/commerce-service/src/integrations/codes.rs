//! Shortcode string generation.

use rand::Rng;

use domain::SHORTCODE_ATTEMPTS_PER_LENGTH;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Produces candidate codes; uniqueness is checked by the caller.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait CodeGenerator: Send + Sync {
    /// Candidate for the given zero-based attempt
    fn generate(&self, attempt: usize) -> String;
}

/// Random numeric codes that grow one digit every few failed attempts.
#[derive(Debug, Clone)]
pub struct RandomCodeGenerator {
    base_length: usize,
}

impl RandomCodeGenerator {
    pub fn new(base_length: usize) -> Self {
        Self {
            base_length: base_length.max(1),
        }
    }

    pub fn length_for(&self, attempt: usize) -> usize {
        self.base_length + attempt / SHORTCODE_ATTEMPTS_PER_LENGTH
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self, attempt: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length_for(attempt))
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_numeric_with_the_base_length() {
        let generator = RandomCodeGenerator::new(4);
        let code = generator.generate(0);
        assert_eq!(code.len(), 4);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn length_grows_after_repeated_collisions() {
        let generator = RandomCodeGenerator::new(4);
        assert_eq!(generator.length_for(SHORTCODE_ATTEMPTS_PER_LENGTH - 1), 4);
        assert_eq!(generator.length_for(SHORTCODE_ATTEMPTS_PER_LENGTH), 5);
        assert_eq!(generator.generate(SHORTCODE_ATTEMPTS_PER_LENGTH * 2).len(), 6);
    }
}

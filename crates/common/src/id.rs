//! ID generation utilities.

use rand::Rng;
use rand::distributions::Alphanumeric;
use ulid::Ulid;

/// Length of generated confirmation codes.
const CONFIRMATION_CODE_LEN: usize = 10;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a random one-time confirmation code.
    ///
    /// Alphanumeric so the code survives being typed back from an email.
    #[must_use]
    pub fn generate_confirmation_code(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(CONFIRMATION_CODE_LEN)
            .map(char::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
        // Note: ULIDs generated rapidly within the same millisecond
        // may not be strictly ordered due to the random component
    }

    #[test]
    fn test_generate_confirmation_code() {
        let id_gen = IdGenerator::new();
        let code1 = id_gen.generate_confirmation_code();
        let code2 = id_gen.generate_confirmation_code();

        assert_eq!(code1.len(), CONFIRMATION_CODE_LEN);
        assert!(code1.chars().all(char::is_alphanumeric));
        assert_ne!(code1, code2);
    }
}

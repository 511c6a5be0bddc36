//! Room code generation.
//!
//! Codes are four symbols from an alphabet with the look-alikes removed
//! (no `I`, `O`, `0`, `1`), so they survive being read out loud or copied
//! off a TV screen. That leaves 32 symbols and 32^4 ≈ 1M codes.

use rand::Rng;
use roomrelay_protocol::RoomCode;

use crate::RoomError;

/// Symbols a generated code is drawn from.
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a generated code.
pub const CODE_LENGTH: usize = 4;

/// Draws one random code string. It may collide with an active room.
pub fn random_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

/// Draws codes until `is_taken` says no, giving up after `max_attempts`.
///
/// # Errors
/// [`RoomError::CodeSpaceExhausted`] when every draw collided.
pub fn generate_code<R, F>(
    rng: &mut R,
    is_taken: F,
    max_attempts: u32,
) -> Result<RoomCode, RoomError>
where
    R: Rng + ?Sized,
    F: Fn(&RoomCode) -> bool,
{
    for _ in 0..max_attempts {
        let Some(code) = RoomCode::normalize(&random_code(rng)) else {
            continue;
        };
        if !is_taken(&code) {
            return Ok(code);
        }
    }
    tracing::warn!(attempts = max_attempts, "room code space exhausted");
    Err(RoomError::CodeSpaceExhausted {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_random_code_uses_alphabet_only() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let code = random_code(&mut rng);
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_alphabet_has_no_look_alikes() {
        for banned in [b'I', b'O', b'0', b'1'] {
            assert!(!ALPHABET.contains(&banned));
        }
    }

    #[test]
    fn test_generate_code_retries_on_collision() {
        let mut rng = StdRng::seed_from_u64(1);
        let calls = Cell::new(0);

        let code = generate_code(
            &mut rng,
            |_| {
                calls.set(calls.get() + 1);
                calls.get() < 3
            },
            10,
        )
        .expect("third draw is free");

        assert_eq!(calls.get(), 3);
        assert_eq!(code.as_str().len(), CODE_LENGTH);
    }

    #[test]
    fn test_generate_code_exhausted_returns_error() {
        let mut rng = StdRng::seed_from_u64(2);
        let result = generate_code(&mut rng, |_| true, 25);
        assert!(matches!(
            result,
            Err(RoomError::CodeSpaceExhausted { attempts: 25 })
        ));
    }
}

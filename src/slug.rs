//! Slug generation for public paste URLs.
//!
//! A slug is a compact, URL-safe identifier assigned to a paste exactly
//! once, at first persistence. No uniqueness check is performed against
//! existing slugs; at the expected corpus size the collision probability
//! is negligible.

use rand::Rng;

/// Length of every generated slug.
pub const SLUG_LEN: usize = 8;

/// URL-safe alphabet: `A-Za-z0-9_-`, 64 symbols.
const SLUG_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Returns a fresh 8-character slug drawn from the URL-safe alphabet.
///
/// Uses `thread_rng`, a CSPRNG, so slugs are not guessable from earlier
/// ones.
pub fn generate_slug() -> String {
    let mut rng = rand::thread_rng();
    (0..SLUG_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..SLUG_ALPHABET.len());
            SLUG_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_has_fixed_length() {
        assert_eq!(generate_slug().len(), SLUG_LEN);
    }

    #[test]
    fn slug_uses_url_safe_alphabet() {
        for _ in 0..100 {
            let slug = generate_slug();
            assert!(slug
                .bytes()
                .all(|b| SLUG_ALPHABET.contains(&b)), "bad slug: {slug}");
        }
    }

    #[test]
    fn slugs_differ_across_calls() {
        // 64^8 possibilities; two equal draws would indicate a broken rng.
        assert_ne!(generate_slug(), generate_slug());
    }
}

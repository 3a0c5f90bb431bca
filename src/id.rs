use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const CODE_LEN: usize = 6;

/// Draws a fresh short code: `CODE_LEN` independent uniform picks from `[A-Z0-9]`.
///
/// Not cryptographically secure; uniqueness is enforced by the store's
/// conditional insert, not by the generator.
pub fn new_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const REFERENCE_LEN: usize = 6;

/// Random 6-character booking reference drawn from `A-Z0-9`.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..REFERENCE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Normalises a reference typed by a traveller; `None` if it can't be one.
pub fn normalize(input: &str) -> Option<String> {
    let r = input.trim().to_ascii_uppercase();
    (r.len() == REFERENCE_LEN && r.bytes().all(|b| ALPHABET.contains(&b))).then_some(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn generated_references_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let r = generate(&mut rng);
            assert_eq!(r.len(), REFERENCE_LEN);
            assert!(r.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
            assert_eq!(normalize(&r).as_deref(), Some(r.as_str()));
        }
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let a = generate(&mut StdRng::seed_from_u64(42));
        let b = generate(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn normalize_accepts_lowercase_and_rejects_junk() {
        assert_eq!(normalize(" ab12cd ").as_deref(), Some("AB12CD"));
        assert!(normalize("AB12C").is_none());
        assert!(normalize("AB12CD7").is_none());
        assert!(normalize("AB-2CD").is_none());
    }
}

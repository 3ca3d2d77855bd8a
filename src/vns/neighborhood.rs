//! Riffle neighborhood over the production phase.

use rand::Rng;

use crate::phase::Group;

/// Randomly interleaves `lead` and `trail`, preserving each one's order.
///
/// At every step an unbiased coin picks the half that contributes its next
/// element; once a half is exhausted the other one supplies the rest
/// without further flips. Returns the merged sequence and the group each
/// element came from.
pub fn riffle<E: Clone, R: Rng>(lead: &[E], trail: &[E], rng: &mut R) -> (Vec<E>, Vec<Group>) {
    let total = lead.len() + trail.len();
    let mut merged = Vec::with_capacity(total);
    let mut pattern = Vec::with_capacity(total);
    let (mut i, mut j) = (0, 0);

    while i < lead.len() || j < trail.len() {
        let take_lead = i < lead.len() && (j >= trail.len() || rng.random_bool(0.5));
        if take_lead {
            merged.push(lead[i].clone());
            pattern.push(Group::First);
            i += 1;
        } else {
            merged.push(trail[j].clone());
            pattern.push(Group::Second);
            j += 1;
        }
    }

    (merged, pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_riffle_preserves_relative_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let lead = [1, 2, 3];
        let trail = [10, 20, 30, 40];
        for _ in 0..50 {
            let (merged, pattern) = riffle(&lead, &trail, &mut rng);
            assert_eq!(merged.len(), 7);
            assert_eq!(pattern.len(), 7);
            let from_lead: Vec<i32> = merged.iter().copied().filter(|x| *x < 10).collect();
            let from_trail: Vec<i32> = merged.iter().copied().filter(|x| *x >= 10).collect();
            assert_eq!(from_lead, lead);
            assert_eq!(from_trail, trail);
        }
    }

    #[test]
    fn test_riffle_pattern_matches_sources() {
        let mut rng = StdRng::seed_from_u64(3);
        let (merged, pattern) = riffle(&['a', 'b'], &['x', 'y', 'z'], &mut rng);
        for (e, g) in merged.iter().zip(&pattern) {
            let expected = if e.is_ascii_lowercase() && *e < 'x' {
                Group::First
            } else {
                Group::Second
            };
            assert_eq!(*g, expected);
        }
    }

    #[test]
    fn test_riffle_with_empty_half() {
        let mut rng = StdRng::seed_from_u64(1);
        let (merged, pattern) = riffle::<u8, _>(&[], &[1, 2], &mut rng);
        assert_eq!(merged, vec![1, 2]);
        assert_eq!(pattern, vec![Group::Second, Group::Second]);
    }

    #[test]
    fn test_riffle_is_reproducible() {
        let a = riffle(&[1, 2, 3, 4], &[5, 6, 7, 8], &mut StdRng::seed_from_u64(9));
        let b = riffle(&[1, 2, 3, 4], &[5, 6, 7, 8], &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}

//! Phase composition of multi-batch schedules.
//!
//! A single-batch controllable sequence `S` of length `L` is doubled into
//! `D = S ++ S` and cut into three phases:
//!
//! | phase        | slice of `D`                         |
//! |--------------|--------------------------------------|
//! | `initial`    | `[0, L/2)`                           |
//! | `production` | `[L/2, L/2 + P)` with `P = 2*(L/2)+1` |
//! | `final`      | `[L/2 + P, 2L)`                      |
//!
//! The production phase covers a full quarter of `D` plus one boundary
//! event, which keeps odd/even alignment across the two copies of `S`. Its
//! counterpart, the *reversed production* phase, interleaves `initial` and
//! `final` by the inverted group pattern so consecutive batches pipeline.
//!
//! For `N` batches the template is
//! `initial ++ (production ++ reversed)^((N-1)/2) ++ tail` where the tail
//! is `production ++ final` for even `N` and the first `len(final)` events
//! of `production` for odd `N`.

/// Which of two groups an element is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Group {
    /// Group 0.
    First,
    /// Group 1.
    Second,
}

impl Group {
    /// The other group.
    pub fn inverted(self) -> Self {
        match self {
            Group::First => Group::Second,
            Group::Second => Group::First,
        }
    }
}

/// Inverts every entry of a group pattern.
pub fn invert(pattern: &[Group]) -> Vec<Group> {
    pattern.iter().map(|g| g.inverted()).collect()
}

/// Pattern of length `len`: `len - len/2` entries of [`Group::First`]
/// followed by `len/2` entries of [`Group::Second`].
pub fn masked_pattern(len: usize) -> Vec<Group> {
    let firsts = len - len / 2;
    (0..len)
        .map(|i| if i < firsts { Group::First } else { Group::Second })
        .collect()
}

/// Interleaves two groups following `pattern`.
///
/// Each entry consumes the next unused element of the named group. When
/// that group is exhausted the other group is used instead. The output has
/// `pattern.len()` elements unless both groups run out first.
pub fn assemble_by_pattern<E: Clone>(group0: &[E], group1: &[E], pattern: &[Group]) -> Vec<E> {
    let mut first = group0.iter();
    let mut second = group1.iter();
    let mut out = Vec::with_capacity(pattern.len());

    for group in pattern {
        let (preferred, fallback) = match group {
            Group::First => (&mut first, &mut second),
            Group::Second => (&mut second, &mut first),
        };
        match preferred.next().or_else(|| fallback.next()) {
            Some(e) => out.push(e.clone()),
            None => break,
        }
    }
    out
}

/// The three phases cut from a single-batch sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PhaseTemplate<E> {
    /// Events that start the pipeline.
    pub initial: Vec<E>,
    /// Steady-state events repeated for every pair of batches.
    pub production: Vec<E>,
    /// Events that drain the pipeline.
    pub final_phase: Vec<E>,
    /// Group pattern used to build the reversed production phase.
    pub pattern: Vec<Group>,
    base: Vec<E>,
}

impl<E: Clone> PhaseTemplate<E> {
    /// Splits `base` into initial, production and final phases.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_desplan::phase::PhaseTemplate;
    ///
    /// let t = PhaseTemplate::split(&[1, 2, 3, 4]);
    /// assert_eq!(t.initial, vec![1, 2]);
    /// assert_eq!(t.production, vec![3, 4, 1, 2, 3]);
    /// assert_eq!(t.final_phase, vec![4]);
    /// ```
    pub fn split(base: &[E]) -> Self {
        let len = base.len();
        let doubled: Vec<E> = base.iter().chain(base).cloned().collect();

        let initial_end = len / 2;
        let production_end = (initial_end + 2 * (len / 2) + 1).min(doubled.len());

        Self {
            initial: doubled[..initial_end].to_vec(),
            production: doubled[initial_end..production_end].to_vec(),
            final_phase: doubled[production_end..].to_vec(),
            pattern: masked_pattern(len),
            base: base.to_vec(),
        }
    }

    /// The sequence the template was cut from.
    pub fn base(&self) -> &[E] {
        &self.base
    }

    /// Length of the odd-batch tail, which is also where production is cut
    /// into its two halves.
    pub fn half_len(&self) -> usize {
        self.final_phase.len().min(self.production.len())
    }

    /// Leading `len(final)` events of the production phase.
    pub fn first_half(&self) -> &[E] {
        &self.production[..self.half_len()]
    }

    /// Production phase of the other parity, built from `initial` and
    /// `final` with the inverted `pattern`.
    pub fn reversed_production(&self, pattern: &[Group]) -> Vec<E> {
        assemble_by_pattern(&self.initial, &self.final_phase, &invert(pattern))
    }

    /// Full sequence for `batch_count` batches with the template's own
    /// production phase and pattern.
    pub fn assemble(&self, batch_count: usize) -> Vec<E> {
        self.assemble_with(&self.production, &self.pattern, batch_count)
    }

    /// Full sequence for `batch_count` batches with a substitute production
    /// phase and the pattern it was drawn with.
    ///
    /// A single batch returns the base sequence unchanged.
    pub fn assemble_with(
        &self,
        production: &[E],
        pattern: &[Group],
        batch_count: usize,
    ) -> Vec<E> {
        if batch_count <= 1 {
            return self.base.clone();
        }

        let repeats = (batch_count - 1) / 2;
        let reversed = self.reversed_production(pattern);
        let mut out = Vec::with_capacity(
            self.initial.len() + repeats * (production.len() + reversed.len()) + production.len(),
        );

        out.extend_from_slice(&self.initial);
        for _ in 0..repeats {
            out.extend_from_slice(production);
            out.extend_from_slice(&reversed);
        }
        if batch_count % 2 == 0 {
            out.extend_from_slice(production);
            out.extend_from_slice(&self.final_phase);
        } else {
            out.extend_from_slice(self.first_half());
        }
        out
    }
}

/// Builds the initial multi-batch candidate for `batch_count` batches.
///
/// `batch_count <= 1` returns `base` unchanged.
pub fn compose<E: Clone>(base: &[E], batch_count: usize) -> Vec<E> {
    PhaseTemplate::split(base).assemble(batch_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::Group::{First as Z, Second as O};

    #[test]
    fn test_split_matches_formulas() {
        let base = ["e1", "e2", "e3", "e4"];
        let d: Vec<&str> = base.iter().chain(&base).copied().collect();
        let t = PhaseTemplate::split(&base);
        // L = 4: initial = D[0..2), P = 5, production = D[2..7), final = D[7..8).
        assert_eq!(t.initial, d[0..2]);
        assert_eq!(t.production, d[2..7]);
        assert_eq!(t.final_phase, d[7..]);
        assert_eq!(t.initial, vec!["e1", "e2"]);
        assert_eq!(t.final_phase, vec!["e4"]);
    }

    #[test]
    fn test_split_odd_length() {
        let t = PhaseTemplate::split(&[1, 2, 3, 4, 5]);
        assert_eq!(t.initial, vec![1, 2]);
        assert_eq!(t.production, vec![3, 4, 5, 1, 2]);
        assert_eq!(t.final_phase, vec![3, 4, 5]);
        assert_eq!(t.pattern, vec![Z, Z, Z, O, O]);
    }

    #[test]
    fn test_split_degenerate_inputs() {
        let empty: PhaseTemplate<u8> = PhaseTemplate::split(&[]);
        assert!(empty.initial.is_empty());
        assert!(empty.production.is_empty());
        assert!(empty.final_phase.is_empty());

        let single = PhaseTemplate::split(&[7]);
        assert!(single.initial.is_empty());
        assert_eq!(single.production, vec![7]);
        assert_eq!(single.final_phase, vec![7]);
    }

    #[test]
    fn test_masked_pattern() {
        assert_eq!(masked_pattern(4), vec![Z, Z, O, O]);
        assert_eq!(masked_pattern(3), vec![Z, Z, O]);
        assert!(masked_pattern(0).is_empty());
    }

    #[test]
    fn test_assemble_by_pattern_interleaves() {
        let out = assemble_by_pattern(&['a', 'b'], &['x', 'y'], &[Z, O, O, Z]);
        assert_eq!(out, vec!['a', 'x', 'y', 'b']);
    }

    #[test]
    fn test_assemble_by_pattern_falls_back() {
        let out = assemble_by_pattern(&['a', 'b', 'c'], &['x'], &[O, O, O, Z]);
        assert_eq!(out, vec!['x', 'a', 'b', 'c']);
    }

    #[test]
    fn test_assemble_by_pattern_stops_when_both_exhausted() {
        let out = assemble_by_pattern(&['a'], &['x'], &[Z, Z, Z]);
        assert_eq!(out, vec!['a', 'x']);
    }

    #[test]
    fn test_compose_single_batch_is_identity() {
        let base = vec![1, 2, 3, 4, 5, 6];
        assert_eq!(compose(&base, 1), base);
    }

    #[test]
    fn test_compose_two_batches() {
        let t = PhaseTemplate::split(&[1, 2, 3, 4]);
        let out = t.assemble(2);
        // initial ++ production ++ final
        assert_eq!(out, vec![1, 2, 3, 4, 1, 2, 3, 4]);
    }

    #[test]
    fn test_compose_three_batches() {
        let t = PhaseTemplate::split(&[1, 2, 3, 4]);
        // Inverted pattern [O, O, Z, Z] over initial [1, 2] and final [4]:
        // final runs dry after one element, the rest falls back to initial.
        assert_eq!(t.reversed_production(&t.pattern), vec![4, 1, 2]);
        let out = t.assemble(3);
        assert_eq!(out, vec![1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3]);
    }

    #[test]
    fn test_compose_four_batches_tail() {
        let t = PhaseTemplate::split(&[1, 2, 3, 4]);
        let out = t.assemble(4);
        let mut expected = vec![1, 2];
        expected.extend([3, 4, 1, 2, 3]);
        expected.extend([4, 1, 2]);
        expected.extend([3, 4, 1, 2, 3]);
        expected.push(4);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_assemble_with_substitute_production() {
        let t = PhaseTemplate::split(&[1, 2, 3, 4]);
        let out = t.assemble_with(&[9, 9, 9, 9, 9], &[Z, O, Z, O, Z], 2);
        assert_eq!(out, vec![1, 2, 9, 9, 9, 9, 9, 4]);
    }
}

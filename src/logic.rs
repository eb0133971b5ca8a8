use std::ops::{Index, Not};

use itertools::Itertools;

pub(crate) fn exactly_one<L>(lits: Vec<L>) -> Vec<Vec<L>>
where
    L: Copy + Not<Output = L>,
{
    let mut clauses = Vec::with_capacity(lits.len() * (lits.len() + 1) / 2 + 1);

    // no two are true; (!A + !B) * (!A + !C) * ...
    clauses.extend(lits.iter()
        .combinations(2)
        .map(|pair| vec![!**pair.index(0), !**pair.index(1)])
    );
    // at least one is true; A + B + C + ...
    // with no literals at all this is the empty clause, which nothing satisfies
    clauses.push(lits);

    clauses
}

/// Clauses stating no more than `bound` of `lits` are true, using Sinz's sequential counter.
///
/// `fresh` is called for every auxiliary register literal the encoding needs.
pub(crate) fn at_most<L, F>(lits: &[L], bound: usize, mut fresh: F) -> Vec<Vec<L>>
where
    L: Copy + Not<Output = L>,
    F: FnMut() -> L,
{
    let n = lits.len();
    if n <= bound {
        return Vec::new();
    }
    if bound == 0 {
        return lits.iter().map(|lit| vec![!*lit]).collect_vec();
    }

    // registers[i][j] holds "at least j + 1 of lits[0..=i] are true"
    let registers = (0..n - 1)
        .map(|_| (0..bound).map(|_| fresh()).collect_vec())
        .collect_vec();

    let mut clauses = Vec::with_capacity(at_most_size(n, bound).1);

    clauses.push(vec![!lits[0], registers[0][0]]);
    clauses.extend((1..bound).map(|j| vec![!registers[0][j]]));

    for i in 1..n - 1 {
        let (x, prev, cur) = (lits[i], &registers[i - 1], &registers[i]);

        clauses.push(vec![!x, cur[0]]);
        clauses.push(vec![!prev[0], cur[0]]);
        for j in 1..bound {
            // x with j earlier trues makes j + 1
            clauses.push(vec![!x, !prev[j - 1], cur[j]]);
            clauses.push(vec![!prev[j], cur[j]]);
        }
        // overflow
        clauses.push(vec![!x, !prev[bound - 1]]);
    }

    clauses.push(vec![!lits[n - 1], !registers[n - 2][bound - 1]]);

    clauses
}

/// Number of auxiliary variables and clauses [`at_most`] produces for `n` literals.
pub(crate) fn at_most_size(n: usize, bound: usize) -> (usize, usize) {
    match (n, bound) {
        (n, bound) if n <= bound => (0, 0),
        (n, 0) => (0, n),
        (n, bound) => ((n - 1) * bound, bound + 1 + (n - 2) * (2 * bound + 1)),
    }
}

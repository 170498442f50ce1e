use tracing::debug;

use crate::core::error::GroupingError;
use crate::core::graph::{GenderId, ParticipantId, PreferenceGraph};

/// Optimal cross-gender pairing
#[derive(Debug, Clone, PartialEq)]
pub struct PairMatching {
    /// (smaller-side member, larger-side member)
    pub pairs: Vec<(ParticipantId, ParticipantId)>,
    /// Larger-side members left without a partner
    pub unmatched: Vec<ParticipantId>,
    pub score: f64,
}

/// Maximum-weight matching between the two genders of the roster
///
/// Every member of the smaller gender is paired; ties in roster size put the
/// first configured gender on the row side. Runs the shortest augmenting path
/// form of the Hungarian method with row and column potentials, O(r^2 c).
pub fn max_weight_pairing(graph: &PreferenceGraph) -> Result<PairMatching, GroupingError> {
    let genders: Vec<GenderId> = graph.genders().ids().collect();
    if genders.len() != 2 {
        return Err(GroupingError::InvalidConfig(format!(
            "pairing needs exactly two genders, got {}",
            genders.len()
        )));
    }

    let first = graph.members_of(genders[0]);
    let second = graph.members_of(genders[1]);
    let (rows, cols) = if first.len() <= second.len() {
        (first, second)
    } else {
        (second, first)
    };
    if rows.is_empty() {
        return Ok(PairMatching {
            pairs: Vec::new(),
            unmatched: cols,
            score: 0.0,
        });
    }

    // Maximising weight is minimising its negation
    let cost: Vec<Vec<f64>> = rows
        .iter()
        .map(|&r| cols.iter().map(|&c| -graph.pair_score(r, c)).collect())
        .collect();
    let column_of_row = assign(&cost);

    let mut taken = vec![false; cols.len()];
    let mut pairs = Vec::with_capacity(rows.len());
    let mut score = 0.0;
    for (r, &c) in column_of_row.iter().enumerate() {
        taken[c] = true;
        score += graph.pair_score(rows[r], cols[c]);
        pairs.push((rows[r], cols[c]));
    }
    let unmatched = cols
        .iter()
        .zip(&taken)
        .filter(|(_, &used)| !used)
        .map(|(&c, _)| c)
        .collect();

    debug!("Pairing matched {} pairs with score {:.2}", pairs.len(), score);
    Ok(PairMatching {
        pairs,
        unmatched,
        score,
    })
}

/// Minimum-cost assignment of every row to a distinct column (rows <= cols)
fn assign(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    let m = cost.first().map_or(0, Vec::len);

    // 1-based, index 0 is the virtual free column
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; m + 1];
    let mut row_of = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        row_of[0] = i;
        let mut j0 = 0usize;
        let mut min_to = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = row_of[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;
            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let reduced = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if reduced < min_to[j] {
                    min_to[j] = reduced;
                    way[j] = j0;
                }
                if min_to[j] < delta {
                    delta = min_to[j];
                    j1 = j;
                }
            }
            for j in 0..=m {
                if used[j] {
                    u[row_of[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_to[j] -= delta;
                }
            }
            j0 = j1;
            if row_of[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path
        loop {
            let j1 = way[j0];
            row_of[j0] = row_of[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut column_of_row = vec![0usize; n];
    for j in 1..=m {
        if row_of[j] != 0 {
            column_of_row[row_of[j] - 1] = j - 1;
        }
    }
    column_of_row
}

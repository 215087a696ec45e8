//! Name similarity for the fallback matching tier.

/// Levenshtein distance with an early-exit bound: returns `None` as soon as
/// the distance provably exceeds `max`. Two-row DP; the row minimum is a
/// lower bound on the final distance.
pub fn levenshtein_with_max(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > max {
        return None;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
            row_min = row_min.min(curr[j + 1]);
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    (prev[b.len()] <= max).then_some(prev[b.len()])
}

/// Normalized similarity in [0, 1]: 1 is equality, 0 means the distance
/// reached the longer string's length (or exceeded the early-exit bound).
/// Comparison is case-insensitive; ids differing only in case are near
/// matches, not strangers.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    match levenshtein_with_max(&a, &b, longest) {
        Some(distance) => 1.0 - distance as f64 / longest as f64,
        None => 0.0,
    }
}

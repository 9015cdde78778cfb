use strsim::levenshtein;

/// Closest candidate by edit distance, with a length-scaled cutoff so short
/// names do not match wildly different ones.
pub fn nearest<'a>(needle: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let needle = needle.trim();
    if needle.is_empty() {
        return None;
    }
    let max_dist = match needle.len() {
        0..=3 => 1,
        4..=6 => 2,
        7..=10 => 3,
        _ => 4,
    };
    candidates
        .into_iter()
        .filter(|c| !c.is_empty() && *c != needle)
        .map(|c| (levenshtein(needle, c), c))
        .filter(|(d, _)| *d <= max_dist)
        .min_by(|(da, a), (db, b)| da.cmp(db).then(a.len().cmp(&b.len())).then(a.cmp(b)))
        .map(|(_, c)| c.to_string())
}

/// Pick the recorded heredoc near-miss closest to the expected terminator.
pub fn nearest_terminator<'a>(
    expected: &str,
    seen: &'a [(String, usize)],
) -> Option<(&'a str, usize)> {
    let best = nearest(expected, seen.iter().map(|(w, _)| w.as_str()))?;
    seen.iter()
        .find(|(w, _)| *w == best)
        .map(|(w, at)| (w.as_str(), *at))
}

pub fn did_you_mean<'a>(
    needle: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    nearest(needle, candidates).map(|c| format!("did you mean `{}`?", c))
}

#[cfg(test)]
mod tests {
    use super::{did_you_mean, nearest, nearest_terminator};

    #[test]
    fn nearest_respects_the_distance_cutoff() {
        assert_eq!(
            nearest("END", ["ENDX", "body"].into_iter()),
            Some("ENDX".to_string())
        );
        assert_eq!(nearest("END", ["completely"].into_iter()), None);
    }

    #[test]
    fn nearest_terminator_keeps_the_line_number() {
        let seen = vec![("body".to_string(), 2), ("ENDX".to_string(), 3)];
        assert_eq!(nearest_terminator("END", &seen), Some(("ENDX", 3)));
    }

    #[test]
    fn did_you_mean_formats_a_question() {
        assert_eq!(
            did_you_mean("tokns", ["tokens", "split"].into_iter()),
            Some("did you mean `tokens`?".to_string())
        );
    }
}

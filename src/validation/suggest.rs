/// Suggest the closest matching name from `available` using Levenshtein distance.
///
/// Returns the candidate (original casing) with the smallest edit distance,
/// as long as that distance is 3 or fewer. Comparison is case-insensitive.
/// Ties keep the earliest candidate.
pub fn suggest_closest<S: AsRef<str>>(name: &str, available: &[S]) -> Option<String> {
    let query = name.to_ascii_lowercase();
    available
        .iter()
        .map(|candidate| candidate.as_ref())
        .filter(|candidate| *candidate != name)
        .map(|candidate| {
            let dist = strsim::levenshtein(&query, &candidate.to_ascii_lowercase());
            (dist, candidate)
        })
        .filter(|(dist, _)| *dist <= 3)
        .min_by_key(|(dist, _)| *dist)
        .map(|(_, candidate)| candidate.to_string())
}

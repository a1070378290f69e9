//! Size-tier directory names.
//!
//! The cutter renders pieces at one or more resolutions, each in its own
//! `size-<N>` directory. The tier with the largest `N` has the highest
//! fidelity raster output.

/// Prefix shared by all size-tier directory names.
pub const TIER_PREFIX: &str = "size-";

/// Rank of a size-tier directory name.
///
/// Returns `None` if `name` is not a tier directory at all. A tier whose
/// suffix is not a number ranks as `0` so that it still participates in
/// selection, below every numbered tier.
#[must_use]
pub fn tier_rank(name: &str) -> Option<u32> {
    let suffix = name.strip_prefix(TIER_PREFIX)?;
    Some(suffix.parse().unwrap_or(0))
}

/// Pick the highest-ranked tier among `names`.
///
/// Non-tier names are ignored. Among equal ranks the lexicographically
/// smallest name wins, so the choice does not depend on directory
/// listing order.
#[must_use]
pub fn select_tier<'a, I>(names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter_map(|name| tier_rank(name).map(|rank| (rank, name)))
        .min_by(|(rank_a, name_a), (rank_b, name_b)| {
            rank_b.cmp(rank_a).then_with(|| name_a.cmp(name_b))
        })
        .map(|(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_parses_numeric_suffix() {
        assert_eq!(tier_rank("size-100"), Some(100));
        assert_eq!(tier_rank("size-25"), Some(25));
    }

    #[test]
    fn rank_of_unparseable_suffix_is_zero() {
        assert_eq!(tier_rank("size-large"), Some(0));
        assert_eq!(tier_rank("size-"), Some(0));
    }

    #[test]
    fn rank_rejects_other_names() {
        assert_eq!(tier_rank("raster"), None);
        assert_eq!(tier_rank("index.json"), None);
        assert_eq!(tier_rank("Size-100"), None);
    }

    #[test]
    fn selects_largest_tier() {
        let names = ["size-50", "size-100", "size-25"];
        assert_eq!(select_tier(names), Some("size-100"));
    }

    #[test]
    fn numeric_not_lexical_ordering() {
        let names = ["size-9", "size-10"];
        assert_eq!(select_tier(names), Some("size-10"));
    }

    #[test]
    fn ignores_non_tier_entries() {
        let names = ["lines-resized.png", "size-5", "index.json"];
        assert_eq!(select_tier(names), Some("size-5"));
    }

    #[test]
    fn unparseable_tier_loses_to_numbered() {
        let names = ["size-full", "size-1"];
        assert_eq!(select_tier(names), Some("size-1"));
    }

    #[test]
    fn unparseable_tier_is_still_selectable() {
        assert_eq!(select_tier(["size-full"]), Some("size-full"));
    }

    #[test]
    fn ties_break_by_name() {
        let names = ["size-b", "size-a"];
        assert_eq!(select_tier(names), Some("size-a"));
    }

    #[test]
    fn none_when_no_tiers() {
        assert_eq!(select_tier(["pieces.json"]), None);
        assert_eq!(select_tier(std::iter::empty()), None);
    }
}

use std::collections::BTreeMap;

use indexmap::IndexMap;

/// Semantic property name to value mapping of a single tool
pub type PropertyMap = BTreeMap<String, String>;

/// Sparse table keyed by `tool[|variant][|arch]` composite keys
pub type PropertyTable = IndexMap<String, PropertyMap>;

static EMPTY: PropertyMap = BTreeMap::new();

/// Resolves tool's properties for the variant and architecture specified.
///
/// Candidates are tried from the most specific to the least one:
/// `tool|variant|arch`, `tool|variant`, `tool|arch`, `tool`.
/// The first hit is returned as is, levels are never merged.
/// Total miss resolves to an empty map.
#[must_use]
pub fn resolve<'a>(table: &'a PropertyTable, tool: &str, variant: &str, arch: &str) -> &'a PropertyMap {
    candidate_keys(tool, variant, arch)
        .iter()
        .find_map(|key| table.get(key))
        .unwrap_or(&EMPTY)
}

fn candidate_keys(tool: &str, variant: &str, arch: &str) -> [String; 4] {
    [
        format!("{tool}|{variant}|{arch}"),
        format!("{tool}|{variant}"),
        format!("{tool}|{arch}"),
        tool.to_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn props(marker: &str) -> PropertyMap {
        PropertyMap::from([("level".to_owned(), marker.to_owned())])
    }

    #[fixture]
    fn full_table() -> PropertyTable {
        PropertyTable::from([
            ("make|Debug|x64".to_owned(), props("variant+arch")),
            ("make|Debug".to_owned(), props("variant")),
            ("make|x64".to_owned(), props("arch")),
            ("make".to_owned(), props("tool")),
        ])
    }

    #[rstest]
    fn resolve_most_specific_wins(full_table: PropertyTable) {
        // Arrange

        // Act
        let actual = resolve(&full_table, "make", "Debug", "x64");

        // Assert
        assert_eq!(actual, &props("variant+arch"));
    }

    #[rstest]
    #[case(&["make|Debug|x64"], "variant")]
    #[case(&["make|Debug|x64", "make|Debug"], "arch")]
    #[case(&["make|Debug|x64", "make|Debug", "make|x64"], "tool")]
    #[trace]
    fn resolve_falls_through_tests(
        full_table: PropertyTable,
        #[case] removed: &[&str],
        #[case] expected: &str,
    ) {
        // Arrange
        let mut table = full_table;
        for key in removed {
            table.shift_remove(*key);
        }

        // Act
        let actual = resolve(&table, "make", "Debug", "x64");

        // Assert
        assert_eq!(actual, &props(expected));
    }

    #[rstest]
    #[case("make", "Release", "Win32", "tool")]
    #[case("make", "Release", "x64", "arch")]
    #[case("make", "Debug", "Win32", "variant")]
    #[trace]
    fn resolve_other_pairs_tests(
        full_table: PropertyTable,
        #[case] tool: &str,
        #[case] variant: &str,
        #[case] arch: &str,
        #[case] expected: &str,
    ) {
        // Arrange

        // Act
        let actual = resolve(&full_table, tool, variant, arch);

        // Assert
        assert_eq!(actual, &props(expected));
    }

    #[rstest]
    fn resolve_does_not_merge_levels() {
        // Arrange
        let mut specific = props("variant");
        specific.remove("level");
        specific.insert("output".to_owned(), "foo.exe".to_owned());
        let table = PropertyTable::from([
            ("make|Debug".to_owned(), specific.clone()),
            ("make".to_owned(), props("tool")),
        ]);

        // Act
        let actual = resolve(&table, "make", "Debug", "Win32");

        // Assert
        assert_eq!(actual, &specific);
        assert!(!actual.contains_key("level"));
    }

    #[rstest]
    #[case("make")]
    #[case("user_properties")]
    #[trace]
    fn resolve_total_miss_is_empty(#[case] tool: &str) {
        // Arrange
        let table = PropertyTable::new();

        // Act
        let actual = resolve(&table, tool, "Debug", "Win32");

        // Assert
        assert!(actual.is_empty());
    }

    #[rstest]
    fn resolve_does_not_match_other_tools(full_table: PropertyTable) {
        // Arrange

        // Act
        let actual = resolve(&full_table, "mak", "Debug", "x64");

        // Assert
        assert!(actual.is_empty());
    }
}

//! Dataset readers and writers.

mod boundaries;
pub mod csv;
pub mod geojson;
mod shp;

pub use boundaries::{load_boundaries, BoundaryRow};

/// Pick the first alias present among `names`, compared case-insensitively.
pub(crate) fn find_column<'a, I>(names: I, aliases: &[String]) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    aliases.iter().find_map(|alias| {
        names.clone().into_iter().find(|name| name.trim().eq_ignore_ascii_case(alias.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_tried_in_order_ignoring_case() {
        let names = ["ID", "Block_Name", "DISTRICT_N", "district"];
        let aliases = vec!["district".to_string(), "district_n".to_string()];
        assert_eq!(find_column(names, &aliases), Some("district"));
        assert_eq!(find_column(names[..3].iter().copied(), &aliases), Some("DISTRICT_N"));
        assert_eq!(find_column(names, &["village".to_string()]), None);
    }
}

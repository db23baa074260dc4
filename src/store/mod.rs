pub mod mem;
pub mod pg;

/// Identifier check for the configurable table name. Conservative on
/// purpose: the name is interpolated into DDL, and the staged shadow table
/// appends a suffix that must stay inside Postgres's 63-byte identifier
/// limit.
pub fn valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 48
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_rules() {
        assert!(valid_table_name("ships"));
        assert!(valid_table_name("_fleet_2024"));
        assert!(!valid_table_name(""));
        assert!(!valid_table_name("2ships"));
        assert!(!valid_table_name("ships; drop table ships"));
        assert!(!valid_table_name(&"s".repeat(49)));
    }
}

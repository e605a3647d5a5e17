pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_skips_blanks() {
        assert_eq!(
            split_csv(" smoke, ,full-run,,"),
            vec!["smoke".to_string(), "full-run".to_string()]
        );
        assert!(split_csv("").is_empty());
    }
}

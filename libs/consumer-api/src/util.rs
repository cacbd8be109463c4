use std::collections::HashMap;

/// Look up a metadata entry by exact key.
///
/// Missing keys are a normal branch for routing, so this returns `Option`
/// instead of failing.
pub fn lookup<'a>(metadata: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    metadata.get(key).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let m = meta(&[("PlayerId", "p1")]);
        assert_eq!(lookup(&m, "PlayerId"), Some("p1"));
        assert_eq!(lookup(&m, "playerid"), None);
        assert_eq!(lookup(&HashMap::new(), "PlayerId"), None);
    }

    #[test]
    fn lookup_keeps_blank_values() {
        let m = meta(&[("PlayerId", "")]);
        assert_eq!(lookup(&m, "PlayerId"), Some(""));
    }
}

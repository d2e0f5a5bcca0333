//! Human-readable ids derived from names.

/// Lowercase, turn each whitespace run into one hyphen, drop everything
/// outside `[a-z0-9-]`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_alphanumeric() || c == '-' {
            slug.push(c);
        }
    }
    slug
}

/// Slugify `name` and disambiguate against existing ids by appending
/// `-1`, `-2`, ... until unique.  `fallback` is used when the name
/// slugifies to nothing.
pub fn unique_id(name: &str, fallback: &str, exists: impl Fn(&str) -> bool) -> String {
    let mut base = slugify(name);
    if base.is_empty() {
        base = fallback.to_owned();
    }
    if !exists(&base) {
        return base;
    }
    let mut counter = 1u32;
    loop {
        let candidate = format!("{base}-{counter}");
        if !exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_basic() {
        assert_eq!(slugify("Mining Operations"), "mining-operations");
    }

    #[test]
    fn slug_strips_punctuation() {
        assert_eq!(slugify("Sustainability & ESG"), "sustainability--esg");
        assert_eq!(slugify("Llama 3.1 70B!"), "llama-31-70b");
    }

    #[test]
    fn slug_collapses_whitespace_runs() {
        assert_eq!(slugify("Supply   Chain\t Ops"), "supply-chain-ops");
    }

    #[test]
    fn slug_is_ascii_only() {
        assert_eq!(slugify("Géologie Café"), "gologie-caf");
        assert!(slugify("Ünïcödé 名前").is_ascii());
    }

    #[test]
    fn unique_id_appends_counter() {
        let taken = ["finance", "finance-1"];
        let id = unique_id("Finance", "domain", |c| taken.contains(&c));
        assert_eq!(id, "finance-2");
    }

    #[test]
    fn unique_id_no_collision() {
        assert_eq!(unique_id("Geo", "domain", |_| false), "geo");
    }

    #[test]
    fn empty_slug_uses_fallback() {
        assert_eq!(unique_id("!!!", "endpoint", |_| false), "endpoint");
    }
}

use std::collections::HashSet;

/// URL slug for a job title: lowercase, whitespace runs become hyphens,
/// anything outside `[a-z0-9_-]` is dropped, repeated hyphens collapse and
/// leading/trailing hyphens are trimmed.
pub fn slugify(title: &str) -> String {
    let mut raw = String::with_capacity(title.len());
    let mut in_whitespace = false;
    for c in title.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                raw.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            raw.push(c);
        }
    }

    let mut slug = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    slug.trim_matches('-').to_string()
}

/// First of `base`, `base-2`, `base-3`, ... not present in `existing`.
pub fn unique_slug(base: &str, existing: &HashSet<String>) -> String {
    if !existing.contains(base) {
        return base.to_string();
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{base}-{counter}");
        if !existing.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

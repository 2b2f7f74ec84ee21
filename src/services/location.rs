//! Caller-side normalization applied before favorites are persisted or
//! looked up.

/// Trim and title-case a city name: the first letter of every alphabetic
/// run is uppercased, the rest lowercased ("new york" -> "New York",
/// "port-au-prince" -> "Port-Au-Prince").
#[must_use]
pub fn normalize_city(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut prev_alphabetic = false;

    for ch in trimmed.chars() {
        if ch.is_alphabetic() {
            if prev_alphabetic {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(ch);
            prev_alphabetic = false;
        }
    }

    out
}

/// Trim and upper-case a country code ("fr " -> "FR").
#[must_use]
pub fn normalize_country(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_is_trimmed_and_title_cased() {
        assert_eq!(normalize_city("  new york  "), "New York");
        assert_eq!(normalize_city("PARIS"), "Paris");
        assert_eq!(normalize_city("port-au-prince"), "Port-Au-Prince");
        assert_eq!(normalize_city(""), "");
        assert_eq!(normalize_city("   "), "");
    }

    #[test]
    fn country_is_trimmed_and_upper_cased() {
        assert_eq!(normalize_country(" fr "), "FR");
        assert_eq!(normalize_country("GB"), "GB");
        assert_eq!(normalize_country(""), "");
    }
}

/// Normalizes a film title for comparison across catalogs.
///
/// Lowercases, drops a single leading English article ("the", "a", "an") and
/// strips everything that is not an ASCII letter or digit, so that
/// "The Red Shoes", "Red Shoes!" and "red  shoes" all collapse to the same
/// key. Only one article is removed: "The A Team" becomes "ateam", not
/// "team".
///
/// The input is deliberately not trimmed first. An article only counts when
/// it sits at the very start of the string, so " The Red Shoes" keeps its
/// "the". This matches how titles come out of the catalog parser, which has
/// already trimmed its cell contents.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = strip_leading_article(&lowered);
    stripped
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn strip_leading_article(title: &str) -> &str {
    // "an" before "a" so "an affair" is not treated as "a" + "n affair".
    for article in ["the", "an", "a"] {
        if let Some(rest) = title.strip_prefix(article) {
            if rest.starts_with(char::is_whitespace) {
                return rest.trim_start();
            }
        }
    }
    title
}

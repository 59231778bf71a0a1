//! Query-string assembly for the MediaWiki `pageimages` search.

/// Endpoint of the English Wikipedia action API.
pub const API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Action API endpoint for a given Wikipedia language edition, e.g. `"de"`.
pub fn api_url_for_language(lang: &str) -> String {
    format!("https://{lang}.wikipedia.org/w/api.php")
}

/// Build the image search URL against the default endpoint.
///
/// `search_term` is inserted as-is and must already be percent-encoded.
pub fn search_images_url(search_term: &str, thumb_size: u32, limit: u32) -> String {
    search_images_url_at(API_URL, search_term, thumb_size, limit)
}

/// Build the image search URL against an explicit endpoint.
///
/// Pages are enumerated with the `allpages` generator starting at
/// `search_term`, each carrying a thumbnail no larger than `thumb_size`
/// pixels; at most `limit` pages are returned.
pub fn search_images_url_at(
    api_url: &str,
    search_term: &str,
    thumb_size: u32,
    limit: u32,
) -> String {
    let params: [(&str, String); 9] = [
        ("action", "query".into()),
        ("prop", "pageimages".into()),
        ("format", "json".into()),
        ("piprop", "thumbnail".into()),
        ("pilimit", limit.to_string()),
        ("generator", "allpages".into()),
        ("gapprefix", search_term.into()),
        ("gaplimit", limit.to_string()),
        ("pithumbsize", thumb_size.to_string()),
    ];

    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    format!("{api_url}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_full_query_string() {
        assert_eq!(
            search_images_url("Rust", 240, 50),
            "https://en.wikipedia.org/w/api.php?action=query&prop=pageimages&format=json\
             &piprop=thumbnail&pilimit=50&generator=allpages&gapprefix=Rust&gaplimit=50\
             &pithumbsize=240"
        );
    }

    #[test]
    fn search_term_is_not_re_encoded() {
        let url = search_images_url("New%20York", 100, 5);
        assert!(url.contains("&gapprefix=New%20York&"));
        assert!(url.contains("&pilimit=5&"));
        assert!(url.ends_with("&pithumbsize=100"));
    }

    #[test]
    fn language_edition_endpoint() {
        let api = api_url_for_language("de");
        assert_eq!(api, "https://de.wikipedia.org/w/api.php");
        assert!(search_images_url_at(&api, "Berlin", 10, 1)
            .starts_with("https://de.wikipedia.org/w/api.php?action=query&"));
    }
}

//! Route template to specification path key translation.

/// Translate a framework route template into a specification path key.
///
/// `<param>` brackets become `{param}` braces, then a non-empty `base_path`
/// is stripped when the translated path starts with it.
///
/// ```
/// use oas_schema::path_key;
///
/// assert_eq!(path_key("/books/<isbn>", None), "/books/{isbn}");
/// assert_eq!(path_key("/v1/health", Some("/v1")), "/health");
/// ```
pub fn path_key(route_template: &str, base_path: Option<&str>) -> String {
    let translated = route_template.replace('<', "{").replace('>', "}");

    match base_path.filter(|prefix| !prefix.is_empty()) {
        Some(prefix) => match translated.strip_prefix(prefix) {
            Some(rest) => rest.to_string(),
            None => translated,
        },
        None => translated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_brackets() {
        assert_eq!(path_key("/books/<isbn>", None), "/books/{isbn}");
        assert_eq!(
            path_key("/books/id/<book_uuid>", None),
            "/books/id/{book_uuid}"
        );
    }

    #[test]
    fn strips_base_path() {
        assert_eq!(path_key("/v1/health", Some("/v1")), "/health");
        assert_eq!(path_key("/v1/books/<isbn>", Some("/v1")), "/books/{isbn}");
    }

    #[test]
    fn keeps_path_without_prefix() {
        assert_eq!(path_key("/health", Some("/v1")), "/health");
    }

    #[test]
    fn empty_base_path_is_ignored() {
        assert_eq!(path_key("/health", Some("")), "/health");
    }

    #[test]
    fn no_parameters_unchanged() {
        assert_eq!(path_key("/books/by-title", None), "/books/by-title");
    }

    #[test]
    fn translation_is_deterministic() {
        let first = path_key("/a/<b>/c/<d>", Some("/a"));
        assert_eq!(first, "/{b}/c/{d}");
        assert_eq!(first, path_key("/a/<b>/c/<d>", Some("/a")));
    }
}

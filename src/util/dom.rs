use scraper::{Html, Selector};

/// Whether `document` contains at least one element matching `selector`.
///
/// An invalid selector never matches.
pub fn has_element(selector: &str, document: &Html) -> bool {
    match Selector::parse(selector) {
        Ok(sel) => document.select(&sel).next().is_some(),
        Err(e) => {
            log::warn!("Invalid selector {selector:?}: {e:?}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_custom_element() {
        let doc = Html::parse_document("<html><body><yt-page-loader></yt-page-loader></body></html>");
        assert!(has_element("yt-page-loader", &doc));
    }

    #[test]
    fn missing_element() {
        let doc = Html::parse_document("<html><body><div id=\"app\"></div></body></html>");
        assert!(!has_element("yt-page-loader", &doc));
        assert!(has_element("#app", &doc));
    }

    #[test]
    fn invalid_selector_does_not_match() {
        let doc = Html::parse_document("<html><body></body></html>");
        assert!(!has_element("<<>>", &doc));
    }
}

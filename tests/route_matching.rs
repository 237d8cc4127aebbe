// Route pattern matrix: static depth, variables, wildcards, extensions,
// query parameters, against the public Route API.
#[cfg(test)]
mod test {
    use bytes::Bytes;
    use dendrite::{Route, RouteSettings};
    use http::{Method, Request};

    const ORIGIN: &str = "http://www.example.com";

    fn get(url: &str) -> Request<Bytes> {
        Request::builder()
            .method(Method::GET)
            .uri(url)
            .body(Bytes::new())
            .unwrap()
    }

    #[test]
    fn test_area_controller_action_scenario() {
        let route = Route::new("/Area/{controller}/{action}", ORIGIN).unwrap();

        let matching = get("http://www.example.com/Area/Home/Index");
        assert!(route.is_match(&matching));

        let variables = route.get_variables(&matching);
        assert_eq!(variables.path.get("controller").unwrap(), "Home");
        assert_eq!(variables.path.get("action").unwrap(), "Index");

        // One segment short is not a match.
        assert!(!route.is_match(&get("http://www.example.com/Area/Home")));
    }

    #[test]
    fn test_static_pattern_equal_depth_case_insensitive() {
        let route = Route::new("/Deeply/Nested/Static/Path", ORIGIN).unwrap();
        assert!(route.is_match(&get("http://www.example.com/deeply/NESTED/static/PATH")));
        assert!(!route.is_match(&get("http://www.example.com/deeply/nested/static")));
        assert!(!route.is_match(&get("http://www.example.com/deeply/nested/static/path/more")));
    }

    #[test]
    fn test_trailing_double_wildcard_matches_any_depth() {
        let route = Route::new("/**", ORIGIN).unwrap();
        for url in [
            "http://www.example.com/a",
            "http://www.example.com/a/b",
            "http://www.example.com/a/b/c/d/e",
        ] {
            assert!(route.is_match(&get(url)), "expected match for {url}");
        }
    }

    #[test]
    fn test_double_wildcard_file_pattern() {
        let route = Route::new("/**/file.js", ORIGIN).unwrap();
        assert!(route.is_match(&get("http://www.example.com/x/y/file.js")));
        assert!(!route.is_match(&get("http://www.example.com/x/y/notfile.js")));
    }

    #[test]
    fn test_single_wildcard_is_one_segment() {
        let route = Route::new("/*.js", ORIGIN).unwrap();
        assert!(route.is_match(&get("http://www.example.com/a.js")));
        assert!(!route.is_match(&get("http://www.example.com/a/b.js")));
    }

    #[test]
    fn test_wildcard_segment_in_middle() {
        let route = Route::new("/api/*/items", ORIGIN).unwrap();
        assert!(route.is_match(&get("http://www.example.com/api/v2/items")));
        assert!(!route.is_match(&get("http://www.example.com/api/items")));
        assert!(!route.is_match(&get("http://www.example.com/api/v1/v2/items")));
    }

    #[test]
    fn test_query_and_extension_combination() {
        let route = Route::new("/assets/{name}.{ext}?v={version}", ORIGIN).unwrap();

        let matching = get("http://www.example.com/assets/logo.svg?v=7");
        assert!(route.is_match(&matching));

        let variables = route.get_variables(&matching);
        assert_eq!(variables.path.get("name").unwrap(), "logo");
        assert_eq!(variables.path.get("ext").unwrap(), "svg");
        assert_eq!(variables.query.get("v").unwrap(), "7");

        // Required query key absent.
        assert!(!route.is_match(&get("http://www.example.com/assets/logo.svg")));
    }

    #[test]
    fn test_cross_origin_request_never_matches() {
        let route = Route::with_settings("/**", ORIGIN, RouteSettings::any_method()).unwrap();
        assert!(!route.is_match(&get("http://cdn.example.com/anything")));
    }

    #[test]
    fn test_methods_settings_apply_to_all_paths() {
        let route =
            Route::with_settings("/submit", ORIGIN, RouteSettings::methods([Method::POST])).unwrap();

        let post = Request::builder()
            .method(Method::POST)
            .uri("http://www.example.com/submit")
            .body(Bytes::new())
            .unwrap();
        assert!(route.is_match(&post));
        assert!(!route.is_match(&get("http://www.example.com/submit")));
    }

    #[test]
    fn test_percent_encoded_segments_match_decoded_pattern() {
        let route = Route::new("/docs/{title}", ORIGIN).unwrap();
        let request = get("http://www.example.com/docs/hello%20world");
        assert!(route.is_match(&request));
        assert_eq!(
            route.get_variables(&request).path.get("title").unwrap(),
            "hello world"
        );
    }
}

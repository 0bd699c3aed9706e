#[cfg(test)]
mod config {
    use serde_json::json;

    use crate::config::validate::validate;
    use crate::config::{BrowserType, SessionSettings, WashOptions};
    use crate::error::WashError;
    use crate::lang::parse;
    use crate::tests::test_util::script;

    fn validated(source: &str) -> crate::Result<()> {
        validate(&parse(source)?)
    }

    fn assert_language_error(source: &str) {
        match validated(source) {
            Err(WashError::Language(message)) => println!("{}", message),
            other => panic!("expected a language error for {:?}, got {:?}", source, other),
        }
    }

    #[test]
    fn browser_type_from_str() {
        assert_eq!("firefox".parse::<BrowserType>().unwrap(), BrowserType::Firefox);
        assert_eq!(" Chrome ".parse::<BrowserType>().unwrap(), BrowserType::Chrome);
        assert_eq!("EDGE".parse::<BrowserType>().unwrap(), BrowserType::Edge);
        assert!(matches!("netscape".parse::<BrowserType>(), Err(WashError::Language(_))));
        assert_eq!(BrowserType::all().count(), 5);
        assert_eq!(BrowserType::Safari.to_string(), "Safari");
    }

    #[test]
    fn valid_script() {
        validated(
            "open url 'x'
             configuration mobile {
                 browser_type(browser_type: 'chrome')
                 user_agent(user_agent: 'wash')
                 access_as_mobile_device(is_active: true)
                 use_incognito_mode(is_active: true)
                 window_size(width: 400, height: 800)
                 wait_timeout(timeout: 5)
                 headless(is_active: true)
             }
             title = tag 'h1' index -1 data '@title'",
        )
        .unwrap();
    }

    #[test]
    fn invalid_configurations() {
        assert_language_error("open url 'x'\nconfiguration a { }\nconfiguration a { }\nuse a");
        assert_language_error("open url 'x'\nconfiguration a { colour(value: 'red') }");
        assert_language_error("open url 'x'\nconfiguration a { headless(is_active: true) headless(is_active: false) }");
        assert_language_error("open url 'x'\nconfiguration a { window_size(width: 10) }");
        assert_language_error("open url 'x'\nconfiguration a { window_size(width: 10, height: 10, depth: 1) }");
        assert_language_error("open url 'x'\nconfiguration a { window_size(width: 10, width: 10, height: 10) }");
        assert_language_error("open url 'x'\nconfiguration a { headless(is_active: 'yes') }");
        assert_language_error("open url 'x'\nconfiguration a { wait_timeout(timeout: 1.5) }");
        assert_language_error("open url 'x'\nconfiguration a { browser_type(browser_type: 'lynx') }");
        assert_language_error("open url 'x'\nconfiguration a { wait_timeout(page_load: 10) }");
    }

    #[test]
    fn negative_integers_are_rejected() {
        assert_language_error("open url 'x'\nconfiguration a { window_size(width: -5, height: 10) }");
        assert_language_error("open url 'x'\nconfiguration a { wait_timeout(timeout: -1) }");
        assert_language_error("open url 'x'\nconfiguration a { wait_timeout(timeout: 1, page_load: -30) }");
    }

    #[test]
    fn window_dimension_too_large() {
        let source = "open url 'x'\nconfiguration a { window_size(width: 5000000000, height: 10) }";
        assert_language_error(source);

        let settings = SessionSettings::resolve(&parse(source).unwrap(), BrowserType::Chrome);
        assert!(matches!(settings, Err(WashError::Language(_))));
    }

    #[test]
    fn optional_page_load_timeout() {
        let parsed = script("configuration a { wait_timeout(timeout: 2) }").unwrap();
        let settings = SessionSettings::resolve(&parsed, BrowserType::Chrome).unwrap();
        assert_eq!(settings.page_load_timeout, None);
        assert_eq!(settings.capabilities()["timeouts"], json!({ "implicit": 2000 }));

        let parsed = script("configuration a { wait_timeout(timeout: 2, page_load: 30) }").unwrap();
        let settings = SessionSettings::resolve(&parsed, BrowserType::Chrome).unwrap();
        assert_eq!(settings.page_load_timeout, Some(30));
        assert_eq!(
            settings.capabilities()["timeouts"],
            json!({ "implicit": 2000, "pageLoad": 30000 })
        );
    }

    #[test]
    fn configuration_selection() {
        validated("open url 'x'\nconfiguration a { }\nconfiguration b { }\nuse b").unwrap();
        validated("open url 'x'\nconfiguration a { }").unwrap();
        assert_language_error("open url 'x'\nconfiguration a { }\nconfiguration b { }");
        assert_language_error("open url 'x'\nconfiguration a { }\nuse c");
        assert_language_error("open url 'x'\nuse c");
    }

    #[test]
    fn invalid_queries() {
        assert_language_error("open url 'x'\nv = css 'li' index 'second' data 'text'");
        assert_language_error("open url 'x'\nv = css 'li' data 'value'");
        assert_language_error("open url 'x'\nclick css 'li' index 'first'");

        match validated("open url 'x'\nv = css 'li' index 0 data 'text'") {
            Err(WashError::Runtime(_)) => {}
            other => panic!("expected a runtime error, got {:?}", other),
        }
    }

    #[test]
    fn default_settings() {
        let settings = SessionSettings::resolve(&script("").unwrap(), BrowserType::Firefox).unwrap();
        assert_eq!(settings, SessionSettings::defaults(BrowserType::Firefox));
        assert!(settings.headless);
    }

    #[test]
    fn resolved_settings() {
        let script = script(
            "configuration a { headless(is_active: true) }
             configuration b {
                 browser_type(browser_type: 'Edge')
                 user_agent(user_agent: 'wash/1.0')
                 use_incognito_mode(is_active: true)
                 window_size(width: 1024, height: 768)
                 wait_timeout(timeout: 3)
                 headless(is_active: false)
             }
             use b",
        )
        .unwrap();
        let settings = SessionSettings::resolve(&script, BrowserType::Chrome).unwrap();
        assert_eq!(
            settings,
            SessionSettings {
                browser: BrowserType::Edge,
                headless: false,
                user_agent: Some("wash/1.0".to_string()),
                mobile: false,
                incognito: true,
                window_size: Some((1024, 768)),
                wait_timeout: 3,
                page_load_timeout: None,
            }
        );
    }

    #[test]
    fn chrome_capabilities() {
        let settings = SessionSettings {
            user_agent: Some("wash".to_string()),
            mobile: true,
            window_size: Some((400, 800)),
            wait_timeout: 5,
            ..SessionSettings::defaults(BrowserType::Chrome)
        };
        let capabilities = settings.capabilities();
        assert_eq!(capabilities["browserName"], json!("chrome"));
        assert_eq!(
            capabilities["goog:chromeOptions"],
            json!({ "args": ["--headless", "--user-agent=wash", "--use-mobile-user-agent", "--window-size=400,800"] })
        );
        assert_eq!(capabilities["timeouts"], json!({ "implicit": 5000 }));
    }

    #[test]
    fn firefox_capabilities() {
        let settings = SessionSettings {
            user_agent: Some("wash".to_string()),
            incognito: true,
            ..SessionSettings::defaults(BrowserType::Firefox)
        };
        let capabilities = settings.capabilities();
        assert_eq!(capabilities["browserName"], json!("firefox"));
        assert_eq!(
            capabilities["moz:firefoxOptions"],
            json!({ "args": ["-headless", "-private"], "prefs": { "general.useragent.override": "wash" } })
        );
    }

    #[test]
    fn driver_paths() {
        let mut options = WashOptions::default();
        assert_eq!(options.default_browser, BrowserType::Chrome);
        assert!(options.driver_path(BrowserType::Chrome).is_none());

        options.set_driver_path(BrowserType::Chrome, "/usr/bin/chromedriver");
        assert_eq!(
            options.driver_path(BrowserType::Chrome).unwrap(),
            std::path::Path::new("/usr/bin/chromedriver")
        );
        assert!(options.driver_path(BrowserType::Firefox).is_none());
    }
}

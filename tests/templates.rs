use richdoc_export::template::{HeaderFooterSettings, TemplatePart, expand, split};

#[test]
fn expands_every_page_token() {
    assert_eq!(expand("Page {page}", 3), "Page 3");
    assert_eq!(expand("{page} of {page}", 12), "12 of 12");
    assert_eq!(expand("{page}/{page}", 2), "2/2");
    assert_eq!(expand("no token", 7), "no token");
    assert_eq!(expand("", 1), "");
}

#[test]
fn other_braces_pass_through() {
    assert_eq!(expand("{pages} {PAGE} {page", 2), "{pages} {PAGE} {page");
    assert_eq!(expand("{{page}}", 5), "{5}");
}

#[test]
fn splits_around_tokens() {
    assert_eq!(
        split("Page {page} of X"),
        vec![
            TemplatePart::Text("Page "),
            TemplatePart::PageNumber,
            TemplatePart::Text(" of X"),
        ]
    );
    assert_eq!(
        split("{page}{page}"),
        vec![TemplatePart::PageNumber, TemplatePart::PageNumber]
    );
    assert_eq!(split("plain"), vec![TemplatePart::Text("plain")]);
    assert!(split("").is_empty());
}

#[test]
fn default_settings_number_the_footer() {
    let settings = HeaderFooterSettings::default();
    assert_eq!(settings.footer_right, "Page {page}");
    assert!(settings.has_footer());
    assert!(!settings.has_header());
    assert!(HeaderFooterSettings::empty().is_empty());
}

#[cfg(feature = "serde")]
#[test]
fn settings_deserialize_from_camel_case() {
    let settings: HeaderFooterSettings =
        serde_json::from_str(r#"{"headerLeft": "Draft", "footerRight": ""}"#).expect("json");
    assert_eq!(settings.header_left, "Draft");
    assert_eq!(settings.footer_right, "");
    assert_eq!(settings.footer_left, "");

    let options: richdoc_export::ExportOptions =
        serde_json::from_str(r#"{"pageFormat": "a4"}"#).expect("json");
    assert_eq!(options.page_format, richdoc_export::PageFormatId::A4);
    assert_eq!(options.header_footer, HeaderFooterSettings::default());
}

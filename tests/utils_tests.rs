// tests/utils_tests.rs

use base64::{Engine, engine::general_purpose::STANDARD};
use blog_backend::config::parse_list;
use blog_backend::utils::auth::{AdminCredentials, parse_basic_auth};
use blog_backend::utils::slug::{post_slug, slugify};

#[test]
fn slugify_folds_diacritics_and_punctuation() {
    assert_eq!(slugify("Hello, World!"), "hello-world");
    assert_eq!(slugify("  Café   Olé  "), "cafe-ole");
    assert_eq!(slugify("Crème brûlée: 3 ways"), "creme-brulee-3-ways");
    assert_eq!(slugify("--already-slugged--"), "already-slugged");
    assert_eq!(slugify("!!!"), "");
    assert_eq!(slugify(""), "");
}

#[test]
fn slugify_replaces_letters_without_decomposition() {
    // "ł" has no canonical decomposition and is not in [a-z0-9].
    assert_eq!(slugify("Łódź"), "odz");
    assert_eq!(slugify("Zażółć gęślą"), "zazo-c-gesla");
}

#[test]
fn post_slug_prefers_requested_then_title_then_header() {
    assert_eq!(post_slug(Some("Custom"), "Title", "Header", 42), "custom-42");
    assert_eq!(post_slug(None, "Tile Title", "Header", 42), "tile-title-42");
    assert_eq!(post_slug(Some("   "), "", "The Header", 7), "the-header-7");
}

#[test]
fn post_slug_falls_back_when_nothing_is_usable() {
    assert_eq!(post_slug(None, "", "", 1), "post-1");
    assert_eq!(post_slug(None, "???", "", 1), "post-1");
}

#[test]
fn basic_auth_header_is_parsed() {
    let header = format!("Basic {}", STANDARD.encode("admin:pa:ss"));
    assert_eq!(
        parse_basic_auth(&header),
        Some(("admin".to_string(), "pa:ss".to_string()))
    );

    let empty_password = format!("Basic {}", STANDARD.encode("admin:"));
    assert_eq!(
        parse_basic_auth(&empty_password),
        Some(("admin".to_string(), String::new()))
    );
}

#[test]
fn malformed_basic_auth_is_rejected() {
    assert_eq!(parse_basic_auth(""), None);
    assert_eq!(parse_basic_auth("Bearer abc"), None);
    assert_eq!(parse_basic_auth("Basic !!!not-base64!!!"), None);
    let no_colon = format!("Basic {}", STANDARD.encode("adminpass"));
    assert_eq!(parse_basic_auth(&no_colon), None);
    let not_utf8 = format!("Basic {}", STANDARD.encode([0xff, 0xfe, b':', b'x']));
    assert_eq!(parse_basic_auth(&not_utf8), None);
}

#[test]
fn admin_credentials_verify_exact_pair() {
    let admin = AdminCredentials::new("admin", "correct horse").unwrap();

    assert_eq!(admin.username(), "admin");
    assert!(admin.verify("admin", "correct horse"));
    assert!(!admin.verify("admin", "correct horse "));
    assert!(!admin.verify("Admin", "correct horse"));
    assert!(!admin.verify("", ""));
}

#[test]
fn comma_separated_lists_are_trimmed() {
    assert_eq!(
        parse_list(" https://a.example , ,https://b.example,"),
        vec!["https://a.example".to_string(), "https://b.example".to_string()]
    );
    assert!(parse_list("").is_empty());
}

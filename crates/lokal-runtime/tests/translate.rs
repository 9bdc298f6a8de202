//! End-to-end resolver behavior: interpolation, plural selection, locale
//! fallback, warning gating, and the missing-key degradation ladder.

use lokal_runtime::{
    DefaultMessage, MessageTree, OutputMode, PartKind, Translated, TranslateOptions, Translator,
    WarnFilter,
};
use regex::Regex;
use tracing_test::traced_test;

fn translator_with(locale: &str, messages: &[(&str, &str, &str)]) -> Translator {
    let mut translator = Translator::new(locale);
    for (locale, key, source) in messages {
        translator.add_message(locale, key, *source);
    }
    translator
}

// ---------------------------------------------------------------------
// Core formatting features
// ---------------------------------------------------------------------

#[test]
fn simple_text() {
    let translator = translator_with("en", &[("en", "hi", "hi kazupon !")]);
    assert_eq!(translator.t("hi"), "hi kazupon !");
}

#[test]
fn list_interpolation() {
    let translator = translator_with("en", &[("en", "hi", "hi {0} !")]);
    let result = translator
        .translate("hi", &TranslateOptions::new().with_list(["kazupon"]))
        .unwrap();
    assert_eq!(result.as_text(), Some("hi kazupon !"));
}

#[test]
fn named_interpolation() {
    let translator = translator_with("en", &[("en", "hi", "hi {name} !")]);
    let result = translator
        .translate("hi", &TranslateOptions::new().with_named("name", "kazupon"))
        .unwrap();
    assert_eq!(result.as_text(), Some("hi kazupon !"));
}

#[test]
fn linked_message_with_modifier() {
    let translator = translator_with(
        "en",
        &[("en", "name", "kazupon"), ("en", "hi", "hi @.upper:name !")],
    );
    assert_eq!(translator.t("hi"), "hi KAZUPON !");
}

#[test]
fn linked_message_without_modifier() {
    let translator = translator_with(
        "en",
        &[("en", "name", "kazupon"), ("en", "hi", "hi @:name !")],
    );
    assert_eq!(translator.t("hi"), "hi kazupon !");
}

#[test]
fn linked_message_resolves_in_found_locale() {
    // `hi` only exists in ja; its link must resolve `name` in ja too.
    let mut translator = translator_with(
        "en",
        &[
            ("en", "name", "english"),
            ("ja", "name", "かずぽん"),
            ("ja", "hi", "hi @:name !"),
        ],
    );
    translator.set_fallback_locales(["ja"]);
    translator.set_fallback_warn(false);
    assert_eq!(translator.t("hi"), "hi かずぽん !");
}

#[test]
fn custom_modifier_registration() {
    let mut translator = translator_with(
        "en",
        &[("en", "name", "kazupon"), ("en", "hi", "hi @.shout:name !")],
    );
    translator.register_modifier("shout", |s| format!("{}!!", s.to_uppercase()));
    assert_eq!(translator.t("hi"), "hi KAZUPON!! !");
}

#[test]
fn plural_case_selection() {
    let translator = translator_with(
        "en",
        &[("en", "apple", "no apples | one apple | {count} apples")],
    );
    let at = |choice: i64| {
        translator
            .translate("apple", &TranslateOptions::new().with_plural(choice))
            .unwrap()
            .into_text()
            .unwrap()
    };
    assert_eq!(at(0), "no apples");
    assert_eq!(at(1), "one apple");
    assert_eq!(at(10), "10 apples");
}

#[test]
fn named_count_overrides_substitution_but_not_case() {
    let translator = translator_with(
        "en",
        &[("en", "apple", "no apples | one apple | {count} apples")],
    );
    let result = translator
        .translate(
            "apple",
            &TranslateOptions::new()
                .with_plural(10)
                .with_named("count", 20),
        )
        .unwrap();
    assert_eq!(result.as_text(), Some("20 apples"));
}

#[test]
fn empty_string_message_is_valid() {
    let mut translator = translator_with("en", &[("en", "blank", "")]);
    translator.set_missing_warn(false);
    assert_eq!(translator.t("blank"), "");
}

#[test]
fn multibyte_keys() {
    let translator = translator_with("ja", &[("ja", "こんにちは", "こんにちは！")]);
    assert_eq!(translator.t("こんにちは"), "こんにちは！");
}

#[test]
fn dotted_keypath_lookup() {
    let translator = translator_with("en", &[("en", "message.hello", "hello world")]);
    assert_eq!(translator.t("message.hello"), "hello world");
}

// ---------------------------------------------------------------------
// Locale selection
// ---------------------------------------------------------------------

#[test]
fn per_call_locale_override() {
    let translator = translator_with(
        "en",
        &[
            ("en", "hi", "hi kazupon !"),
            ("ja", "hi", "こんにちは　かずぽん！"),
        ],
    );
    let result = translator
        .translate("hi", &TranslateOptions::new().with_locale("ja"))
        .unwrap();
    assert_eq!(result.as_text(), Some("こんにちは　かずぽん！"));
}

#[traced_test]
#[test]
fn fallback_resolves_and_warns_once() {
    let mut translator = translator_with("en", &[("ja", "hello", "こんにちは！")]);
    translator.set_fallback_locales(["ja"]);
    translator.set_missing_warn(false);
    assert_eq!(translator.t("hello"), "こんにちは！");
    assert!(logs_contain(
        "Fall back to translate 'hello' with 'ja' locale."
    ));
}

#[traced_test]
#[test]
fn fallback_warns_per_hop_when_never_found() {
    let mut translator = Translator::new("en");
    translator.add_message("en", "unused", "x");
    translator.add_message("ja", "unused", "x");
    translator.set_fallback_locales(["ja", "fr"]);
    translator.set_missing_warn(false);
    assert_eq!(translator.t("hello.world"), "hello.world");
    assert!(logs_contain(
        "Fall back to translate 'hello.world' with 'ja,fr' locale."
    ));
    assert!(logs_contain(
        "Fall back to translate 'hello.world' with 'fr' locale."
    ));
    logs_assert(|lines: &[&str]| {
        let hops = lines
            .iter()
            .filter(|line| line.contains("Fall back to translate"))
            .count();
        if hops == 2 {
            Ok(())
        } else {
            Err(format!("expected 2 fallback warnings, saw {hops}"))
        }
    });
}

#[traced_test]
#[test]
fn fallback_warn_false_suppresses() {
    let mut translator = Translator::new("en");
    translator.set_fallback_locales(["ja", "fr"]);
    translator.set_missing_warn(false);
    translator.set_fallback_warn(false);
    assert_eq!(translator.t("hello.world"), "hello.world");
    assert!(!logs_contain("Fall back to translate"));
}

#[traced_test]
#[test]
fn fallback_warn_pattern_gates_by_key() {
    let mut translator = Translator::new("en");
    translator.set_fallback_locales(["ja"]);
    translator.set_missing_warn(false);
    translator.set_fallback_warn(WarnFilter::Keys(Regex::new("^hello").unwrap()));
    assert_eq!(translator.t("hello.world"), "hello.world");
    assert_eq!(translator.t("hi"), "hi");
    logs_assert(|lines: &[&str]| {
        let hops = lines
            .iter()
            .filter(|line| line.contains("Fall back to translate"))
            .count();
        if hops == 1 {
            Ok(())
        } else {
            Err(format!("expected 1 fallback warning, saw {hops}"))
        }
    });
}

#[traced_test]
#[test]
fn per_call_fallback_warn_override() {
    let mut translator = translator_with("en", &[("ja", "hello", "こんにちは！")]);
    translator.set_fallback_locales(["ja"]);
    translator.set_missing_warn(false);
    assert_eq!(translator.t("hello"), "こんにちは！");
    let result = translator
        .translate("hi", &TranslateOptions::new().with_fallback_warn(false))
        .unwrap();
    assert_eq!(result.as_text(), Some("hi"));
    logs_assert(|lines: &[&str]| {
        let hops = lines
            .iter()
            .filter(|line| line.contains("Fall back to translate"))
            .count();
        if hops == 1 {
            Ok(())
        } else {
            Err(format!("expected 1 fallback warning, saw {hops}"))
        }
    });
}

#[test]
fn duplicate_fallback_locales_are_visited_once() {
    let mut translator = translator_with("en", &[("ja", "hello", "こんにちは！")]);
    translator.set_fallback_locales(["en", "ja", "en", "ja"]);
    translator.set_fallback_warn(false);
    translator.set_missing_warn(false);
    assert_eq!(translator.t("hello"), "こんにちは！");
}

// ---------------------------------------------------------------------
// Missing-key degradation
// ---------------------------------------------------------------------

#[traced_test]
#[test]
fn missing_key_warns_and_returns_key() {
    let translator = translator_with("en", &[("en", "unused", "x")]);
    assert_eq!(translator.t("hello"), "hello");
    assert!(logs_contain(
        "Cannot translate the value of 'hello'. Use the value of key as default."
    ));
}

#[traced_test]
#[test]
fn missing_warn_false_suppresses() {
    let mut translator = Translator::new("en");
    translator.set_missing_warn(false);
    assert_eq!(translator.t("hello"), "hello");
    assert!(!logs_contain("Cannot translate"));
}

#[traced_test]
#[test]
fn missing_warn_pattern_gates_by_key() {
    let mut translator = Translator::new("en");
    translator.set_missing_warn(WarnFilter::Keys(Regex::new("^hi").unwrap()));
    assert_eq!(translator.t("hi kazupon!"), "hi kazupon!");
    assert_eq!(translator.t("hello"), "hello");
    logs_assert(|lines: &[&str]| {
        let count = lines
            .iter()
            .filter(|line| line.contains("Cannot translate"))
            .count();
        if count == 1 {
            Ok(())
        } else {
            Err(format!("expected 1 missing warning, saw {count}"))
        }
    });
}

#[traced_test]
#[test]
fn per_call_missing_warn_override() {
    let translator = Translator::new("en");
    let result = translator
        .translate("hello", &TranslateOptions::new().with_missing_warn(false))
        .unwrap();
    assert_eq!(result.as_text(), Some("hello"));
    assert!(!logs_contain("Cannot translate"));
}

#[test]
fn default_message_literal() {
    let translator = Translator::new("en");
    let result = translator
        .translate(
            "hello",
            &TranslateOptions::new().with_default("hello, default message!"),
        )
        .unwrap();
    assert_eq!(result.as_text(), Some("hello, default message!"));
}

#[test]
fn default_message_is_a_format() {
    let translator = Translator::new("en");
    let result = translator
        .translate(
            "hello",
            &TranslateOptions::new()
                .with_default("hello, {name}!")
                .with_named("name", "kazupon"),
        )
        .unwrap();
    assert_eq!(result.as_text(), Some("hello, kazupon!"));
}

#[test]
fn key_as_default_message() {
    let translator = Translator::new("en");
    let result = translator
        .translate(
            "hi {name}!",
            &TranslateOptions::new()
                .with_key_as_default()
                .with_named("name", "kazupon"),
        )
        .unwrap();
    assert_eq!(result.as_text(), Some("hi kazupon!"));
}

#[traced_test]
#[test]
fn fallback_format_uses_key_as_format() {
    let mut translator = Translator::new("en");
    translator.set_fallback_format(true);
    let result = translator
        .translate(
            "hi, {name}!",
            &TranslateOptions::new().with_named("name", "kazupon"),
        )
        .unwrap();
    assert_eq!(result.as_text(), Some("hi, kazupon!"));
    assert!(!logs_contain("Cannot translate"));
}

#[test]
fn explicit_default_beats_fallback_format() {
    let mut translator = Translator::new("en");
    translator.set_fallback_format(true);
    let result = translator
        .translate(
            "hi, {name}!",
            &TranslateOptions::new()
                .with_named("name", "kazupon")
                .with_default("hello, {name}!"),
        )
        .unwrap();
    assert_eq!(result.as_text(), Some("hello, kazupon!"));
}

#[traced_test]
#[test]
fn missing_handler_supplies_value_and_suppresses_warn() {
    let mut translator = Translator::new("en");
    translator.set_missing_handler(|locale, key| {
        assert_eq!(locale, "en");
        assert_eq!(key, "hello");
        Some("HELLO".to_string())
    });
    assert_eq!(translator.t("hello"), "HELLO");
    assert!(!logs_contain("Cannot translate"));
}

#[test]
fn missing_handler_none_falls_back_to_key() {
    let mut translator = Translator::new("en");
    translator.set_missing_handler(|_, _| None);
    assert_eq!(translator.t("hello"), "hello");
}

#[test]
fn unresolving_returns_sentinel() {
    let mut translator = Translator::new("en");
    translator.set_fallback_locales(["ja", "fr"]);
    translator.set_missing_warn(false);
    translator.set_fallback_warn(false);
    translator.set_unresolving(true);
    let result = translator
        .translate("hello.world", &TranslateOptions::default())
        .unwrap();
    assert_eq!(result, Translated::NotResolved);
}

#[test]
fn default_beats_unresolving() {
    let mut translator = Translator::new("en");
    translator.set_missing_warn(false);
    translator.set_unresolving(true);
    let result = translator
        .translate("hello", &TranslateOptions::new().with_default("fallback"))
        .unwrap();
    assert_eq!(result.as_text(), Some("fallback"));
}

// ---------------------------------------------------------------------
// Plural rules
// ---------------------------------------------------------------------

#[test]
fn custom_plural_rule_replaces_default() {
    let mut translator = translator_with(
        "ru",
        &[("ru", "car", "0 машин | {n} машина | {n} машины | {n} машин")],
    );
    translator.set_plural_rule("ru", |choice, case_count| {
        if choice == 0 {
            return 0;
        }
        let teen = (11..=19).contains(&(choice % 100));
        let ends_in_one = choice % 10 == 1;
        if !teen && ends_in_one {
            return 1;
        }
        if !teen && (2..=4).contains(&(choice % 10)) {
            return 2;
        }
        if case_count < 4 { 2 } else { 3 }
    });
    let at = |choice: i64| {
        translator
            .translate("car", &TranslateOptions::new().with_plural(choice))
            .unwrap()
            .into_text()
            .unwrap()
    };
    assert_eq!(at(1), "1 машина");
    assert_eq!(at(2), "2 машины");
    assert_eq!(at(4), "4 машины");
    assert_eq!(at(12), "12 машин");
    assert_eq!(at(21), "21 машина");
}

// ---------------------------------------------------------------------
// Hooks and rich output
// ---------------------------------------------------------------------

#[test]
fn post_translation_hook_transforms_text() {
    let mut translator = translator_with("en", &[("en", "hi", "hi kazupon !")]);
    translator.set_post_translation(|text| format!("[{text}]"));
    assert_eq!(translator.t("hi"), "[hi kazupon !]");
}

#[test]
fn parts_mode_returns_typed_parts() {
    let translator = translator_with("en", &[("en", "hi", "hi {name} !")]);
    let result = translator
        .translate(
            "hi",
            &TranslateOptions::new()
                .with_named("name", "kazupon")
                .with_parts(),
        )
        .unwrap();
    let Translated::Parts(parts) = result else {
        panic!("expected parts output");
    };
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0].kind, PartKind::Text);
    assert_eq!(parts[1].kind, PartKind::Named);
    assert_eq!(parts[1].value, "kazupon");
}

#[test]
fn default_mode_is_text() {
    assert_eq!(TranslateOptions::default().mode, OutputMode::Text);
    assert_eq!(
        TranslateOptions::new().with_default("x").default_message,
        Some(DefaultMessage::Literal("x".to_string()))
    );
}

// ---------------------------------------------------------------------
// Table CRUD
// ---------------------------------------------------------------------

#[test]
fn locale_message_crud_round_trip() {
    let mut translator = Translator::new("en");
    translator.set_locale_message(
        "en",
        MessageTree::group([("hello", MessageTree::leaf("Hello!"))]),
    );
    assert_eq!(
        translator
            .get_locale_message("en")
            .and_then(|tree| tree.lookup("hello")),
        Some("Hello!")
    );

    translator.set_locale_message("en", MessageTree::group([("hi", MessageTree::leaf("Hi!"))]));
    assert_eq!(
        translator
            .get_locale_message("en")
            .and_then(|tree| tree.lookup("hello")),
        None,
        "set replaces wholesale"
    );

    translator.merge_locale_message(
        "en",
        MessageTree::group([("hello", MessageTree::leaf("Hello!"))]),
    );
    assert_eq!(translator.t("hello"), "Hello!");
    assert_eq!(translator.t("hi"), "Hi!");
}

#[test]
fn available_locales_are_sorted() {
    let translator = translator_with(
        "en",
        &[
            ("en", "hi", "x"),
            ("ja", "hi", "x"),
            ("ru", "hi", "x"),
            ("fr", "hi", "x"),
        ],
    );
    assert_eq!(translator.available_locales(), vec!["en", "fr", "ja", "ru"]);
}

#[test]
fn has_translation_ignores_fallback() {
    let mut translator = translator_with("en", &[("ja", "hello", "こんにちは！")]);
    translator.set_fallback_locales(["ja"]);
    assert!(!translator.has_translation("hello", None));
    assert!(translator.has_translation("hello", Some("ja")));
}

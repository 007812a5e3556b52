// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derives a stable identity for a test from its report.
//!
//! Everything here is a pure function of a [`TestReport`]: no function fails or panics, however
//! degenerate the input. The strings produced by [`resolve_summary`] and [`resolve_description`]
//! are written into tracker issues and later compared byte-for-byte by the
//! [matcher](crate::matcher), so their format must not change: issues filed with an older format
//! stop matching and are filed again as new issues.

use swrite::{SWrite, swrite};
use tracker_notifier_metadata::TestReport;
use unicode_general_category::{GeneralCategory, get_general_category};

/// Label key whose value overrides the test name, as in `name:create_cluster`.
pub const NAME_LABEL_KEY: &str = "name";

/// Label key whose value names the maintainer of a test, as in `maintainer:alice`.
pub const MAINTAINER_LABEL_KEY: &str = "maintainer";

/// Marker at which a stack trace is cut to isolate the failing function's signature.
const ADDRESS_MARKER: &str = "0x";

/// The identity of one test, derived from its report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// The canonical test name. Never empty.
    pub test_name: String,

    /// The maintainer from the `maintainer:` label, or empty.
    pub maintainer: String,

    /// A human-readable summary, also used as a tracker issue summary. Never empty.
    pub summary: String,

    /// The tracker issue description. Never empty.
    pub description: String,

    /// Whether the test is inherently serial.
    pub is_serial: bool,
}

impl ResolvedIdentity {
    /// Resolves every part of the identity of `report`.
    pub fn new(report: &TestReport) -> Self {
        Self {
            test_name: resolve_name(report),
            maintainer: resolve_maintainer(report).to_owned(),
            summary: resolve_summary(report).to_owned(),
            description: resolve_description(report),
            is_serial: is_serial(report),
        }
    }
}

/// Returns the canonical name of a test.
///
/// In order of preference:
/// 1. the value of the first `name:<value>` label with a non-empty value;
/// 2. the leaf text with every space replaced by `_`;
/// 3. the string form of the leaf type.
pub fn resolve_name(report: &TestReport) -> String {
    match label_value(&report.labels, NAME_LABEL_KEY) {
        Some(name) => name.to_owned(),
        _ if !report.leaf_text.is_empty() => report.leaf_text.replace(' ', "_"),
        _ => report.leaf_type.as_str().to_owned(),
    }
}

/// Returns the maintainer named by the first `maintainer:<value>` label, or an empty string.
pub fn resolve_maintainer(report: &TestReport) -> &str {
    label_value(&report.labels, MAINTAINER_LABEL_KEY).unwrap_or_default()
}

/// Returns the leaf text, or the string form of the leaf type if the leaf text is empty.
pub fn resolve_summary(report: &TestReport) -> &str {
    if report.leaf_text.is_empty() {
        report.leaf_type.as_str()
    } else {
        &report.leaf_text
    }
}

/// Returns the container texts and the leaf text joined by spaces, for notification text.
///
/// Falls back to [`resolve_summary`] for suite-level nodes, which have neither.
pub fn resolve_full_display_name(report: &TestReport) -> String {
    let full_text = report.full_text();
    if full_text.is_empty() {
        resolve_summary(report).to_owned()
    } else {
        full_text
    }
}

/// Returns the prefix of `stack_trace` before the first `0x`, or an empty string if there is
/// none.
///
/// Platform stack dumps embed raw addresses after the function signature lines, so the prefix
/// approximates "where the failure happened". This is purely textual.
pub fn extract_failure_location(stack_trace: &str) -> &str {
    match stack_trace.find(ADDRESS_MARKER) {
        Some(index) => &stack_trace[..index],
        None => "",
    }
}

/// Returns the tracker issue description: `Test "<summary>" failed: "<failure location>"`.
///
/// Both parts are quoted with [`quote`]. A report without a stack trace yields an empty failure
/// location, i.e. `Test "<summary>" failed: ""`.
pub fn resolve_description(report: &TestReport) -> String {
    let summary = resolve_summary(report);
    let failure_location = extract_failure_location(report.failure_stack_trace());
    format!(
        "Test {} failed: {}",
        quote(summary),
        quote(failure_location)
    )
}

/// Returns true if the test ran serially.
///
/// Synchronized suite hooks carry no labels and no serial flag, yet run once across all workers,
/// so they always count as serial.
pub fn is_serial(report: &TestReport) -> bool {
    report.leaf_type.is_synchronized_suite() || report.is_serial || report.is_in_ordered_container
}

/// Returns false for synchronized suite hooks reported by a non-primary worker.
///
/// Those hooks are reported by every parallel worker but only the primary worker's report
/// carries real data; forwarding the others would file one issue per worker.
pub fn is_primary_report(report: &TestReport) -> bool {
    !report.leaf_type.is_synchronized_suite() || report.is_primary_process()
}

/// Quotes `s` as a double-quoted string literal with backslash escapes.
///
/// Printable characters are kept verbatim. `"` and `\` are escaped, as are the C escapes
/// `\a \b \f \n \r \t \v`; other non-printable characters become `\xNN`, `\uNNNN` or
/// `\UNNNNNNNN`.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0b}' => out.push_str("\\v"),
            c if is_printable(c) => out.push(c),
            c if (c as u32) < 0x80 => swrite!(out, "\\x{:02x}", c as u32),
            c if (c as u32) < 0x10000 => swrite!(out, "\\u{:04x}", c as u32),
            c => swrite!(out, "\\U{:08x}", c as u32),
        }
    }
    out.push('"');
    out
}

/// Letters, marks, numbers, punctuation, symbols and the ASCII space are printable. Other
/// separators, control, format, private-use and unassigned code points are escaped.
fn is_printable(c: char) -> bool {
    c == ' '
        || !matches!(
            get_general_category(c),
            GeneralCategory::SpaceSeparator
                | GeneralCategory::LineSeparator
                | GeneralCategory::ParagraphSeparator
                | GeneralCategory::Control
                | GeneralCategory::Format
                | GeneralCategory::Surrogate
                | GeneralCategory::PrivateUse
                | GeneralCategory::Unassigned
        )
}

/// Returns the value of the first label that contains `key` and splits on `:` into exactly two
/// parts, the second of them non-empty.
///
/// Matching is by substring, so `username:x` also matches the `name` key. Labels with more than
/// one `:`, or with nothing after the `:`, never match.
fn label_value<'a>(labels: &'a [String], key: &str) -> Option<&'a str> {
    labels.iter().find_map(|label| {
        if !label.contains(key) {
            return None;
        }
        let mut parts = label.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(value), None) if !value.is_empty() => Some(value),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;
    use test_strategy::proptest;
    use tracker_notifier_metadata::{CodeLocation, Failure, LeafType, SpecState};

    fn report_with_trace(leaf_text: &str, stack_trace: &str) -> TestReport {
        TestReport {
            leaf_text: leaf_text.to_owned(),
            state: SpecState::Failed,
            failure: Failure {
                location: CodeLocation {
                    full_stack_trace: stack_trace.to_owned(),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test_case(&["name:create_cluster"], "Create a cluster", "create_cluster" ; "name label wins")]
    #[test_case(&["env:ci", "name:first", "name:second"], "", "first" ; "first name label wins")]
    #[test_case(&["name:a:b"], "with extra colons", "with_extra_colons" ; "extra colons ignored")]
    #[test_case(&["name:"], "empty label value", "empty_label_value" ; "empty value falls back")]
    #[test_case(&["name:", "name:foo"], "later label", "foo" ; "empty value skipped")]
    #[test_case(&["username:bob"], "substring match", "bob" ; "substring key match")]
    #[test_case(&["maintainer:alice"], "no name label", "no_name_label" ; "maintainer is not a name")]
    #[test_case(&[], "", "It" ; "leaf type fallback")]
    fn name_resolution(labels: &[&str], leaf_text: &str, expected: &str) {
        let report = TestReport {
            labels: labels.iter().map(|s| (*s).to_owned()).collect(),
            leaf_text: leaf_text.to_owned(),
            ..Default::default()
        };
        assert_eq!(resolve_name(&report), expected);
    }

    #[test_case(&["maintainer:alice", "name:x"], "alice" ; "maintainer label")]
    #[test_case(&["maintainer:alice:bob"], "" ; "extra colons")]
    #[test_case(&["maintainer:", "maintainer:bob"], "bob" ; "empty value skipped")]
    #[test_case(&["owner:alice"], "" ; "unrelated label")]
    #[test_case(&[], "" ; "no labels")]
    fn maintainer_resolution(labels: &[&str], expected: &str) {
        let report = TestReport {
            labels: labels.iter().map(|s| (*s).to_owned()).collect(),
            ..Default::default()
        };
        assert_eq!(resolve_maintainer(&report), expected);
    }

    #[test]
    fn summary_and_display_name_for_suite_node() {
        let report = TestReport {
            leaf_type: LeafType::SynchronizedBeforeSuite,
            ..Default::default()
        };
        assert_eq!(resolve_summary(&report), "SynchronizedBeforeSuite");
        assert_eq!(resolve_full_display_name(&report), "SynchronizedBeforeSuite");
        assert_eq!(resolve_name(&report), "SynchronizedBeforeSuite");
    }

    #[test]
    fn display_name_joins_containers() {
        let report = TestReport {
            leaf_text: "return ordered list".to_owned(),
            container_path: vec!["Verify list methods".to_owned()],
            ..Default::default()
        };
        assert_eq!(
            resolve_full_display_name(&report),
            "Verify list methods return ordered list"
        );
        assert_eq!(resolve_summary(&report), "return ordered list");
    }

    #[test_case("abc\n0x1234...", "abc\n" ; "cut before address")]
    #[test_case("no address here", "" ; "no address")]
    #[test_case("", "" ; "empty trace")]
    #[test_case("0xdeadbeef", "" ; "address first")]
    #[test_case("f()\n\tfile.go:10 +0x1d\ng()\n\tfile.go:20 +0x2e", "f()\n\tfile.go:10 +" ; "first address only")]
    fn failure_location(stack_trace: &str, expected: &str) {
        assert_eq!(extract_failure_location(stack_trace), expected);
    }

    #[test]
    fn description_without_stack_trace() {
        let report = report_with_trace("return ordered list", "");
        assert_eq!(
            resolve_description(&report),
            r#"Test "return ordered list" failed: """#
        );
    }

    #[test]
    fn description_escapes_failure_location() {
        let report = report_with_trace(
            "deletes \"stale\" clusters",
            "e2e.glob..func3()\n\t/src/e2e/cluster_test.go:42 +0x1d\n",
        );
        assert_eq!(
            resolve_description(&report),
            r#"Test "deletes \"stale\" clusters" failed: "e2e.glob..func3()\n\t/src/e2e/cluster_test.go:42 +""#
        );
    }

    #[test_case("plain", r#""plain""# ; "plain")]
    #[test_case("back\\slash", r#""back\\slash""# ; "backslash")]
    #[test_case("bell\u{07}", r#""bell\a""# ; "bell")]
    #[test_case("esc\u{1b}", r#""esc\x1b""# ; "escape byte")]
    #[test_case("del\u{7f}", r#""del\x7f""# ; "delete byte")]
    #[test_case("nbsp\u{a0}", r#""nbsp\u00a0""# ; "non breaking space")]
    #[test_case("héllo wörld", r#""héllo wörld""# ; "printable unicode")]
    #[test_case("a\u{200b}b", r#""a\u200bb""# ; "zero width space")]
    #[test_case("soft\u{ad}hyphen", r#""soft\u00adhyphen""# ; "soft hyphen")]
    #[test_case("\u{feff}bom", r#""\ufeffbom""# ; "byte order mark")]
    #[test_case("word\u{2060}joiner", r#""word\u2060joiner""# ; "word joiner")]
    #[test_case("private\u{e000}", r#""private\ue000""# ; "private use")]
    #[test_case("line\u{2028}sep", r#""line\u2028sep""# ; "line separator")]
    #[test_case("unassigned\u{10ffff}", r#""unassigned\U0010ffff""# ; "unassigned")]
    #[test_case("emoji \u{1f600}", "\"emoji \u{1f600}\"" ; "emoji")]
    fn quoting(input: &str, expected: &str) {
        assert_eq!(quote(input), expected);
    }

    #[test_case(LeafType::SynchronizedBeforeSuite, false, false, true ; "synchronized before suite")]
    #[test_case(LeafType::SynchronizedAfterSuite, false, false, true ; "synchronized after suite")]
    #[test_case(LeafType::It, true, false, true ; "serial test")]
    #[test_case(LeafType::It, false, true, true ; "ordered container")]
    #[test_case(LeafType::It, false, false, false ; "parallel test")]
    #[test_case(LeafType::BeforeSuite, false, false, false ; "plain before suite")]
    fn serial_detection(
        leaf_type: LeafType,
        is_serial_flag: bool,
        is_in_ordered_container: bool,
        expected: bool,
    ) {
        let report = TestReport {
            leaf_type,
            is_serial: is_serial_flag,
            is_in_ordered_container,
            ..Default::default()
        };
        assert_eq!(is_serial(&report), expected);
    }

    #[test_case(LeafType::SynchronizedBeforeSuite, 1, true ; "primary worker")]
    #[test_case(LeafType::SynchronizedBeforeSuite, 2, false ; "secondary worker")]
    #[test_case(LeafType::SynchronizedAfterSuite, 3, false ; "secondary worker after suite")]
    #[test_case(LeafType::It, 3, true ; "ordinary test on any worker")]
    fn primary_reports(leaf_type: LeafType, parallel_process: u32, expected: bool) {
        let report = TestReport {
            leaf_type,
            parallel_process,
            ..Default::default()
        };
        assert_eq!(is_primary_report(&report), expected);
    }

    #[proptest(cases = 256)]
    fn name_label_always_wins(
        mut report: TestReport,
        #[strategy("[a-z_]{1,12}")] name: String,
    ) {
        report.labels.retain(|label| !label.contains(NAME_LABEL_KEY));
        report.labels.insert(0, format!("name:{name}"));
        assert_eq!(resolve_name(&report), name);
    }

    #[proptest(cases = 256)]
    fn leaf_text_name_has_no_spaces(
        mut report: TestReport,
        #[strategy("[a-z]{1,6}( [a-z]{1,6}){1,4}")] leaf_text: String,
    ) {
        report.labels.clear();
        report.leaf_text = leaf_text.clone();
        let name = resolve_name(&report);
        assert!(!name.contains(' '));
        assert_eq!(name, leaf_text.replace(' ', "_"));
    }

    #[proptest(cases = 256)]
    fn leaf_type_name_without_labels_or_text(mut report: TestReport) {
        report.labels.clear();
        report.leaf_text.clear();
        assert_eq!(resolve_name(&report), report.leaf_type.as_str());
    }

    #[proptest(cases = 512)]
    fn identity_strings_never_empty(report: TestReport) {
        let identity = ResolvedIdentity::new(&report);
        assert!(!identity.test_name.is_empty());
        assert!(!identity.summary.is_empty());
        assert!(!identity.description.is_empty());
        assert!(!resolve_full_display_name(&report).is_empty());
    }

    #[proptest(cases = 256)]
    fn synchronized_suite_always_serial(mut report: TestReport, synchronized_after: bool) {
        report.leaf_type = if synchronized_after {
            LeafType::SynchronizedAfterSuite
        } else {
            LeafType::SynchronizedBeforeSuite
        };
        report.is_serial = false;
        report.is_in_ordered_container = false;
        assert!(is_serial(&report));
    }

    #[proptest(cases = 256)]
    fn description_is_deterministic(report: TestReport) {
        let copy = report.clone();
        assert_eq!(resolve_description(&report), resolve_description(&copy));
    }
}

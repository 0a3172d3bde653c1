//! Editor profile payload and its conversion into an [`EditSnapshot`].
//!
//! The profile is served either as JSON or embedded in the editor's public
//! profile page. Two embeddings have been used over time:
//!
//! ```text
//! gon.data={...};gon.env=...
//! W.EditorProfile.data = JSON.parse('{...}')
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::MonitorError;
use crate::monitor::{CategoryCount, EditSnapshot, TrackedCategory};

static GON_DATA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)gon\.data\s*=\s*(\{.*?\});\s*gon\.env\s*=").unwrap());

static EDITOR_PROFILE_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)W\.EditorProfile\.data\s*=\s*JSON\.parse\('(.*)'\)").unwrap()
});

/// Which number becomes the snapshot's total count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountSource {
    /// Today's edits: the last entry of the editing activity series.
    #[default]
    Daily,
    /// The profile's cumulative edit total.
    Total,
}

/// One entry of the profile's per-type edit counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditsByType {
    pub key: String,
    pub value: u64,
}

/// The subset of an editor profile the monitor reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    /// Daily edit counts, oldest first. The last entry is today.
    #[serde(default)]
    pub editing_activity: Vec<u64>,
    #[serde(default)]
    pub edits_by_type: Vec<EditsByType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_edits: Option<u64>,
}

impl ProfilePayload {
    /// Parse a JSON profile.
    pub fn from_json(body: &str) -> Result<Self, MonitorError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Extract and parse the profile embedded in a profile page.
    pub fn from_markup(page: &str) -> Result<Self, MonitorError> {
        let json = extract_embedded_profile(page)?;
        Self::from_json(&json)
    }

    /// Count for one category key, if the profile reports it.
    pub fn count_for(&self, key: &str) -> Option<u64> {
        self.edits_by_type.iter().find(|e| e.key == key).map(|e| e.value)
    }

    /// Build a snapshot covering exactly the tracked categories.
    pub fn to_snapshot(
        &self,
        tracked: &[TrackedCategory],
        source: CountSource,
    ) -> Result<EditSnapshot, MonitorError> {
        let total_count = match source {
            CountSource::Daily => *self
                .editing_activity
                .last()
                .ok_or_else(|| MonitorError::unavailable("profile has no editing activity"))?,
            CountSource::Total => self
                .total_edits
                .ok_or_else(|| MonitorError::unavailable("profile has no total edit count"))?,
        };

        let categories = tracked
            .iter()
            .map(|c| (c.key.clone(), CategoryCount::from(self.count_for(&c.key))))
            .collect();

        Ok(EditSnapshot {
            total_count,
            categories,
        })
    }
}

/// Pull the embedded profile JSON out of a profile page.
pub fn extract_embedded_profile(page: &str) -> Result<String, MonitorError> {
    if let Some(caps) = GON_DATA.captures(page) {
        return Ok(caps[1].to_string());
    }
    if let Some(caps) = EDITOR_PROFILE_DATA.captures(page) {
        return Ok(unescape_single_quoted(&caps[1]));
    }
    Err(MonitorError::unavailable(
        "no embedded profile data found in page",
    ))
}

/// Decode a single-quoted script string literal into the string it denotes.
///
/// The page hands the result to `JSON.parse`, so this must run before the
/// JSON parser sees it: `\\"` becomes `\"` and `\"` becomes `"`.
fn unescape_single_quoted(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            'x' => match take_hex(&mut chars, 2) {
                Some(code) => out.push(char::from(code as u8)),
                None => out.push('x'),
            },
            'u' => match take_unicode_escape(&mut chars) {
                Some(decoded) => out.push(decoded),
                None => out.push('u'),
            },
            // line continuation
            '\n' => {}
            // \\ \' \" \/ and any other character stand for themselves
            other => out.push(other),
        }
    }
    out
}

/// Consume exactly `len` hex digits, leaving `chars` untouched if they are
/// not there.
fn take_hex(chars: &mut std::str::Chars<'_>, len: usize) -> Option<u32> {
    let rest = chars.as_str();
    let digits = rest.get(..len)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let code = u32::from_str_radix(digits, 16).ok()?;
    *chars = rest[len..].chars();
    Some(code)
}

/// Decode the body of a `\u` escape: `XXXX`, a surrogate pair written as two
/// escapes, or `{X...}`. A lone surrogate decodes to U+FFFD.
fn take_unicode_escape(chars: &mut std::str::Chars<'_>) -> Option<char> {
    let rest = chars.as_str();
    if let Some(braced) = rest.strip_prefix('{') {
        let close = braced.find('}')?;
        let digits = &braced[..close];
        if digits.is_empty()
            || digits.len() > 6
            || !digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            return None;
        }
        let decoded = char::from_u32(u32::from_str_radix(digits, 16).ok()?)?;
        *chars = braced[close + 1..].chars();
        return Some(decoded);
    }

    let high = take_hex(chars, 4)?;
    if !(0xD800..=0xDBFF).contains(&high) {
        return Some(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER));
    }

    let mut lookahead = chars.clone();
    if lookahead.as_str().starts_with("\\u") {
        lookahead.nth(1);
        if let Some(low) = take_hex(&mut lookahead, 4) {
            if (0xDC00..=0xDFFF).contains(&low) {
                *chars = lookahead;
                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                return Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
    }
    Some(char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "editingActivity": [3, 0, 12, 41],
            "editsByType": [
                {"key": "mapUpdateRequest", "value": 17},
                {"key": "machineMapProblem", "value": 5},
                {"key": "segment", "value": 900}
            ],
            "totalEdits": 15230,
            "rank": 3
        }"#
    }

    #[test]
    fn test_parse_json_profile() {
        let payload = ProfilePayload::from_json(sample_json()).unwrap();
        assert_eq!(payload.editing_activity, vec![3, 0, 12, 41]);
        assert_eq!(payload.count_for("segment"), Some(900));
        assert_eq!(payload.count_for("venue"), None);
        assert_eq!(payload.total_edits, Some(15230));
    }

    #[test]
    fn test_daily_snapshot_uses_last_activity_entry() {
        let payload = ProfilePayload::from_json(sample_json()).unwrap();
        let snapshot = payload
            .to_snapshot(&TrackedCategory::defaults(), CountSource::Daily)
            .unwrap();
        assert_eq!(snapshot.total_count, 41);
        assert_eq!(
            snapshot.category("mapUpdateRequest"),
            Some(CategoryCount::Known(17))
        );
        assert_eq!(
            snapshot.category("machineMapProblem"),
            Some(CategoryCount::Known(5))
        );
        // untracked categories are not copied
        assert_eq!(snapshot.category("segment"), None);
    }

    #[test]
    fn test_total_snapshot() {
        let payload = ProfilePayload::from_json(sample_json()).unwrap();
        let snapshot = payload.to_snapshot(&[], CountSource::Total).unwrap();
        assert_eq!(snapshot.total_count, 15230);
        assert!(snapshot.categories.is_empty());
    }

    #[test]
    fn test_missing_category_is_unknown() {
        let payload = ProfilePayload::from_json(sample_json()).unwrap();
        let tracked = vec![TrackedCategory::new("venueUpdateRequest", "PURs")];
        let snapshot = payload.to_snapshot(&tracked, CountSource::Daily).unwrap();
        assert_eq!(
            snapshot.category("venueUpdateRequest"),
            Some(CategoryCount::Unknown)
        );
    }

    #[test]
    fn test_empty_activity_is_unavailable() {
        let payload = ProfilePayload::from_json(r#"{"editsByType": []}"#).unwrap();
        let err = payload.to_snapshot(&[], CountSource::Daily).unwrap_err();
        assert!(err.is_data_unavailable());

        let err = payload.to_snapshot(&[], CountSource::Total).unwrap_err();
        assert!(err.is_data_unavailable());
    }

    #[test]
    fn test_malformed_json_is_unavailable() {
        let err = ProfilePayload::from_json("{\"editingActivity\": [1,").unwrap_err();
        assert!(err.is_data_unavailable());
    }

    #[test]
    fn test_extract_gon_data() {
        let page = r#"<html><script>
            gon.data={"editingActivity":[1,2,7],"editsByType":[{"key":"mapUpdateRequest","value":2}]};gon.env="production";
        </script></html>"#;
        let payload = ProfilePayload::from_markup(page).unwrap();
        assert_eq!(payload.editing_activity, vec![1, 2, 7]);
        assert_eq!(payload.count_for("mapUpdateRequest"), Some(2));
    }

    #[test]
    fn test_extract_editor_profile_data() {
        let page = r#"<script>W.EditorProfile.data = JSON.parse('{"editingActivity":[4,9],"editsByType":[{"key":"venue","value":1}],"username":"o\'brien"}')</script>"#;
        let payload = ProfilePayload::from_markup(page).unwrap();
        assert_eq!(payload.editing_activity, vec![4, 9]);
        assert_eq!(payload.count_for("venue"), Some(1));
    }

    #[test]
    fn test_extract_without_profile_fails() {
        let err = extract_embedded_profile("<html>Sign in</html>").unwrap_err();
        assert!(err.is_data_unavailable());
    }

    #[test]
    fn test_extract_editor_profile_with_escaped_backslash() {
        // The script literal \\" is the JSON escape \" once the page decodes it.
        let page = r#"<script>W.EditorProfile.data = JSON.parse('{"editingActivity":[4,9],"editsByType":[{"key":"venue","value":1}],"username":"a\\"b"}')</script>"#;
        let payload = ProfilePayload::from_markup(page).unwrap();
        assert_eq!(payload.editing_activity, vec![4, 9]);
        assert_eq!(payload.count_for("venue"), Some(1));
    }

    #[test]
    fn test_extract_editor_profile_with_escaped_quotes() {
        let page = r#"<script>W.EditorProfile.data = JSON.parse('{\"editingActivity\":[2,5],\"editsByType\":[{\"key\":\"mapUpdateRequest\",\"value\":8}]}')</script>"#;
        let payload = ProfilePayload::from_markup(page).unwrap();
        assert_eq!(payload.editing_activity, vec![2, 5]);
        assert_eq!(payload.count_for("mapUpdateRequest"), Some(8));
    }

    #[test]
    fn test_unescape_script_literal() {
        assert_eq!(unescape_single_quoted(r#"it\'s"#), "it's");
        assert_eq!(unescape_single_quoted(r#"a\"b"#), r#"a"b"#);
        assert_eq!(unescape_single_quoted(r#"a\\"b"#), r#"a\"b"#);
        assert_eq!(unescape_single_quoted(r"a\/b"), "a/b");
        assert_eq!(unescape_single_quoted(r"a\nb\tc\rd"), "a\nb\tc\rd");
        assert_eq!(unescape_single_quoted(r"\b\f"), "\u{8}\u{c}");
        assert_eq!(unescape_single_quoted(r"caf\xe9"), "café");
        assert_eq!(unescape_single_quoted(r"caf\u00e9"), "café");
        assert_eq!(unescape_single_quoted(r"\u{1F600}"), "\u{1F600}");
        assert_eq!(unescape_single_quoted(r"\ud83d\ude00"), "\u{1F600}");
        assert_eq!(unescape_single_quoted(r"é"), "é");
    }

    #[test]
    fn test_unescape_malformed_escapes() {
        assert_eq!(unescape_single_quoted(r"\xZZ"), "xZZ");
        assert_eq!(unescape_single_quoted(r"\u12"), "u12");
        assert_eq!(unescape_single_quoted(r"\ud83d!"), "\u{FFFD}!");
        assert_eq!(unescape_single_quoted("trailing\\"), "trailing\\");
    }
}

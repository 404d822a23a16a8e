// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Quote- and bracket-aware string splitting.
//!
//! Metastore type descriptors nest composite types (`map<string,struct<a:int>>`)
//! and may quote identifiers, so a plain `str::split` breaks argument lists in
//! the wrong places. [`aware_split`] only splits on a delimiter that sits at
//! bracket depth zero and outside a quoted region.

use std::borrow::Cow;

use thiserror::Error;

/// Errors raised for out-of-domain splitter arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("max_split must be >= -1, got {0}")]
    InvalidMaxSplit(i64),
}

/// Options controlling [`aware_split`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// Character that terminates a segment at depth zero.
    pub delimiter: char,
    /// Maximum number of splits; `-1` means unlimited, `0` returns the input.
    pub max_split: i64,
    /// Quote character opening and closing a quoted region.
    pub quote: char,
    /// Sequence (ending with the quote) that does not close a quoted region.
    pub escaped_quote: String,
    /// Open/close bracket pairs. All pairs share a single depth counter.
    pub brackets: Vec<(char, char)>,
    /// Count brackets that appear inside quotes.
    ///
    /// Off by default. Turning it on reproduces the historical behaviour where
    /// an unbalanced bracket inside a quoted identifier desynchronizes the
    /// remainder of the split.
    pub brackets_in_quotes: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            max_split: -1,
            quote: '"',
            escaped_quote: "\\\"".to_string(),
            brackets: vec![('(', ')')],
            brackets_in_quotes: false,
        }
    }
}

impl SplitOptions {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_max_split(mut self, max_split: i64) -> Self {
        self.max_split = max_split;
        self
    }

    /// Set the quote character together with its escaped form.
    pub fn with_quote(mut self, quote: char, escaped_quote: impl Into<String>) -> Self {
        self.quote = quote;
        self.escaped_quote = escaped_quote.into();
        self
    }

    /// Replace the bracket pairs with a single pair.
    pub fn with_brackets(mut self, open: char, close: char) -> Self {
        self.brackets = vec![(open, close)];
        self
    }

    /// Add a bracket pair that nests with the existing ones.
    pub fn with_extra_brackets(mut self, open: char, close: char) -> Self {
        self.brackets.push((open, close));
        self
    }

    pub fn count_brackets_in_quotes(mut self, enabled: bool) -> Self {
        self.brackets_in_quotes = enabled;
        self
    }

    fn is_open(&self, c: char) -> bool {
        self.brackets.iter().any(|(open, _)| *open == c)
    }

    fn is_close(&self, c: char) -> bool {
        self.brackets.iter().any(|(_, close)| *close == c)
    }
}

/// Split `input` lazily according to `options`.
///
/// The last segment is always yielded, even when empty, so splitting `"a,"`
/// yields `"a"` and `""`.
pub fn aware_split(input: &str, options: SplitOptions) -> Result<AwareSplit<'_>, SplitError> {
    if options.max_split < -1 {
        return Err(SplitError::InvalidMaxSplit(options.max_split));
    }
    Ok(AwareSplit {
        input,
        start: 0,
        remaining: options.max_split,
        depth: 0,
        in_quotes: false,
        finished: false,
        options,
    })
}

/// Iterator returned by [`aware_split`].
#[derive(Debug, Clone)]
pub struct AwareSplit<'a> {
    input: &'a str,
    start: usize,
    remaining: i64,
    depth: i64,
    in_quotes: bool,
    finished: bool,
    options: SplitOptions,
}

impl<'a> AwareSplit<'a> {
    /// True when the quote ending at byte offset `end` is preceded by the
    /// rest of the escaped-quote sequence.
    fn is_escaped(&self, end: usize) -> bool {
        let escaped = self.options.escaped_quote.as_str();
        if escaped.is_empty() {
            return false;
        }
        end.checked_sub(escaped.len())
            .and_then(|start| self.input.get(start..end))
            .is_some_and(|window| window == escaped)
    }

    fn finish(&mut self) -> Option<&'a str> {
        self.finished = true;
        Some(&self.input[self.start..])
    }
}

impl<'a> Iterator for AwareSplit<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.finished {
            return None;
        }
        if self.remaining == 0 {
            return self.finish();
        }

        let offset = self.start;
        for (i, c) in self.input[offset..].char_indices() {
            let idx = offset + i;
            let counts_brackets = self.options.brackets_in_quotes || !self.in_quotes;

            if self.depth == 0 && !self.in_quotes && c == self.options.delimiter {
                let segment = &self.input[self.start..idx];
                self.start = idx + c.len_utf8();
                if self.remaining > 0 {
                    self.remaining -= 1;
                }
                return Some(segment);
            } else if counts_brackets && self.options.is_open(c) {
                self.depth += 1;
            } else if counts_brackets && self.options.is_close(c) {
                self.depth -= 1;
            } else if c == self.options.quote {
                if !self.in_quotes {
                    self.in_quotes = true;
                } else if !self.is_escaped(idx + c.len_utf8()) {
                    self.in_quotes = false;
                }
            }
        }

        self.finish()
    }
}

impl std::iter::FusedIterator for AwareSplit<'_> {}

/// Strip one pair of surrounding `quote` characters and unescape the content.
///
/// `escape` + `quote` becomes `quote`, then `escape` + `escape` becomes
/// `escape`. Strings that do not both start and end with `quote` are returned
/// untouched.
pub fn unquote(input: &str, quote: char, escape: char) -> Cow<'_, str> {
    let Some(rest) = input.strip_prefix(quote) else {
        return Cow::Borrowed(input);
    };
    if !input.ends_with(quote) {
        return Cow::Borrowed(input);
    }
    // A lone quote character is both the opening and closing quote.
    let inner = rest.strip_suffix(quote).unwrap_or_default();

    let escaped_quote = format!("{escape}{quote}");
    let escaped_escape = format!("{escape}{escape}");
    Cow::Owned(
        inner
            .replace(&escaped_quote, &quote.to_string())
            .replace(&escaped_escape, &escape.to_string()),
    )
}

/// [`unquote`] with `"` as the quote and `\` as the escape character.
pub fn unquote_default(input: &str) -> Cow<'_, str> {
    unquote(input, '"', '\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(input: &str, options: SplitOptions) -> Vec<&str> {
        aware_split(input, options).unwrap().collect()
    }

    #[test]
    fn test_split_respects_brackets_and_quotes() {
        assert_eq!(
            split(r#"a,b,(c,d),"e,f""#, SplitOptions::default()),
            vec!["a", "b", "(c,d)", r#""e,f""#]
        );
    }

    #[test]
    fn test_split_plain() {
        assert_eq!(split("x,y,z", SplitOptions::default()), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_split_keeps_trailing_empty_segment() {
        assert_eq!(split("a,", SplitOptions::default()), vec!["a", ""]);
        assert_eq!(split("", SplitOptions::default()), vec![""]);
        assert_eq!(split(",", SplitOptions::default()), vec!["", ""]);
    }

    #[test]
    fn test_max_split_zero_returns_input() {
        for input in ["", "a,b,c", "(a,b)", r#""q,""#] {
            let options = SplitOptions::default().with_max_split(0);
            assert_eq!(split(input, options), vec![input]);
        }
    }

    #[test]
    fn test_max_split_below_minus_one_is_rejected() {
        for input in ["", "a,b"] {
            let err = aware_split(input, SplitOptions::default().with_max_split(-2)).unwrap_err();
            assert_eq!(err, SplitError::InvalidMaxSplit(-2));
            assert!(err.to_string().contains("-2"));
        }
    }

    #[test]
    fn test_max_split_bounds_number_of_segments() {
        let options = SplitOptions::default().with_max_split(1);
        assert_eq!(split("a,b,c", options), vec!["a", "b,c"]);

        let options = SplitOptions::default().with_max_split(2);
        assert_eq!(split("a,b,c,d", options), vec!["a", "b", "c,d"]);

        let options = SplitOptions::default().with_max_split(5);
        assert_eq!(split("a,b", options), vec!["a", "b"]);
    }

    #[test]
    fn test_split_on_space_with_limit() {
        let options = SplitOptions::default().with_delimiter(' ').with_max_split(1);
        assert_eq!(split("name array<int> x", options), vec!["name", "array<int> x"]);
    }

    #[test]
    fn test_escaped_quote_does_not_close() {
        assert_eq!(
            split(r#""a\",b",c"#, SplitOptions::default()),
            vec![r#""a\",b""#, "c"]
        );
    }

    #[test]
    fn test_custom_brackets() {
        let options = SplitOptions::default().with_brackets('<', '>');
        assert_eq!(
            split("string,map<int,string>", options),
            vec!["string", "map<int,string>"]
        );
    }

    #[test]
    fn test_extra_brackets_share_depth() {
        let options = SplitOptions::default()
            .with_brackets('<', '>')
            .with_extra_brackets('(', ')');
        assert_eq!(
            split("a:decimal(5,2),b:struct<c:int,d:int>", options),
            vec!["a:decimal(5,2)", "b:struct<c:int,d:int>"]
        );
    }

    #[test]
    fn test_bracket_inside_quotes_is_ignored_by_default() {
        assert_eq!(
            split(r#""a(",b"#, SplitOptions::default()),
            vec![r#""a(""#, "b"]
        );
    }

    #[test]
    fn test_bracket_inside_quotes_counted_in_compat_mode() {
        let options = SplitOptions::default().count_brackets_in_quotes(true);
        assert_eq!(split(r#""a(",b"#, options), vec![r#""a(",b"#]);
    }

    #[test]
    fn test_backtick_quotes() {
        let options = SplitOptions::default().with_quote('`', "``");
        assert_eq!(split("`a,b`,c", options), vec!["`a,b`", "c"]);
    }

    #[test]
    fn test_multibyte_input() {
        assert_eq!(
            split("é,(ü,ß),\"ø,å\"", SplitOptions::default()),
            vec!["é", "(ü,ß)", "\"ø,å\""]
        );
    }

    #[test]
    fn test_iterator_is_lazy_and_fused() {
        let mut it = aware_split("a,b", SplitOptions::default()).unwrap();
        assert_eq!(it.next(), Some("a"));
        assert_eq!(it.next(), Some("b"));
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote_default(r#""a\"b""#), r#"a"b"#);
        assert_eq!(unquote_default("abc"), "abc");
        assert_eq!(unquote_default(r#""abc"#), r#""abc"#);
        assert_eq!(unquote_default(r#""a\\b""#), r"a\b");
        assert_eq!(unquote_default(r#""""#), "");
        assert_eq!(unquote_default(r#"""#), "");
    }

    #[test]
    fn test_unquote_borrows_when_unchanged() {
        assert!(matches!(unquote_default("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_unquote_backticks() {
        assert_eq!(unquote("`a``b`", '`', '`'), "a`b");
        assert_eq!(unquote("`col name`", '`', '`'), "col name");
    }
}

//! Best-effort SQL highlighting.
//!
//! Markup is inserted by five regex passes, applied in this order so their
//! output composes:
//!
//! 1. a line break before clause keywords (`FROM`, joins, `WHERE`, ...)
//! 2. a `SQLKeyword` span around every keyword
//! 3. a `SQLComment` span around `/* ... */` comments
//! 4. a `SQLName` span around backtick-quoted identifiers
//! 5. a `SQLName` span around `table.column` references
//!
//! This is not a SQL lexer. Keywords inside string literals or comments are
//! tagged as well. Formatting already formatted output wraps the keywords a
//! second time.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Markup inserted before clause keywords.
pub const LINE_BREAK: &str = "<br />";
/// Class of keyword spans.
pub const KEYWORD_CLASS: &str = "SQLKeyword";
/// Class of comment spans.
pub const COMMENT_CLASS: &str = "SQLComment";
/// Class of identifier spans.
pub const NAME_CLASS: &str = "SQLName";

/// Keywords that start a new line.
const BREAK_BEFORE: &str = concat!(
    "FROM",
    "|(?:(?:FULL|LEFT|RIGHT) )?(?:(?:OUTER|INNER) )?JOIN",
    "|(?:CROSS|NATURAL) JOIN",
    "|VALUES|WHERE|ORDER BY|GROUP BY|HAVING|LIMIT",
);

/// Highlighted keywords, in addition to `BREAK_BEFORE`.
const KEYWORDS: &str = concat!(
    "SELECT|UPDATE|DELETE|INSERT|REPLACE|SET|INTO|AS|DISTINCT",
    "|COUNT|AVG|MIN|MAX",
    "|ON|USING",
    "|IS NOT NULL|IS NULL|NULL|NOT IN|IN|NOT ILIKE|NOT LIKE|ILIKE|LIKE",
    "|AND|OR|XOR|BETWEEN",
    "|ASC|DESC|OFFSET",
);

static BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b({BREAK_BEFORE})\b")).unwrap());
static KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b({BREAK_BEFORE}|{KEYWORDS})\b")).unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)(/\*.*?\*/)").unwrap());
static QUOTED_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(`[^`.]*`)").unwrap());
static DOTTED_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9a-zA-Z$_]+)\.([0-9a-zA-Z$_]+)").unwrap());

/// Highlights `sql` for display in the profiler panel.
///
/// The input is HTML-escaped (`&`, `<`, `>`) before any markup is added.
///
/// # Examples
///
/// ```
/// use shared::format::format_sql;
///
/// let html = format_sql("SELECT id FROM users WHERE id = 1");
/// assert_eq!(
///     html,
///     r#"<span class="SQLKeyword">SELECT</span> id <br /><span class="SQLKeyword">FROM</span> users <br /><span class="SQLKeyword">WHERE</span> id = 1"#
/// );
/// ```
#[must_use]
pub fn format_sql(sql: &str) -> String {
    let escaped = escape_html(sql);

    let sql = BREAK_RE.replace_all(&escaped, format!("{LINE_BREAK}${{1}}"));
    let sql = KEYWORD_RE.replace_all(&sql, span(KEYWORD_CLASS));
    let sql = COMMENT_RE.replace_all(&sql, span(COMMENT_CLASS));
    let sql = QUOTED_NAME_RE.replace_all(&sql, span(NAME_CLASS));
    let sql = DOTTED_NAME_RE.replace_all(&sql, |caps: &Captures| {
        let (whole, owner) = (&caps[0], &caps[1]);
        // numeric literals such as 1.5 are not references
        if owner.bytes().all(|b| b.is_ascii_digit()) {
            whole.to_string()
        } else {
            format!(r#"<span class="{NAME_CLASS}">{whole}</span>"#)
        }
    });

    sql.into_owned()
}

fn span(class: &str) -> String {
    format!(r#"<span class="{class}">${{1}}</span>"#)
}

fn escape_html(sql: &str) -> String {
    let mut escaped = String::with_capacity(sql.len());
    for c in sql.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

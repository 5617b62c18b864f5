//! # Pattern Substitution
//!
//! SQL方言アダプター向けの正規表現置換ヘルパー
//!
//! - [`substitute_re_method`]: パターンとハンドラーを同時に束縛
//! - [`substitute_re_method_pattern`]: パターンのみ束縛し、ハンドラーは後から [`ReMethodBinder::bind`]
//! - [`substitute_string_re_method`]: 固定の置換テンプレート（または関数）で置換
//!
//! パターンは `fancy_regex` でコンパイルするため、先読み・後読みも使える。
//! 置換テンプレートは Python の `re.sub` と同じ記法（`\1`, `\g<name>`）。

use fancy_regex::{Captures, Expander, Regex};
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

use crate::domain::error::PatternError;

/// 正規表現フラグ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PatternFlags(u8);

impl PatternFlags {
    pub const NONE: Self = Self(0);
    pub const IGNORECASE: Self = Self(1);
    pub const MULTILINE: Self = Self(1 << 1);
    pub const DOTALL: Self = Self(1 << 2);
    pub const VERBOSE: Self = Self(1 << 3);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// インラインフラグ（例: `(?ix)`）
    fn inline_group(self) -> String {
        let flags: String = [
            (Self::IGNORECASE, 'i'),
            (Self::MULTILINE, 'm'),
            (Self::DOTALL, 's'),
            (Self::VERBOSE, 'x'),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, c)| c)
        .collect();

        if flags.is_empty() {
            String::new()
        } else {
            format!("(?{})", flags)
        }
    }
}

impl BitOr for PatternFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

fn match_error(regex: &Regex, source: fancy_regex::Error) -> PatternError {
    PatternError::Match {
        pattern: regex.as_str().to_string(),
        source,
    }
}

fn compile(pattern: &str, flags: PatternFlags) -> Result<Regex, PatternError> {
    let source = format!("{}{}", flags.inline_group(), pattern);
    Regex::new(&source).map_err(|source| PatternError::Compile {
        pattern: pattern.to_string(),
        source,
    })
}

/// マッチごとにハンドラーを呼び出して置換するメソッド
///
/// `R` はレシーバー（方言コンパイラ等）、`A` は呼び出し時に転送される追加引数。
pub struct ReMethod<R: ?Sized, A: ?Sized = ()> {
    regex: Regex,
    handler: Arc<dyn Fn(&R, &Captures<'_>, &A) -> String + Send + Sync>,
}

impl<R: ?Sized, A: ?Sized> ReMethod<R, A> {
    /// `subject` 中の重ならない全マッチを `handler(receiver, captures, args)` の結果で置換
    ///
    /// # Errors
    ///
    /// バックトラック上限に達した場合は `PatternError::Match`
    pub fn call(&self, receiver: &R, subject: &str, args: &A) -> Result<String, PatternError> {
        self.regex
            .try_replacen(subject, 0, |caps: &Captures<'_>| {
                (self.handler)(receiver, caps, args)
            })
            .map(|replaced| replaced.into_owned())
            .map_err(|source| match_error(&self.regex, source))
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl<R: ?Sized, A: ?Sized> Clone for ReMethod<R, A> {
    fn clone(&self) -> Self {
        Self {
            regex: self.regex.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl<R: ?Sized, A: ?Sized> fmt::Debug for ReMethod<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReMethod")
            .field("pattern", &self.regex.as_str())
            .finish_non_exhaustive()
    }
}

/// パターンのみを束縛した段階。`bind` でハンドラーを渡すと [`ReMethod`] になる。
#[derive(Debug, Clone)]
pub struct ReMethodBinder {
    regex: Regex,
}

impl ReMethodBinder {
    pub fn bind<R, A, F>(self, handler: F) -> ReMethod<R, A>
    where
        R: ?Sized,
        A: ?Sized,
        F: Fn(&R, &Captures<'_>, &A) -> String + Send + Sync + 'static,
    {
        ReMethod {
            regex: self.regex,
            handler: Arc::new(handler),
        }
    }
}

/// パターンとハンドラーを束縛した置換メソッドを作成します。
///
/// # Errors
///
/// パターンが不正な場合は作成時点で `PatternError::Compile` を返す
///
/// # 例
///
/// ```
/// use bqconnect::domain::services::pattern_substitution::{substitute_re_method, PatternFlags};
///
/// struct Compiler {
///     prefix: &'static str,
/// }
///
/// let qualify = substitute_re_method(
///     r"@(\w+)",
///     PatternFlags::NONE,
///     |compiler: &Compiler, caps: &fancy_regex::Captures<'_>, dataset: &str| {
///         format!("`{}.{}.{}`", compiler.prefix, dataset, &caps[1])
///     },
/// )
/// .unwrap();
///
/// let compiler = Compiler { prefix: "proj" };
/// assert_eq!(
///     qualify.call(&compiler, "SELECT * FROM @events", "analytics").unwrap(),
///     "SELECT * FROM `proj.analytics.events`"
/// );
/// ```
pub fn substitute_re_method<R, A, F>(
    pattern: &str,
    flags: PatternFlags,
    handler: F,
) -> Result<ReMethod<R, A>, PatternError>
where
    R: ?Sized,
    A: ?Sized,
    F: Fn(&R, &Captures<'_>, &A) -> String + Send + Sync + 'static,
{
    Ok(substitute_re_method_pattern(pattern, flags)?.bind(handler))
}

/// パターンのみを束縛し、ハンドラーを後から受け取るバインダーを作成
pub fn substitute_re_method_pattern(
    pattern: &str,
    flags: PatternFlags,
) -> Result<ReMethodBinder, PatternError> {
    Ok(ReMethodBinder {
        regex: compile(pattern, flags)?,
    })
}

/// 置換内容
#[derive(Clone)]
pub enum Replacement {
    /// Python形式のテンプレート（`\1`, `\g<name>`）
    Template(String),
    /// マッチごとに呼び出す関数
    Func(Arc<dyn Fn(&Captures<'_>) -> String + Send + Sync>),
}

impl Replacement {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Captures<'_>) -> String + Send + Sync + 'static,
    {
        Self::Func(Arc::new(f))
    }
}

impl From<&str> for Replacement {
    fn from(template: &str) -> Self {
        Self::Template(template.to_string())
    }
}

impl From<String> for Replacement {
    fn from(template: String) -> Self {
        Self::Template(template)
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Self::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// 固定の置換内容で全マッチを置換するメソッド
#[derive(Debug, Clone)]
pub struct StringReMethod {
    regex: Regex,
    repl: Replacement,
}

impl StringReMethod {
    /// `subject` 中の重ならない全マッチを置換
    ///
    /// # Errors
    ///
    /// バックトラック上限に達した場合は `PatternError::Match`
    pub fn apply(&self, subject: &str) -> Result<String, PatternError> {
        let replaced = match &self.repl {
            Replacement::Template(template) => {
                let expander = Expander::python();
                self.regex.try_replacen(subject, 0, |caps: &Captures<'_>| {
                    expander.expansion(template, caps)
                })
            }
            Replacement::Func(func) => self
                .regex
                .try_replacen(subject, 0, |caps: &Captures<'_>| func(caps)),
        };

        replaced
            .map(|replaced| replaced.into_owned())
            .map_err(|source| match_error(&self.regex, source))
    }

    /// メソッドとして呼び出す形式。レシーバーは使用しない。
    pub fn call<R: ?Sized>(&self, _receiver: &R, subject: &str) -> Result<String, PatternError> {
        self.apply(subject)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// 固定の置換内容で置換するメソッドを作成します。
///
/// # Errors
///
/// パターン、またはテンプレートのグループ参照が不正な場合
///
/// # 例
///
/// ```
/// use bqconnect::domain::services::pattern_substitution::{
///     substitute_string_re_method, PatternFlags,
/// };
///
/// let squash = substitute_string_re_method("a+", "X", PatternFlags::NONE).unwrap();
/// assert_eq!(squash.apply("aaabaa").unwrap(), "XbX");
/// ```
pub fn substitute_string_re_method(
    pattern: &str,
    repl: impl Into<Replacement>,
    flags: PatternFlags,
) -> Result<StringReMethod, PatternError> {
    let regex = compile(pattern, flags)?;
    let repl = match repl.into() {
        Replacement::Template(template) => {
            let translated = translate_escapes(&template);
            Expander::python()
                .check(&translated, &regex)
                .map_err(|source| PatternError::Template { template, source })?;
            Replacement::Template(translated)
        }
        func => func,
    };

    Ok(StringReMethod { regex, repl })
}

/// テンプレート中の文字エスケープ（`\n`, `\t`, 8進数等）を文字に置き換える
///
/// グループ参照（`\1`, `\g<name>`）と `\\` はそのまま残す。
/// 英字以外の未知のエスケープはバックスラッシュごと文字として残し、
/// 未知の英字エスケープは `Expander::check` でエラーになるよう残す。
fn translate_escapes(template: &str) -> String {
    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '\\' || i + 1 == chars.len() {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let next = chars[i + 1];
        let literal = match next {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            'f' => Some('\x0c'),
            'v' => Some('\x0b'),
            'a' => Some('\x07'),
            'b' => Some('\x08'),
            _ => None,
        };
        if let Some(c) = literal {
            out.push(c);
            i += 2;
            continue;
        }

        if let Some((c, len)) = octal_escape(&chars[i + 1..]) {
            if c == '\\' {
                out.push('\\');
            }
            out.push(c);
            i += 1 + len;
            continue;
        }

        if next == '\\' || next == 'g' || next.is_ascii_alphanumeric() {
            out.push('\\');
            out.push(next);
        } else {
            out.push_str("\\\\");
            out.push(next);
        }
        i += 2;
    }

    out
}

/// `\0`（最大3桁）または3桁の8進数エスケープ
fn octal_escape(rest: &[char]) -> Option<(char, usize)> {
    let is_octal = |c: &char| ('0'..='7').contains(c);

    let len = if rest.first() == Some(&'0') {
        rest.iter().take(3).take_while(|c| is_octal(c)).count()
    } else if rest.len() >= 3 && rest[..3].iter().all(is_octal) {
        3
    } else {
        return None;
    };

    let digits: String = rest[..len].iter().collect();
    let code = u32::from_str_radix(&digits, 8).ok()?;
    char::from_u32(code).map(|c| (c, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dialect {
        quote: char,
    }

    #[test]
    fn test_string_re_method_replaces_all() {
        let method = substitute_string_re_method("a+", "X", PatternFlags::NONE).unwrap();

        assert_eq!(method.apply("aaabaa").unwrap(), "XbX");
        assert_eq!(method.call(&(), "aaabaa").unwrap(), "XbX");
        assert_eq!(method.apply("bbb").unwrap(), "bbb");
    }

    #[test]
    fn test_string_re_method_template_backreference() {
        let method =
            substitute_string_re_method(r"(\w+)@(\w+)", r"\2.\1", PatternFlags::NONE).unwrap();

        assert_eq!(method.apply("events@analytics").unwrap(), "analytics.events");
    }

    #[test]
    fn test_string_re_method_named_group() {
        let method = substitute_string_re_method(
            r"(?P<col>\w+)::int64",
            r"CAST(\g<col> AS INT64)",
            PatternFlags::NONE,
        )
        .unwrap();

        assert_eq!(method.apply("SELECT x::int64").unwrap(), "SELECT CAST(x AS INT64)");
    }

    #[test]
    fn test_string_re_method_func() {
        let method = substitute_string_re_method(
            r"\d+",
            Replacement::func(|caps: &Captures<'_>| {
                let n: u64 = caps[0].parse().unwrap_or_default();
                (n * 2).to_string()
            }),
            PatternFlags::NONE,
        )
        .unwrap();

        assert_eq!(method.apply("LIMIT 10 OFFSET 5").unwrap(), "LIMIT 20 OFFSET 10");
    }

    #[test]
    fn test_string_re_method_flags() {
        let method =
            substitute_string_re_method("select", "SELECT", PatternFlags::IGNORECASE).unwrap();

        assert_eq!(method.apply("Select 1; select 2").unwrap(), "SELECT 1; SELECT 2");
    }

    #[test]
    fn test_string_re_method_empty_in_rewrite() {
        let method = substitute_string_re_method(
            r"\sIN\sUNNEST\(\[\s((?:NULL|\(NULL(?:,\sNULL)+\))\)\s(?:AND|OR)\s\(1\s!?=\s1)(?:[:][A-Z0-9]+)?\s\]\)",
            r" IN UNNEST([ \1 ])",
            PatternFlags::IGNORECASE,
        )
        .unwrap();

        assert_eq!(
            method.apply("WHERE x IN UNNEST([ NULL) AND (1 != 1:INT64 ])").unwrap(),
            "WHERE x IN UNNEST([ NULL) AND (1 != 1 ])"
        );
    }

    #[test]
    fn test_string_re_method_lookahead() {
        let method = substitute_string_re_method(r"\w+(?=\()", "FN", PatternFlags::NONE).unwrap();

        assert_eq!(method.apply("count(x) + y").unwrap(), "FN(x) + y");
    }

    #[test]
    fn test_invalid_pattern_fails_at_construction() {
        let result = substitute_string_re_method("a(", "X", PatternFlags::NONE);
        assert!(matches!(result, Err(PatternError::Compile { pattern, .. }) if pattern == "a("));

        let result = substitute_re_method_pattern("[unclosed", PatternFlags::NONE);
        assert!(matches!(result, Err(PatternError::Compile { .. })));
    }

    #[test]
    fn test_re_method_passes_receiver_and_args() {
        let method = substitute_re_method(
            r"\b(\w+)\.(\w+)\b",
            PatternFlags::NONE,
            |dialect: &Dialect, caps: &Captures<'_>, suffix: &str| {
                format!(
                    "{q}{}{}{q}.{}",
                    &caps[1],
                    suffix,
                    &caps[2],
                    q = dialect.quote
                )
            },
        )
        .unwrap();

        let dialect = Dialect { quote: '`' };
        assert_eq!(
            method.call(&dialect, "FROM sales.orders JOIN hr.staff", "_v2").unwrap(),
            "FROM `sales_v2`.orders JOIN `hr_v2`.staff"
        );
    }

    #[test]
    fn test_binder_matches_direct_construction() {
        fn handler(dialect: &Dialect, caps: &Captures<'_>, _: &()) -> String {
            format!("{q}{}{q}", &caps[0], q = dialect.quote)
        }

        let direct = substitute_re_method(r"[a-z_]+", PatternFlags::NONE, handler).unwrap();
        let deferred = substitute_re_method_pattern(r"[a-z_]+", PatternFlags::NONE)
            .unwrap()
            .bind(handler);

        let dialect = Dialect { quote: '"' };
        for subject in ["order_id = 1", "", "A + b"] {
            assert_eq!(
                direct.call(&dialect, subject, &()).unwrap(),
                deferred.call(&dialect, subject, &()).unwrap()
            );
        }
        assert_eq!(direct.call(&dialect, "order_id = 1", &()).unwrap(), "\"order_id\" = 1");
    }

    #[test]
    fn test_flags_inline_group() {
        assert_eq!(PatternFlags::NONE.inline_group(), "");
        assert_eq!(
            (PatternFlags::IGNORECASE | PatternFlags::VERBOSE).inline_group(),
            "(?ix)"
        );
        assert!((PatternFlags::MULTILINE | PatternFlags::DOTALL).contains(PatternFlags::DOTALL));
        assert!(!PatternFlags::MULTILINE.contains(PatternFlags::DOTALL));
    }

    #[test]
    fn test_verbose_flag() {
        let method = substitute_string_re_method(
            r"
            (\d{4})   # year
            -
            (\d{2})   # month
            ",
            r"\2/\1",
            PatternFlags::VERBOSE,
        )
        .unwrap();

        assert_eq!(method.apply("since 2024-03").unwrap(), "since 03/2024");
    }

    #[test]
    fn test_backtrack_limit_is_an_error() {
        let method = substitute_re_method(
            r"(a+)+\1b",
            PatternFlags::NONE,
            |_: &(), caps: &Captures<'_>, _: &()| caps[0].to_string(),
        )
        .unwrap();

        let result = method.call(&(), &"a".repeat(40), &());

        assert!(matches!(result, Err(PatternError::Match { .. })));
    }

    #[test]
    fn test_string_re_method_backtrack_limit_is_an_error() {
        let method = substitute_string_re_method(r"(a+)+\1b", "X", PatternFlags::NONE).unwrap();

        let result = method.apply(&"a".repeat(40));

        assert!(matches!(result, Err(PatternError::Match { .. })));
    }

    #[test]
    fn test_template_character_escapes() {
        let method = substitute_string_re_method(",", r",\n", PatternFlags::NONE).unwrap();
        assert_eq!(method.apply("a,b").unwrap(), "a,\nb");

        let method =
            substitute_string_re_method(r"(\w+)=(\w+)", r"\1\t\2\r\b\0", PatternFlags::NONE).unwrap();
        assert_eq!(method.apply("k=v").unwrap(), "k\tv\r\x08\0");

        let method = substitute_string_re_method("x", r"\\n\141\&", PatternFlags::NONE).unwrap();
        assert_eq!(method.apply("x").unwrap(), r"\na\&");
    }

    #[test]
    fn test_template_unknown_letter_escape_rejected() {
        let result = substitute_string_re_method(",", r"\q", PatternFlags::NONE);

        assert!(matches!(result, Err(PatternError::Template { template, .. }) if template == r"\q"));
    }
}

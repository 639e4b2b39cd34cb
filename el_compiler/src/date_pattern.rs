//! Translation between EL date patterns and strftime-style host patterns
//!
//! EL patterns use letter runs (`yyyy-MM-dd HH:mm:ss.SSS`) with `'...'` for
//! literal text. Host patterns use `%` directives as understood by `chrono`
//! (and, apart from `%3f`, by Python's `strftime`).

/// Pattern used by `toDate`/`toInstant` without an explicit pattern and for
/// the string form of a date
pub const DEFAULT_DATE_PATTERN: &str = "EEE MMM dd HH:mm:ss zzz yyyy";

/// Source run to host directive. Looked up longest run first.
pub const PATTERN_TABLE: &[(&str, &str)] = &[
    ("yyyy", "%Y"),
    ("yyy", "%Y"),
    ("yy", "%y"),
    ("y", "%Y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("dd", "%d"),
    ("d", "%-d"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("mm", "%M"),
    ("m", "%-M"),
    ("ss", "%S"),
    ("s", "%-S"),
    ("SSSSSSSSS", "%9f"),
    ("SSSSSS", "%6f"),
    ("SSS", "%3f"),
    ("EEEE", "%A"),
    ("EEE", "%a"),
    ("EE", "%a"),
    ("E", "%a"),
    ("a", "%p"),
    ("DDD", "%j"),
    ("D", "%-j"),
    ("zzz", "%Z"),
    ("z", "%Z"),
    ("Z", "%z"),
    ("XXX", "%:z"),
    ("u", "%u"),
];

/// Host directive back to the canonical source run
const REVERSE_TABLE: &[(&str, &str)] = &[
    ("%Y", "yyyy"),
    ("%y", "yy"),
    ("%B", "MMMM"),
    ("%b", "MMM"),
    ("%m", "MM"),
    ("%-m", "M"),
    ("%d", "dd"),
    ("%-d", "d"),
    ("%H", "HH"),
    ("%-H", "H"),
    ("%I", "hh"),
    ("%-I", "h"),
    ("%M", "mm"),
    ("%-M", "m"),
    ("%S", "ss"),
    ("%-S", "s"),
    ("%9f", "SSSSSSSSS"),
    ("%6f", "SSSSSS"),
    ("%3f", "SSS"),
    ("%A", "EEEE"),
    ("%a", "EEE"),
    ("%p", "a"),
    ("%j", "DDD"),
    ("%-j", "D"),
    ("%Z", "zzz"),
    ("%z", "Z"),
    ("%:z", "XXX"),
    ("%u", "u"),
];

/// Translate an EL date pattern into a host pattern.
///
/// Total: letters without a table entry and unterminated quotes are passed
/// through as literal text.
pub fn translate(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    i += 1;
                    break;
                }
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            continue;
        }

        if ch.is_ascii_alphabetic() {
            let run = chars[i..].iter().take_while(|c| **c == ch).count();
            translate_run(&mut out, ch, run);
            i += run;
            continue;
        }

        push_literal(&mut out, ch);
        i += 1;
    }

    out
}

/// Emit directives for `count` repetitions of `letter`, longest entries first
fn translate_run(out: &mut String, letter: char, mut count: usize) {
    while count > 0 {
        let best = PATTERN_TABLE
            .iter()
            .filter(|(run, _)| run.starts_with(letter) && run.len() <= count)
            .max_by_key(|(run, _)| run.len());

        match best {
            Some((run, directive)) => {
                out.push_str(directive);
                count -= run.len();
            }
            None => {
                for _ in 0..count {
                    out.push(letter);
                }
                count = 0;
            }
        }
    }
}

fn push_literal(out: &mut String, ch: char) {
    if ch == '%' {
        out.push_str("%%");
    } else {
        out.push(ch);
    }
}

/// Translate a host pattern back into an EL pattern, quoting literal letters
pub fn untranslate(host: &str) -> String {
    let mut out = String::with_capacity(host.len() + 4);
    let mut rest = host;

    while let Some(ch) = rest.chars().next() {
        if ch == '%' {
            if let Some(tail) = rest.strip_prefix("%%") {
                out.push('%');
                rest = tail;
                continue;
            }
            let directive = REVERSE_TABLE
                .iter()
                .filter(|(d, _)| rest.starts_with(d))
                .max_by_key(|(d, _)| d.len());
            if let Some((d, run)) = directive {
                out.push_str(run);
                rest = &rest[d.len()..];
                continue;
            }
        }

        if ch.is_ascii_alphabetic() || ch == '\'' {
            let len = rest
                .find(|c: char| !(c.is_ascii_alphabetic() || c == '\''))
                .unwrap_or(rest.len());
            let run = &rest[..len];
            if run.chars().any(|c| c.is_ascii_alphabetic()) {
                out.push('\'');
                out.push_str(&run.replace('\'', "''"));
                out.push('\'');
            } else {
                out.push_str(&run.replace('\'', "''"));
            }
            rest = &rest[len..];
            continue;
        }

        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    out
}

/// Whether every letter run in the pattern has a translation
pub fn is_fully_supported(source: &str) -> bool {
    let translated = translate(source);
    let mut in_directive = false;
    let mut literal_letters = 0usize;
    for ch in translated.chars() {
        if in_directive {
            in_directive = matches!(ch, '-' | ':' | '3' | '6' | '9');
            continue;
        }
        if ch == '%' {
            in_directive = true;
        } else if ch.is_ascii_alphabetic() {
            literal_letters += 1;
        }
    }
    let quoted_letters: usize = quoted_runs(source)
        .iter()
        .map(|run| run.chars().filter(|c| c.is_ascii_alphabetic()).count())
        .sum();
    literal_letters == quoted_letters
}

/// Whether `chrono` accepts every directive of a host pattern
///
/// Formatting with a rejected directive fails at display time, so callers
/// check before formatting.
pub fn is_valid_host_pattern(host: &str) -> bool {
    use chrono::format::{Item, StrftimeItems};
    StrftimeItems::new(host).all(|item| !matches!(item, Item::Error))
}

fn quoted_runs(source: &str) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current: Option<String> = None;
    let mut chars = source.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                if let Some(run) = current.as_mut() {
                    run.push('\'');
                }
                continue;
            }
            match current.take() {
                Some(run) => runs.push(run),
                None => current = Some(String::new()),
            }
        } else if let Some(run) = current.as_mut() {
            run.push(ch);
        }
    }
    runs.extend(current);
    runs
}

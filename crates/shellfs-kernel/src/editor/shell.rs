//! Shell text generation.
//!
//! Every value that reaches the shell goes through [`shell_quote`]. Literal
//! text that reaches a sed script additionally goes through
//! [`escape_for_sed`] first, so the sed program sees it as a literal and the
//! shell sees the whole program as one single-quoted word.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

/// Characters escaped for sed, in the order they are neutralized.
///
/// Backslash comes first so escapes added for the others are not doubled.
/// `/` is the substitution delimiter.
const SED_SPECIAL: &[char] = &['\\', '/', '.', '*', '[', ']', '^', '$', '&'];

/// Wrap `value` in single quotes, rendering embedded `'` as `'\''`.
pub fn shell_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Escape literal text for use as a sed `s` pattern or replacement.
///
/// Each character in [`SED_SPECIAL`] gets a leading backslash and a newline
/// becomes `\n`, which GNU sed reads as a newline in the replacement.
pub fn escape_for_sed(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        if SED_SPECIAL.contains(&ch) {
            escaped.push('\\');
            escaped.push(ch);
        } else if ch == '\n' {
            escaped.push_str("\\n");
        } else {
            escaped.push(ch);
        }
    }
    escaped
}

/// POSIX `dirname` of a remote path, or `None` when the path has no directory part.
///
/// `"a/b"` → `"a"`, `"/a"` → `"/"`, `"a"` → `None`.
pub fn parent_dir(path: &str) -> Option<&str> {
    let idx = path.rfind('/')? + 1;
    let head = &path[..idx];
    let trimmed = head.trim_end_matches('/');
    Some(if trimmed.is_empty() { head } else { trimmed })
}

/// Numbered read of a file, optionally windowed.
///
/// `offset` is a 1-based line number (0 is treated as 1). Errors are folded
/// into the pipe so not-found diagnostics appear in the output.
pub fn read_command(path: &str, offset: Option<usize>, limit: Option<usize>) -> String {
    let p = shell_quote(path);
    match (offset.map(|o| o.max(1)), limit) {
        (Some(offset), Some(limit)) => format!(
            "tail -n +{offset} {p} 2>&1 | head -n {limit} | nl -ba -v {offset}"
        ),
        (Some(offset), None) => format!("tail -n +{offset} {p} 2>&1 | nl -ba -v {offset}"),
        (None, Some(limit)) => format!("head -n {limit} {p} 2>&1 | nl -ba"),
        (None, None) => format!("nl -ba {p} 2>&1"),
    }
}

pub fn mkdir_command(dir: &str) -> String {
    format!("mkdir -p {}", shell_quote(dir))
}

/// Write `content` byte-for-byte by decoding base64 on the remote side.
pub fn write_command(path: &str, content: &str) -> String {
    let encoded = BASE64_STANDARD.encode(content.as_bytes());
    format!(
        "printf '%s' {} | base64 -d > {}",
        shell_quote(&encoded),
        shell_quote(path)
    )
}

/// Copy with diagnostics folded into the output.
pub fn copy_command(from: &str, to: &str) -> String {
    format!("cp {} {} 2>&1", shell_quote(from), shell_quote(to))
}

/// In-place literal substitution of `old` with `new`.
///
/// Without `replace_all` the `0,/re/` address limits the substitution to the
/// first matching line, and the empty pattern reuses `re`.
pub fn substitute_command(path: &str, old: &str, new: &str, replace_all: bool) -> String {
    let old = escape_for_sed(old);
    let new = escape_for_sed(new);
    let script = if replace_all {
        format!("s/{old}/{new}/g")
    } else {
        format!("0,/{old}/s//{new}/")
    };
    format!("sed -i {} {} 2>&1", shell_quote(&script), shell_quote(path))
}

/// Exit 0 when both files are byte-identical.
pub fn compare_command(a: &str, b: &str) -> String {
    format!("cmp -s {} {}", shell_quote(a), shell_quote(b))
}

pub fn restore_command(backup: &str, path: &str) -> String {
    format!("mv -f {} {} 2>&1", shell_quote(backup), shell_quote(path))
}

pub fn remove_command(path: &str) -> String {
    format!("rm -f {}", shell_quote(path))
}

/// Line printed by the metadata probe for a missing path.
pub const NOT_FOUND_SENTINEL: &str = "not_found";

/// Size, mtime, owner:group, permissions, and type of one path.
///
/// Tries GNU `stat -c` then BSD `stat -f`; prints [`NOT_FOUND_SENTINEL`] when the path
/// does not exist.
pub fn metadata_command(path: &str) -> String {
    let p = shell_quote(path);
    format!(
        "if [ -e {p} ]; then\n\
         \x20 stat -c '%s %Y %U:%G %a' {p} 2>/dev/null || stat -f '%z %m %Su:%Sg %Lp' {p}\n\
         \x20 printf ' '\n\
         \x20 file -b {p} 2>/dev/null || echo 'unknown'\n\
         else\n\
         \x20 echo '{NOT_FOUND_SENTINEL}'\n\
         fi"
    )
}

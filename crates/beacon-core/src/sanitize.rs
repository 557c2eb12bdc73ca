//! HTML-entity escaping for inbound message text.
//!
//! Messages are relayed verbatim into browser DOMs by the dev-client script,
//! so every HTML-significant character is escaped before a message is stored
//! or broadcast. Escaping is deliberately not idempotent: re-sanitizing an
//! already-escaped string escapes the `&` of each entity again.

/// Escape HTML-significant characters to their entity form.
///
/// Replaces each occurrence of `&`, `<`, `>`, `"`, `'`, `/` scanning left to
/// right. No other characters are altered.
///
/// # Examples
///
/// ```
/// use beacon_core::sanitize::sanitize;
///
/// assert_eq!(sanitize("<script>"), "&lt;script&gt;");
/// assert_eq!(sanitize("a & b"), "a &amp; b");
/// ```
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(ch),
        }
    }
    out
}

/// String length in UTF-16 code units.
///
/// The message length bounds use UTF-16 semantics (a supplementary-plane
/// character such as an emoji counts as 2), matching what connected web
/// clients observe as `String.length`.
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line reflow for the `X-Mailfile` header and the message body.
//!
//! Two behaviors, chosen per field:
//! - `preserve = true`: emit `data` as-is (newlines become CRLF+indent),
//!   just prefixed with `indent`. Used for the header in clear mode, where
//!   the base64 blob has no internal whitespace to wrap anyway.
//! - `preserve = false`: strip all whitespace from `data`, then hard-wrap
//!   into `linelen - indent.len()`-character chunks joined by CRLF+indent.
//!   Used for the header in encrypted mode and for the body in both modes.

/// Reflow `data` for inclusion in the envelope, matching the original
/// encoder's `_reflow` byte-for-byte.
pub fn reflow(data: &str, indent: &str, linelen: usize, preserve: bool) -> String {
    if preserve {
        let replaced = data.replace('\n', &format!("\r\n{indent}"));
        format!("{indent}{}", replaced.trim())
    } else {
        let effective = linelen.saturating_sub(indent.chars().count()).max(1);
        let compact: Vec<char> = data.split_whitespace().flat_map(|s| s.chars()).collect();

        let mut out = String::new();
        let mut i = 0;
        while i + effective <= compact.len() {
            out.extend(&compact[i..i + effective]);
            out.push_str("\r\n");
            out.push_str(indent);
            i += effective;
        }
        out.extend(&compact[i..]);

        format!("{indent}{}", out.trim_end_matches(char::is_whitespace))
    }
}

/// Recover the original encoded blob from a (possibly folded/reflowed)
/// region of text: both reflow modes leave no whitespace inside the actual
/// encoded payload, so stripping every whitespace character recovers it
/// exactly, regardless of which mode produced it.
pub fn compact(data: &str) -> String {
    data.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
#[path = "reflow_tests.rs"]
mod tests;

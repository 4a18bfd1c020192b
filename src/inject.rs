//! Tenant preload fragment and its insertion into the entry-point document.

/// Key the front-end reads from `localStorage`; doubles as the injection marker.
pub const DEFAULT_STORAGE_KEY: &str = "dev_subdomain";

const HEAD_CLOSE: &str = "</head>";
const CONSOLE_STYLE: &str = "color:#0ea5e9;font-weight:bold";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Injection {
    /// Patched document with the fragment placed right before `</head>`.
    Injected(String),
    /// The marker is already in the document; nothing to do.
    AlreadyPresent,
    /// No `</head>` to anchor the fragment.
    NoHeadClose,
}

/// Encode a value as a JavaScript string literal that is safe inside a `<script>` element.
fn js_string(s: &str) -> String {
    // serde_json only fails on non-string map keys, which cannot happen for &str.
    let quoted = serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string());
    quoted.replace("</", "<\\/")
}

/// Build the `<script>` block that stores the tenant and announces it in the console.
pub fn build_fragment(storage_key: &str, tenant: &str) -> String {
    let banner = format!("%c[oceanix-dev] tenant subdomain: {tenant}");
    format!(
        "<script>\n  localStorage.setItem({key}, {value});\n  console.log({banner}, {style});\n</script>\n",
        key = js_string(storage_key),
        value = js_string(tenant),
        banner = js_string(&banner),
        style = js_string(CONSOLE_STYLE),
    )
}

/// Insert `fragment` before the first `</head>` unless `marker` already occurs.
pub fn inject(document: &str, marker: &str, fragment: &str) -> Injection {
    if !marker.is_empty() && document.contains(marker) {
        return Injection::AlreadyPresent;
    }
    // ASCII lowercasing keeps byte offsets aligned with the original.
    let lowered = document.to_ascii_lowercase();
    match lowered.find(HEAD_CLOSE) {
        Some(idx) => {
            let mut out = String::with_capacity(document.len() + fragment.len());
            out.push_str(&document[..idx]);
            out.push_str(fragment);
            out.push_str(&document[idx..]);
            Injection::Injected(out)
        }
        None => Injection::NoHeadClose,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "<!doctype html>\n<html>\n<head>\n  <title>Oceanix</title>\n</head>\n<body><app-root></app-root></body>\n</html>\n";

    #[test]
    fn test_fragment_contains_key_and_token() {
        let frag = build_fragment(DEFAULT_STORAGE_KEY, "techcorp");
        assert!(frag.starts_with("<script>"));
        assert!(frag.contains("localStorage.setItem(\"dev_subdomain\", \"techcorp\");"));
        assert!(frag.contains("console.log(\"%c[oceanix-dev] tenant subdomain: techcorp\""));
        assert!(frag.trim_end().ends_with("</script>"));
    }

    #[test]
    fn test_fragment_escapes_script_breakout() {
        let frag = build_fragment(DEFAULT_STORAGE_KEY, "a\"</script><b>");
        assert_eq!(frag.matches("</script>").count(), 1, "fragment: {frag}");
        assert!(frag.contains("a\\\"<\\/script><b>"));
    }

    #[test]
    fn test_inject_places_fragment_before_head_close() {
        let frag = build_fragment(DEFAULT_STORAGE_KEY, "techcorp");
        let out = match inject(DOC, DEFAULT_STORAGE_KEY, &frag) {
            Injection::Injected(s) => s,
            other => panic!("expected injection, got {other:?}"),
        };
        let pos_frag = out.find("<script>").unwrap();
        let pos_head = out.find("</head>").unwrap();
        assert!(pos_frag < pos_head);
        assert!(out.contains(&format!("{frag}</head>")));
        assert_eq!(out.len(), DOC.len() + frag.len());
        assert_eq!(out.replace(&frag, ""), DOC);
    }

    #[test]
    fn test_inject_is_idempotent_on_marker() {
        let frag = build_fragment(DEFAULT_STORAGE_KEY, "techcorp");
        let once = match inject(DOC, DEFAULT_STORAGE_KEY, &frag) {
            Injection::Injected(s) => s,
            other => panic!("expected injection, got {other:?}"),
        };
        let acme = build_fragment(DEFAULT_STORAGE_KEY, "acme");
        assert_eq!(
            inject(&once, DEFAULT_STORAGE_KEY, &acme),
            Injection::AlreadyPresent
        );
        assert_eq!(once.matches(DEFAULT_STORAGE_KEY).count(), 1);
    }

    #[test]
    fn test_inject_matches_uppercase_head() {
        let doc = "<HTML><HEAD><TITLE>x</TITLE></HEAD><BODY></BODY></HTML>";
        match inject(doc, DEFAULT_STORAGE_KEY, "<script></script>") {
            Injection::Injected(s) => {
                assert_eq!(s, "<HTML><HEAD><TITLE>x</TITLE><script></script></HEAD><BODY></BODY></HTML>")
            }
            other => panic!("expected injection, got {other:?}"),
        }
    }

    #[test]
    fn test_inject_without_head_close() {
        assert_eq!(
            inject("<body>no head</body>", DEFAULT_STORAGE_KEY, "<script></script>"),
            Injection::NoHeadClose
        );
    }
}

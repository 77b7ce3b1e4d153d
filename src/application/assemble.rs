//! Page assembly: splice the rendered markup and the aggregate stylesheet
//! into the HTML shell.

/// Body slot marker the site build leaves in the shell.
pub const APP_SLOT: &str = "<!--app-html-->";

/// Styles are inserted immediately before this anchor.
pub const HEAD_CLOSE: &str = "</head>";

/// Merge the shell, the rendered fragment, and the aggregate stylesheet into
/// the final document.
///
/// Splice points are located against the original shell before anything is
/// inserted, so the pass never re-scans its own output: a fragment that
/// itself contains the slot marker or a `</head>` sequence is carried as
/// inert text. A shell missing the marker or the anchor degrades by skipping
/// that slot.
pub fn assemble(shell: &str, fragment: &str, stylesheet: &str) -> String {
    let mut splices: Vec<(usize, usize, String)> = Vec::with_capacity(2);

    if !stylesheet.is_empty() {
        if let Some(at) = shell.find(HEAD_CLOSE) {
            let block = format!("<style type=\"text/css\">{stylesheet}</style>");
            splices.push((at, 0, block));
        }
    }
    if let Some(at) = shell.find(APP_SLOT) {
        splices.push((at, APP_SLOT.len(), fragment.to_string()));
    }
    splices.sort_by_key(|(at, _, _)| *at);

    let extra: usize = splices.iter().map(|(_, _, text)| text.len()).sum();
    let mut document = String::with_capacity(shell.len() + extra);
    let mut cursor = 0;
    for (at, skip, text) in splices {
        document.push_str(&shell[cursor..at]);
        document.push_str(&text);
        cursor = at + skip;
    }
    document.push_str(&shell[cursor..]);
    document
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    const SHELL: &str = "<html><head></head><body><!--app-html--></body></html>";

    #[test]
    fn fragment_replaces_the_slot_verbatim() {
        assert_snapshot!(
            assemble(SHELL, "<div>Hi</div>", ""),
            @"<html><head></head><body><div>Hi</div></body></html>"
        );
    }

    #[test]
    fn slot_marker_is_gone_from_the_output() {
        let document = assemble(SHELL, "<div>Hi</div>", "");
        assert!(!document.contains(APP_SLOT));
    }

    #[test]
    fn styles_land_immediately_before_head_close() {
        let document = assemble(SHELL, "<p>x</p>", "body{color:red}");
        assert!(document.contains("<style type=\"text/css\">body{color:red}</style></head>"));
    }

    #[test]
    fn empty_stylesheet_injects_nothing() {
        let document = assemble(SHELL, "<p>x</p>", "");
        assert!(!document.contains("<style"));
    }

    #[test]
    fn fragment_containing_the_marker_stays_literal() {
        let document = assemble(SHELL, "see <!--app-html--> here", "");
        assert_eq!(
            document,
            "<html><head></head><body>see <!--app-html--> here</body></html>"
        );
    }

    #[test]
    fn fragment_containing_head_close_does_not_attract_styles() {
        let document = assemble(SHELL, "<code></head></code>", "b{}");
        assert_eq!(
            document,
            "<html><head><style type=\"text/css\">b{}</style></head>\
             <body><code></head></code></body></html>"
        );
    }

    #[test]
    fn missing_slot_degrades_silently() {
        let shell = "<html><head></head><body></body></html>";
        assert_eq!(assemble(shell, "<p>x</p>", ""), shell);
    }

    #[test]
    fn missing_head_anchor_skips_style_injection() {
        let shell = "<body><!--app-html--></body>";
        assert_eq!(assemble(shell, "<p>x</p>", "b{}"), "<body><p>x</p></body>");
    }
}

//! Response classification.
//!
//! [`classify`] is a pure function from one [`FetchOutcome`] to a
//! [`ClassifiedResult`]. It decides whether a body is usable source code or
//! one of the rejection classes.

use codefetch_core::{ClassifiedResult, FetchOutcome, RejectReason, Rejection, TransportCause};

/// Message returned when a forge serves a rendered page.
pub const HTML_MESSAGE: &str =
    "Received HTML page instead of raw file. Provide a raw URL. You should copy and paste the code.";

/// How far into the body the HTML signature is looked for.
const SIGNATURE_WINDOW: usize = 512;

/// Classifies a fetch outcome.
///
/// The HTML signature check runs on every successful body, even when the
/// content type is absent or generic, since some upstreams mislabel pages.
pub fn classify(outcome: &FetchOutcome) -> ClassifiedResult {
    match outcome {
        FetchOutcome::Success { body, content_type } => {
            if content_type.to_lowercase().contains("text/html") || looks_like_html(body) {
                return rejected(RejectReason::Html, HTML_MESSAGE);
            }
            if body.trim().is_empty() {
                return rejected(RejectReason::Empty, "Empty file");
            }
            ClassifiedResult::Ok { code: body.clone() }
        }
        FetchOutcome::UpstreamError { status, .. } => {
            ClassifiedResult::Rejected(Rejection::upstream(*status))
        }
        FetchOutcome::TooLarge { .. } => rejected(RejectReason::TooLarge, "File too large"),
        FetchOutcome::TransportError { cause } => match cause {
            TransportCause::Abort => rejected(RejectReason::Timeout, "Fetch timed out"),
            TransportCause::Network | TransportCause::Other => {
                rejected(RejectReason::Unknown, "Unexpected error")
            }
        },
    }
}

fn rejected(reason: RejectReason, message: &str) -> ClassifiedResult {
    ClassifiedResult::Rejected(Rejection::new(reason, message))
}

/// Whether a body opens with an HTML document signature.
///
/// Only the first 512 characters are inspected, case-insensitively. A UTF-8
/// byte order mark, whitespace, `<!-- ... -->` comments and an `<?xml ?>`
/// prolog may precede the signature; then `<!doctype html` or an `<html`
/// tag must follow.
pub fn looks_like_html(body: &str) -> bool {
    let window: String = body
        .trim_start_matches('\u{feff}')
        .chars()
        .take(SIGNATURE_WINDOW)
        .collect::<String>()
        .to_lowercase();

    let start = skip_preamble(&window);
    if start.starts_with("<!doctype html") {
        return true;
    }
    match start.strip_prefix("<html") {
        Some(rest) => rest
            .chars()
            .next()
            .is_none_or(|c| c == '>' || c.is_whitespace()),
        None => false,
    }
}

/// Skips whitespace, markup comments and an XML declaration.
fn skip_preamble(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        let (rest, terminator) = if let Some(rest) = text.strip_prefix("<!--") {
            (rest, "-->")
        } else if let Some(rest) = text.strip_prefix("<?xml") {
            (rest, "?>")
        } else {
            return text;
        };
        // An unterminated preamble runs past the window.
        match rest.find(terminator) {
            Some(end) => text = &rest[end + terminator.len()..],
            None => return "",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reason_of(outcome: &FetchOutcome) -> Option<RejectReason> {
        classify(outcome).rejection().map(|r| r.reason)
    }

    #[test]
    fn test_plain_source_ok() {
        let outcome = FetchOutcome::success("fn main() {}\n", "text/plain; charset=utf-8");
        assert_eq!(
            classify(&outcome),
            ClassifiedResult::Ok {
                code: "fn main() {}\n".to_string()
            }
        );
    }

    #[test]
    fn test_html_content_type() {
        let outcome = FetchOutcome::success("<!DOCTYPE html><html><body></body></html>", "text/html");
        let result = classify(&outcome);
        let rejection = result.rejection().unwrap();
        assert_eq!(rejection.reason, RejectReason::Html);
        assert_eq!(rejection.message, HTML_MESSAGE);
        assert_eq!(rejection.http_status(), 415);
    }

    #[test]
    fn test_html_content_type_with_code_body() {
        let outcome = FetchOutcome::success("print('hi')", "Text/HTML; charset=utf-8");
        assert_eq!(reason_of(&outcome), Some(RejectReason::Html));
    }

    #[test]
    fn test_html_signature_without_content_type() {
        for content_type in ["", "*/*", "text/plain", "application/octet-stream"] {
            let outcome = FetchOutcome::success("\n  <!doctype HTML>\n<html lang=\"en\">", content_type);
            assert_eq!(
                reason_of(&outcome),
                Some(RejectReason::Html),
                "Failed for {content_type:?}"
            );
        }

        let outcome = FetchOutcome::success("\u{feff}<HTML>\n<head>", "");
        assert_eq!(reason_of(&outcome), Some(RejectReason::Html));

        let commented = "<!-- served by nginx -->\n<!DOCTYPE html>\n<html><body></body></html>";
        let outcome = FetchOutcome::success(commented, "text/plain");
        assert_eq!(reason_of(&outcome), Some(RejectReason::Html));

        let xhtml = "<?xml version=\"1.0\"?>\n<!DOCTYPE html>\n<html xmlns=\"http://www.w3.org/1999/xhtml\">";
        let outcome = FetchOutcome::success(xhtml, "");
        assert_eq!(reason_of(&outcome), Some(RejectReason::Html));

        let stacked = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!-- a -->\n<!-- b -->\n<html>";
        assert!(looks_like_html(stacked));
    }

    #[test]
    fn test_preamble_without_html_is_code() {
        // A plain XML file is not a page.
        let outcome = FetchOutcome::success("<?xml version=\"1.0\"?>\n<project></project>\n", "");
        assert!(classify(&outcome).is_ok());

        let outcome = FetchOutcome::success("<!-- license header -->\n<svg></svg>\n", "text/plain");
        assert!(classify(&outcome).is_ok());

        // Signature beyond the inspected window is not looked for.
        let padded = format!("<!--{}-->\n<html>", "x".repeat(600));
        assert!(!looks_like_html(&padded));
    }

    #[test]
    fn test_html_signature_requires_tag_boundary() {
        // <htmlish> is not an html tag
        let outcome = FetchOutcome::success("<htmlish>data</htmlish>", "text/plain");
        assert!(classify(&outcome).is_ok());

        // markup later in a source file does not count
        let jsx = "export default function Layout() {\n  return <html><body/></html>;\n}\n";
        let outcome = FetchOutcome::success(jsx, "text/plain");
        assert!(classify(&outcome).is_ok());
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(
            reason_of(&FetchOutcome::success("", "text/plain")),
            Some(RejectReason::Empty)
        );
        assert_eq!(
            reason_of(&FetchOutcome::success(" \n\t\r\n", "")),
            Some(RejectReason::Empty)
        );
    }

    #[test]
    fn test_upstream_error() {
        let result = classify(&FetchOutcome::upstream(404, "Not Found"));
        let rejection = result.rejection().unwrap();
        assert_eq!(rejection.reason, RejectReason::Upstream);
        assert_eq!(rejection.message, "Upstream error (404) fetching file");
        assert_eq!(rejection.status, Some(404));
    }

    #[test]
    fn test_upstream_html_body_is_still_upstream() {
        let outcome = FetchOutcome::upstream(500, "<!DOCTYPE html><html>oops</html>");
        assert_eq!(reason_of(&outcome), Some(RejectReason::Upstream));
    }

    #[test]
    fn test_too_large() {
        let outcome = FetchOutcome::TooLarge {
            limit: 10,
            observed: 11,
        };
        let result = classify(&outcome);
        let rejection = result.rejection().unwrap();
        assert_eq!(rejection.reason, RejectReason::TooLarge);
        assert_eq!(rejection.message, "File too large");
    }

    #[test]
    fn test_transport_errors() {
        assert_eq!(
            reason_of(&FetchOutcome::transport(TransportCause::Abort)),
            Some(RejectReason::Timeout)
        );
        assert_eq!(
            reason_of(&FetchOutcome::transport(TransportCause::Network)),
            Some(RejectReason::Unknown)
        );
        assert_eq!(
            reason_of(&FetchOutcome::transport(TransportCause::Other)),
            Some(RejectReason::Unknown)
        );
    }

    #[test]
    fn test_classify_is_idempotent() {
        let outcomes = [
            FetchOutcome::success("let x = 1;", "text/plain"),
            FetchOutcome::success("<!DOCTYPE html>", "text/html"),
            FetchOutcome::success("   ", ""),
            FetchOutcome::upstream(503, json!({ "error": "overloaded" })),
            FetchOutcome::TooLarge {
                limit: 1,
                observed: 2,
            },
            FetchOutcome::transport(TransportCause::Abort),
        ];

        for outcome in &outcomes {
            assert_eq!(classify(outcome), classify(outcome));
        }
    }
}

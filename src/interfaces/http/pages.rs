use axum::response::Html;

/// Confirmation page rendered after the provider redirect.
pub fn confirmation(ok: bool, message: &str) -> Html<String> {
    let heading = if ok {
        "Payment Successful"
    } else {
        "Something went wrong"
    };
    let troubleshooting = if ok {
        String::new()
    } else {
        "<p class=\"hint\">Troubleshooting: make sure your payment success_url includes \
         <code>?courseId=&lt;courseId&gt;</code> or that the provider supplies a \
         <code>session_id</code> so the server can read session metadata. For eSewa append \
         <code>&amp;courseId=&lt;courseId&gt;</code> when the URL already has query parameters.</p>"
            .to_string()
    };
    page(
        heading,
        &format!("<p>{}</p>{}", escape(message), troubleshooting),
    )
}

/// Rendered when the user backs out of checkout; nothing was charged.
pub fn cancelled() -> Html<String> {
    page(
        "Payment Cancelled",
        "<p>The payment was cancelled and you have not been charged. \
         You can restart checkout at any time.</p>",
    )
}

fn page(heading: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>{heading} - Buildemy</title></head>
<body>
  <main>
    <h1>{heading}</h1>
    {body}
    <a href="/dashboard">Go to Dashboard</a>
  </main>
</body>
</html>"#
    ))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_escapes_message() {
        let Html(html) = confirmation(true, "a<b>&c");
        assert!(html.contains("a&lt;b&gt;&amp;c"));
        assert!(html.contains("Payment Successful"));
    }

    #[test]
    fn test_failure_page_carries_troubleshooting_hint() {
        let Html(html) = confirmation(false, "nope");
        assert!(html.contains("Something went wrong"));
        assert!(html.contains("Troubleshooting"));
    }
}

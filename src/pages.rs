//! Inline HTML views
//!
//! The original deployment shipped Jinja-style template files; the pages
//! here are small enough that inline markup with escaping is simpler.

use html_escape::encode_text;

/// Entry page shown to anonymous visitors
pub fn home_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head><title>Anteroom</title></head>
<body>
    <h1>Anteroom</h1>
    <p>Please sign in to continue</p>
    <a href="/login">Sign in</a>
</body>
</html>
"#
    .to_string()
}

/// Protected page greeting the authenticated subject
pub fn welcome_page(user: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Welcome - Anteroom</title></head>
<body>
    <h1>Welcome, {user}</h1>
    <a href="/logout">Log out</a>
</body>
</html>
"#,
        user = encode_text(user)
    )
}

/// Error page shown when the provider exchange fails
pub fn error_page(reason: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Sign-in failed - Anteroom</title></head>
<body>
    <h1>Sign-in failed</h1>
    <p>{reason}</p>
    <a href="/">Back</a>
</body>
</html>
"#,
        reason = encode_text(reason)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_page_escapes_subject() {
        let page = welcome_page("<script>alert(1)</script>");
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn error_page_contains_reason() {
        let page = error_page("access_denied");
        assert!(page.contains("access_denied"));
    }
}

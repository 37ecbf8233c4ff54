//! HTML pages rendered by the authorization portal

const STYLE: &str = "font-family:sans-serif;text-align:center;padding:50px;\
background:#f5f5f5";
const BUTTON: &str = "display:inline-block;padding:15px 30px;background:#1a73e8;\
color:#fff;text-decoration:none;border-radius:5px;font-weight:bold";

/// Status page for `GET /`.
///
/// `detail` carries an explanatory line (for example a configuration error)
/// shown under the status when present.
pub fn status_page(authenticated: bool, detail: Option<&str>) -> String {
    let (label, color) = if authenticated {
        ("Authenticated", "#4CAF50")
    } else {
        ("Not Authenticated", "#f44336")
    };
    let detail = detail
        .map(|d| format!("<p style='color:#555'>{}</p>", escape_html(d)))
        .unwrap_or_default();

    format!(
        "<html><head><title>Google Workspace Portal</title></head>\
         <body style='{STYLE}'>\
         <div style='background:#fff;padding:40px;border-radius:10px;display:inline-block'>\
         <h1 style='color:#1a73e8'>Google Workspace MCP</h1>\
         <p style='font-size:18px;color:{color};font-weight:bold'>Status: {label}</p>\
         {detail}\
         <hr style='border:0;border-top:1px solid #eee;margin:20px 0'>\
         <a href='/login' style='{BUTTON}'>Authorize with Google</a>\
         </div></body></html>"
    )
}

/// Success page for a completed callback.
pub fn success_page() -> String {
    "<html><head><title>Authenticated</title></head>\
     <body><h1>Authenticated!</h1><p>Token saved. You can close this tab.</p>\
     <a href='/'>Back to Portal</a></body></html>"
        .to_string()
}

/// Error page for a failed callback or consent redirect, with a retry link.
pub fn error_page(message: &str) -> String {
    format!(
        "<html><head><title>Authorization Error</title></head>\
         <body><h1>Error</h1><p>{}</p><a href='/login'>Try Again</a></body></html>",
        escape_html(message)
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_page_reflects_state() {
        assert!(status_page(true, None).contains("Status: Authenticated"));
        assert!(status_page(false, None).contains("Status: Not Authenticated"));
        assert!(status_page(false, None).contains("href='/login'"));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let page = error_page("<script>alert('x')</script>");
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("href='/login'"));
    }
}

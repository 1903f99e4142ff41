//! Control page served at `/`.
//!
//! One form per port posting `port={n}` back to `/`, which switches and
//! redirects here; the active port's button is highlighted.  No scripts,
//! so the page works from any browser.

use core::fmt::Write;

use crate::kvm::Port;

const STYLE: &str = "body{font-family:sans-serif;margin:2em;max-width:32em}\
form{display:inline}\
button{font-size:1.5em;width:3em;height:3em;margin:.25em}\
button.active{background:#2a7;color:#fff}\
footer{margin-top:2em;color:#888;font-size:.8em}";

/// Render the page for `active`.
pub fn render(active: Port, hostname: &str) -> String {
    let mut html = String::with_capacity(1024);
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width\">\
         <title>KVM {host}</title><style>{STYLE}</style></head><body>\
         <h1>KVM switch</h1><p>Active port: <strong id=\"port\">{active}</strong></p>",
        host = escape(hostname),
    );
    for port in Port::ALL {
        let class = if port == active { " class=\"active\"" } else { "" };
        let _ = write!(
            html,
            "<form method=\"post\" action=\"/\">\
             <input type=\"hidden\" name=\"port\" value=\"{port}\">\
             <button type=\"submit\"{class}>{port}</button></form>"
        );
    }
    let _ = write!(
        html,
        "<footer>{host} &middot; v{ver}</footer></body></html>",
        host = escape(hostname),
        ver = env!("CARGO_PKG_VERSION"),
    );
    html
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

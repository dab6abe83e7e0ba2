//! MIME-mapped payload encodings and their wire renderings.

use serde_json::Value;

/// Structured payload encoding negotiated from a subscription's content type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PayloadEncoding {
    Json,
    Xml,
}

impl PayloadEncoding {
    /// Maps a configured content type onto a structured encoding.
    ///
    /// MIME parameters after the first `;` are ignored. Unknown content types
    /// map to `None`, which routes the delivery down the contentless-notify
    /// path like an unset payload type.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let base = content_type.split(';').next().unwrap_or("").trim();
        if base.is_empty() {
            None
        } else if base.ends_with("json") {
            Some(PayloadEncoding::Json)
        } else if base.ends_with("xml") {
            Some(PayloadEncoding::Xml)
        } else {
            None
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            PayloadEncoding::Json => "application/json",
            PayloadEncoding::Xml => "application/xml",
        }
    }

    /// Renders a resource body in this encoding.
    pub fn render(&self, body: &Value) -> String {
        match self {
            PayloadEncoding::Json => body.to_string(),
            PayloadEncoding::Xml => render_xml(body),
        }
    }
}

fn render_xml(body: &Value) -> String {
    let mut out = String::from("<resource>");
    write_xml_value(&mut out, body);
    out.push_str("</resource>");
    out
}

fn write_xml_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => escape_xml_into(out, s),
        Value::Array(items) => {
            for item in items {
                out.push_str("<item>");
                write_xml_value(out, item);
                out.push_str("</item>");
            }
        }
        Value::Object(map) => {
            for (key, val) in map {
                out.push('<');
                out.push_str(key);
                out.push('>');
                write_xml_value(out, val);
                out.push_str("</");
                out.push_str(key);
                out.push('>');
            }
        }
    }
}

fn escape_xml_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
}

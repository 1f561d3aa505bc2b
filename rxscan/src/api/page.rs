//! Server-rendered upload page.

use std::fmt::Write;

use crate::prescription::MedicineRecord;

const TEMPLATE: &str = include_str!("templates/index.html");
const CONTENT_MARKER: &str = "{{ content }}";

/// What the page shows under the upload form.
#[derive(Debug)]
pub enum PageContent<'a> {
    Empty,
    Error(&'a str),
    Medicines(&'a [MedicineRecord]),
}

pub fn render(content: PageContent<'_>) -> String {
    let body = match content {
        PageContent::Empty => String::new(),
        PageContent::Error(message) => {
            format!("  <p class=\"error\">{}</p>\n", escape_html(message))
        }
        PageContent::Medicines(medicines) => medicine_table(medicines),
    };

    TEMPLATE.replacen(CONTENT_MARKER, &body, 1)
}

fn medicine_table(medicines: &[MedicineRecord]) -> String {
    let mut html = String::from(
        "  <table>\n    <tr><th>Medicine</th><th>Dose</th><th>Frequency</th>\
         <th>Duration</th><th>Instructions</th></tr>\n",
    );

    for med in medicines {
        let _ = writeln!(
            html,
            "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&med.name),
            escape_html(&med.dose),
            escape_html(&med.frequency),
            escape_html(&med.duration),
            escape_html(&med.instructions),
        );
    }

    html.push_str("  </table>\n");
    html.push_str("  <p class=\"debug\"><a href=\"/debug_image\">View processed image</a></p>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_has_form_and_no_marker() {
        let html = render(PageContent::Empty);
        assert!(html.contains("name=\"image\""));
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(!html.contains(CONTENT_MARKER));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn errors_are_escaped() {
        let html = render(PageContent::Error("OCR error: <script>alert('x')</script>"));
        assert!(html.contains("OCR error: &lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn medicines_render_one_row_each() {
        let medicines = vec![
            MedicineRecord::with_defaults("Amoxicillin", Some("500mg"), None, None, None),
            MedicineRecord::with_defaults("Paracetamol", Some("650mg"), None, None, Some("before food")),
        ];

        let html = render(PageContent::Medicines(&medicines));

        assert_eq!(html.matches("<tr><td>").count(), 2);
        assert!(html.contains("<td>Amoxicillin</td><td>500mg</td>"));
        assert!(html.contains("<td>before food</td>"));
        assert!(html.find("Amoxicillin") < html.find("Paracetamol"));
    }

    #[test]
    fn escape_leaves_plain_text_alone() {
        assert_eq!(escape_html("Paracetamol 650mg"), "Paracetamol 650mg");
        assert_eq!(escape_html("a & b"), "a &amp; b");
    }
}

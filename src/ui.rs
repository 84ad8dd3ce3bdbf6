use crate::editor::ColumnKind;
use crate::models::{CampusRegistry, RecencyEntry, RowRecord};
use crate::workflow::{Page, PageContent};
use std::fmt::Write;

pub fn render_page(page: &Page, registry: &CampusRegistry, done_url: &str) -> String {
    let title = match &page.campus {
        Some(campus) => escape_html(&campus.label),
        None => "Worship Attendance".to_string(),
    };
    PAGE_HTML
        .replace("{{TITLE}}", &title)
        .replace("{{BODY}}", &render_body(page, registry, done_url))
}

fn render_body(page: &Page, registry: &CampusRegistry, done_url: &str) -> String {
    let Some(campus) = &page.campus else {
        return render_campus_picker(registry);
    };
    let campus_id = campus.id.as_str();

    if page.content == PageContent::Saved {
        return format!(
            r#"<div class="saved-completed">
    <p class="message">Saved Completed</p>
    <a href="{back}" class="back">Pick another date</a>
    <a href="{done}" class="btn-done">I am done</a>
</div>"#,
            back = escape_html(&campus_url(campus_id)),
            done = escape_html(done_url),
        );
    }

    let mut body = String::new();
    let _ = write!(body, "<h1>{}", escape_html(&campus.label));
    if let Some(sheet_title) = page.sheet_title.as_deref().filter(|t| !t.is_empty()) {
        let _ = write!(body, " – {}", escape_html(sheet_title));
    }
    body.push_str("</h1>\n<a href=\"/\" class=\"btn-link\">← Change campus</a>\n");

    match &page.content {
        PageContent::Error(message) => {
            let _ = writeln!(body, r#"<p class="error">{}</p>"#, escape_html(message));
        }
        PageContent::DatePicker(entries) if entries.is_empty() => {
            body.push_str("<p class=\"error\">No data rows found for this sheet.</p>\n");
        }
        PageContent::DatePicker(entries) => body.push_str(&render_date_picker(campus_id, entries)),
        PageContent::EditForm { headers, row } => {
            body.push_str(&render_edit_form(campus_id, headers, row))
        }
        PageContent::CampusPicker | PageContent::Saved => {}
    }
    body
}

fn render_campus_picker(registry: &CampusRegistry) -> String {
    let mut body = String::from(
        "<h1>Select Campus</h1>\n<p class=\"hint\">Choose the campus to edit attendance.</p>\n<div class=\"campus-grid\">\n",
    );
    for campus in registry.iter() {
        let _ = writeln!(
            body,
            r#"    <a href="{}" class="campus-btn">{}</a>"#,
            escape_html(&campus_url(&campus.id)),
            escape_html(&campus.label)
        );
    }
    body.push_str("</div>\n");
    body
}

fn render_date_picker(campus_id: &str, entries: &[RecencyEntry]) -> String {
    let mut body = String::from(
        "<p class=\"hint\">Pick a worship date to edit.</p>\n<ul class=\"row-list\">\n",
    );
    for entry in entries {
        let _ = writeln!(
            body,
            r#"    <li><a href="{}"><span class="date">{}</span></a></li>"#,
            escape_html(&row_url(campus_id, entry.row_index)),
            escape_html(entry.label())
        );
    }
    body.push_str("</ul>\n");
    body
}

fn render_edit_form(campus_id: &str, headers: &[String], row: &RowRecord) -> String {
    let cell = |i: usize| row.values.get(i).map(String::as_str).unwrap_or("");
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<a href="{back}" class="btn-link">← Pick different date</a>
<div id="save-overlay" aria-hidden="true">
    <div class="saving-spinner" aria-hidden="true"></div>
    <span class="saving-text">Saving…</span>
</div>
<form method="post" action="{action}" id="sheet-form">
    <div><button type="submit" class="btn">Save to sheet</button></div>
    <input type="hidden" name="campus" value="{campus}">
    <input type="hidden" name="last_row_index" value="{row_index}">
"#,
        back = escape_html(&campus_url(campus_id)),
        action = escape_html(&row_url(campus_id, row.row_index)),
        campus = escape_html(campus_id),
        row_index = row.row_index,
    );

    for (i, header) in headers.iter().enumerate() {
        if ColumnKind::of(header) == ColumnKind::Timestamp {
            let _ = writeln!(
                body,
                r#"    <input type="hidden" name="v[{i}]" value="{}">"#,
                escape_html(cell(i))
            );
        }
    }

    body.push_str("    <table>\n        <tbody>\n");
    for (i, header) in headers.iter().enumerate() {
        let value = escape_html(cell(i));
        let field = match ColumnKind::of(header) {
            ColumnKind::Timestamp => continue,
            ColumnKind::ServiceDate => format!(
                r#"<input type="hidden" name="v[{i}]" value="{value}"><span class="readonly-value">{value}</span>"#
            ),
            ColumnKind::Editable => {
                format!(r#"<input type="text" name="v[{i}]" value="{value}">"#)
            }
        };
        let _ = writeln!(
            body,
            r#"            <tr><th scope="row">{}</th><td>{field}</td></tr>"#,
            escape_html(header)
        );
    }
    body.push_str(
        r#"        </tbody>
    </table>
    <button type="submit" class="btn" id="save-btn">Save to sheet</button>
</form>
<script>
    (function () {
        var form = document.getElementById('sheet-form');
        var overlay = document.getElementById('save-overlay');
        var btn = document.getElementById('save-btn');
        if (form && overlay) {
            form.addEventListener('submit', function () {
                overlay.classList.add('active');
                if (btn) btn.disabled = true;
            });
        }
    })();
</script>
"#,
    );
    body
}

fn campus_url(campus_id: &str) -> String {
    format!("/?campus={}", encode_component(campus_id))
}

fn row_url(campus_id: &str, row_index: usize) -> String {
    format!("{}&row={row_index}", campus_url(campus_id))
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}} – Edit row</title>
  <style>
    :root {
      --bg: #f5f5f7;
      --card: #ffffff;
      --text: #1d1d1f;
      --muted: #6e6e73;
      --accent: #0066cc;
    }

    * {
      box-sizing: border-box;
    }

    body {
      font-family: "Segoe UI", system-ui, sans-serif;
      background: var(--bg);
      color: var(--text);
      margin: 0;
      padding: 1.5rem;
      line-height: 1.5;
    }

    h1 {
      font-size: 1.25rem;
      font-weight: 600;
      margin: 0 0 1rem;
      color: var(--accent);
    }

    .hint {
      margin: 1rem 0;
      color: var(--muted);
    }

    .error {
      background: #ffebee;
      color: #c62828;
      padding: 1rem;
      border-radius: 8px;
      margin-bottom: 1rem;
    }

    table {
      width: 100%;
      max-width: 42rem;
      border-collapse: collapse;
      background: var(--card);
      border-radius: 8px;
      overflow: hidden;
      box-shadow: 0 1px 3px rgba(0, 0, 0, 0.08);
    }

    th,
    td {
      padding: 0.6rem 1rem;
      text-align: left;
      border-bottom: 1px solid rgba(0, 0, 0, 0.08);
    }

    th {
      font-weight: 600;
      color: var(--muted);
      font-size: 0.875rem;
    }

    tr:last-child td,
    tr:last-child th {
      border-bottom: none;
    }

    td {
      word-break: break-word;
    }

    input[type="text"] {
      width: 100%;
      padding: 0.4rem 0.5rem;
      background: #fff;
      border: 1px solid #d2d2d7;
      border-radius: 4px;
      color: var(--text);
      font: inherit;
    }

    .btn {
      margin-top: 1rem;
      padding: 0.5rem 1rem;
      background: var(--accent);
      color: #fff;
      border: none;
      border-radius: 6px;
      font-weight: 600;
      cursor: pointer;
      font-size: 0.9375rem;
    }

    .btn-link {
      display: inline-block;
      margin-right: 0.5rem;
      margin-bottom: 0.5rem;
      padding: 0.5rem 1rem;
      background: var(--card);
      color: var(--accent);
      border: 1px solid #d2d2d7;
      border-radius: 6px;
      text-decoration: none;
      font-size: 0.9375rem;
    }

    #save-overlay {
      position: fixed;
      inset: 0;
      background: rgba(245, 245, 247, 0.9);
      display: none;
      align-items: center;
      justify-content: center;
      z-index: 9999;
      flex-direction: column;
      gap: 1rem;
    }

    #save-overlay.active {
      display: flex;
    }

    .saving-spinner {
      width: 48px;
      height: 48px;
      border: 3px solid #d2d2d7;
      border-top-color: var(--accent);
      border-radius: 50%;
      animation: save-spin 0.8s linear infinite;
    }

    .saving-text {
      color: var(--accent);
      font-weight: 600;
    }

    @keyframes save-spin {
      to {
        transform: rotate(360deg);
      }
    }

    .saved-completed {
      display: flex;
      flex-direction: column;
      align-items: center;
      justify-content: center;
      min-height: 60vh;
      text-align: center;
    }

    .saved-completed .message {
      font-size: 1.5rem;
      font-weight: 600;
      color: #2e7d32;
      margin-bottom: 1rem;
    }

    .saved-completed .back {
      color: var(--accent);
      text-decoration: none;
      margin-top: 0.5rem;
    }

    .saved-completed .btn-done {
      display: inline-block;
      margin-top: 1.5rem;
      padding: 1rem 2.5rem;
      font-size: 1.5rem;
      font-weight: 700;
      background: var(--accent);
      color: #fff;
      border-radius: 8px;
      text-decoration: none;
      box-shadow: 0 4px 12px rgba(0, 102, 204, 0.35);
    }

    .campus-grid {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(140px, 1fr));
      gap: 0.75rem;
      max-width: 32rem;
    }

    .campus-btn {
      display: block;
      padding: 1rem;
      background: var(--card);
      border: 1px solid #d2d2d7;
      border-radius: 8px;
      color: var(--text);
      text-align: center;
      text-decoration: none;
      font-weight: 600;
    }

    .campus-btn:hover {
      border-color: var(--accent);
      color: var(--accent);
    }

    .row-list {
      list-style: none;
      padding: 0;
      margin: 0;
      max-width: 32rem;
    }

    .row-list li {
      margin-bottom: 0.5rem;
    }

    .row-list a {
      display: block;
      padding: 0.75rem 1rem;
      background: var(--card);
      border-radius: 6px;
      color: var(--text);
      text-decoration: none;
      border: 1px solid transparent;
    }

    .row-list a:hover {
      border-color: var(--accent);
    }

    .row-list .date {
      font-weight: 600;
    }

    .readonly-value {
      color: var(--muted);
    }
  </style>
</head>
<body>
{{BODY}}
</body>
</html>
"#;

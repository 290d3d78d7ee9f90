//! Built-in placeholder documents.

const HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>Obert Preview</title>
  <style>
    body {
      margin: 0;
      padding: 40px;
      font-family: system-ui, -apple-system, sans-serif;
      background: #1a1a1a;
      color: #fff;
      display: flex;
      align-items: center;
      justify-content: center;
      min-height: 100vh;
    }
    .message {
      text-align: center;
      max-width: 500px;
    }
    h1 { color: #8b5cf6; margin-bottom: 1rem; }
    p { color: #999; line-height: 1.6; }
  </style>
</head>
<body>
  <div class="message">
    <h1>Preview Ready</h1>
"#;

const TAIL: &str = r#"  </div>
</body>
</html>
"#;

/// Written to the preview file at startup when none exists.
pub fn bootstrap_document() -> String {
    format!("{HEAD}    <p>Generate code in Obert and it will appear here!</p>\n{TAIL}")
}

/// Served by `GET /preview` when the preview file cannot be read.
pub fn fallback_document(app_url: &str) -> String {
    format!(
        "{HEAD}    <p>Generate code in Obert at <a href=\"{app_url}\" style=\"color: #8b5cf6;\">{app_url}</a></p>\n{TAIL}"
    )
}

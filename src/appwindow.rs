use crate::dom::escape_html;

/// Open/closed state of the single app window. Content is set before opening,
/// so there is no loading state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AppWindow {
    open: bool,
}

impl AppWindow {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns true if the state changed.
    pub fn open(&mut self) -> bool {
        !std::mem::replace(&mut self.open, true)
    }

    /// Returns true if the state changed; closing a closed window is a no-op.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }
}

pub fn placeholder_document(app_name: &str) -> String {
    let name = escape_html(app_name);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{name}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 0;
            padding: 20px;
            background: #f5f5f5;
            color: #333;
        }}
        .app-container {{
            max-width: 800px;
            margin: 0 auto;
            background: white;
            border-radius: 8px;
            padding: 20px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }}
        h1 {{
            margin-top: 0;
            color: #2c3e50;
        }}
    </style>
</head>
<body>
    <div class="app-container">
        <h1>{name}</h1>
        <p>This is a placeholder for the {name} application.</p>
        <p>In a real implementation, this would load the actual application interface.</p>
    </div>
</body>
</html>
"#,
        name = name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_close_transitions() {
        let mut win = AppWindow::default();
        assert!(!win.is_open());
        assert!(win.open());
        assert!(!win.open());
        assert!(win.is_open());
        assert!(win.close());
        assert!(!win.is_open());
    }

    #[test]
    fn test_close_when_closed_is_idempotent() {
        let mut win = AppWindow::default();
        assert!(!win.close());
        assert!(!win.close());
        assert_eq!(win, AppWindow::default());
    }

    #[test]
    fn test_placeholder_mentions_app() {
        let doc = placeholder_document("Chess");
        assert!(doc.contains("<title>Chess</title>"));
        assert!(doc.contains("placeholder for the Chess application"));
    }

    #[test]
    fn test_placeholder_escapes_name() {
        let doc = placeholder_document("<script>x</script>");
        assert!(!doc.contains("<script>"));
        assert!(doc.contains("&lt;script&gt;x&lt;/script&gt;"));
    }
}

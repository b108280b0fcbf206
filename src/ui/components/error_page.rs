use html_escape::encode_text;

use super::layout::{vertical_layout, ActiveIcon};

pub fn render(error: &str) -> String {
    format!(
        r#"<div class="layout">
    {layout}
    <div class="content">
      <div class="content-header">
        <div class="content-title"> Erreur </div>
      </div>
      <div data-testid="error-message">{error}</div>
    </div>
  </div>"#,
        layout = vertical_layout(120, ActiveIcon::Window),
        error = encode_text(error),
    )
}

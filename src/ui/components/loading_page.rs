use super::layout::{vertical_layout, ActiveIcon};

pub fn render() -> String {
    format!(
        r#"<div class="layout">
    {layout}
    <div class="content" id="loading">Loading...</div>
  </div>"#,
        layout = vertical_layout(120, ActiveIcon::Window),
    )
}

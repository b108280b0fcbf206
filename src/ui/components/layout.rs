/// Which navbar icon is highlighted
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActiveIcon {
    Window,
    Mail,
}

const WINDOW_ICON: &str = r#"<svg width="32" height="32" viewBox="0 0 32 32" xmlns="http://www.w3.org/2000/svg"><rect x="4" y="6" width="24" height="20" rx="2" fill="none" stroke="currentColor" stroke-width="2"/><line x1="4" y1="11" x2="28" y2="11" stroke="currentColor" stroke-width="2"/></svg>"#;

const MAIL_ICON: &str = r#"<svg width="32" height="32" viewBox="0 0 32 32" xmlns="http://www.w3.org/2000/svg"><rect x="4" y="8" width="24" height="16" rx="2" fill="none" stroke="currentColor" stroke-width="2"/><polyline points="4,8 16,18 28,8" fill="none" stroke="currentColor" stroke-width="2"/></svg>"#;

/// Left navigation bar shared by the employee pages.
pub fn vertical_layout(height: u32, active: ActiveIcon) -> String {
    let class_of = |icon: ActiveIcon| if icon == active { "active-icon" } else { "" };

    format!(
        r#"<div class="vertical-navbar" style="height: {height}vh;">
      <div class="layout-title"> Billed </div>
      <div id="layout-icon1" data-testid="icon-window" class="{window_class}">{WINDOW_ICON}</div>
      <div id="layout-icon2" data-testid="icon-mail" class="{mail_class}">{MAIL_ICON}</div>
    </div>"#,
        window_class = class_of(ActiveIcon::Window),
        mail_class = class_of(ActiveIcon::Mail),
    )
}

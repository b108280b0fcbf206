use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::models::Bill;
use crate::ui::components::{
    error_page,
    layout::{vertical_layout, ActiveIcon},
    loading_page,
};

/// What the bills page should display. Exactly one case is active.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Error(String),
    Loaded(Vec<Bill>),
}

impl ViewState {
    /// Build a view state from loosely shaped route parameters.
    ///
    /// When several parameters are set, `loading` wins over `error`, which
    /// wins over `data`. Missing data renders as an empty list.
    pub fn from_parts(loading: bool, error: Option<String>, data: Option<Vec<Bill>>) -> Self {
        if loading {
            return ViewState::Loading;
        }
        match error {
            Some(message) => ViewState::Error(message),
            None => ViewState::Loaded(data.unwrap_or_default()),
        }
    }
}

const EYE_ICON: &str = r#"<svg width="20" height="20" viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg"><path d="M1 12s4-8 11-8 11 8 11 8-4 8-11 8-11-8-11-8z" fill="none" stroke="currentColor" stroke-width="2"/><circle cx="12" cy="12" r="3" fill="none" stroke="currentColor" stroke-width="2"/></svg>"#;

fn actions(bill_url: &str) -> String {
    format!(
        r#"<div class="icon-actions">
        <div id="eye" data-testid="icon-eye" data-bill-url="{url}">{EYE_ICON}</div>
      </div>"#,
        url = encode_double_quoted_attribute(bill_url),
    )
}

fn row(bill: &Bill) -> String {
    format!(
        r#"<tr>
      <td>{bill_type}</td>
      <td>{name}</td>
      <td>{date}</td>
      <td>{amount} €</td>
      <td>{status}</td>
      <td>
        {actions}
      </td>
    </tr>"#,
        bill_type = encode_text(&bill.bill_type),
        name = encode_text(&bill.name),
        date = bill.date.format("%Y-%m-%d"),
        amount = bill.amount,
        status = bill.status.label(),
        actions = actions(&bill.file_url),
    )
}

fn rows(bills: &[Bill]) -> String {
    bills.iter().map(row).collect::<Vec<_>>().join("\n")
}

fn modal() -> String {
    r#"<div class="modal fade" id="modaleFile" data-testid="modalFile" tabindex="-1" role="dialog" aria-labelledby="exampleModalCenterTitle" aria-hidden="true">
    <div class="modal-dialog modal-dialog-centered modal-lg" role="document">
      <div class="modal-content">
        <div class="modal-header">
          <h5 class="modal-title" id="exampleModalLongTitle">Justificatif</h5>
          <button type="button" class="close" data-dismiss="modal" aria-label="Close">
            <span aria-hidden="true">&times;</span>
          </button>
        </div>
        <div class="modal-body">
        </div>
      </div>
    </div>
  </div>"#
        .to_string()
}

fn bills_page(bills: &[Bill]) -> String {
    format!(
        r#"<div class="layout">
    {layout}
    <div class="content">
      <div class="content-header">
        <div class="content-title"> Mes notes de frais </div>
        <button type="button" data-testid="btn-new-bill" class="btn btn-primary">Nouvelle note de frais</button>
      </div>
      <div id="data-table">
        <table id="example" class="table table-striped" style="width:100%">
          <thead>
            <tr>
              <th>Type</th>
              <th>Nom</th>
              <th>Date</th>
              <th>Montant</th>
              <th>Statut</th>
              <th>Actions</th>
            </tr>
          </thead>
          <tbody data-testid="tbody">
            {rows}
          </tbody>
        </table>
      </div>
    </div>
    {modal}
  </div>"#,
        layout = vertical_layout(120, ActiveIcon::Window),
        rows = rows(bills),
        modal = modal(),
    )
}

/// Render the bills page. Rows keep the order they are given in.
pub fn render(state: &ViewState) -> String {
    match state {
        ViewState::Loading => loading_page::render(),
        ViewState::Error(message) => error_page::render(message),
        ViewState::Loaded(bills) => bills_page(bills),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BillStatus;
    use crate::store::fixture::fixture_bills;
    use rstest::{fixture, rstest};
    use scraper::{Html, Selector};

    #[fixture]
    fn bills() -> Vec<Bill> {
        fixture_bills()
    }

    fn texts_matching(html: &str, selector: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let selector = Selector::parse(selector).unwrap();
        document
            .select(&selector)
            .map(|element| element.text().collect::<String>())
            .collect()
    }

    fn is_iso_date(text: &str) -> bool {
        chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok() && text.len() == 10
    }

    #[rstest]
    fn dates_are_rendered_in_the_order_given(bills: Vec<Bill>) {
        let html = render(&ViewState::Loaded(bills.clone()));

        let dates: Vec<String> = texts_matching(&html, "td")
            .into_iter()
            .filter(|text| is_iso_date(text))
            .collect();
        let expected: Vec<String> = bills
            .iter()
            .map(|bill| bill.date.format("%Y-%m-%d").to_string())
            .collect();

        assert_eq!(dates, expected);
    }

    #[rstest]
    fn anti_chronological_input_stays_anti_chronological(mut bills: Vec<Bill>) {
        bills.sort_by(|a, b| b.date.cmp(&a.date));
        let html = render(&ViewState::Loaded(bills));

        let dates: Vec<String> = texts_matching(&html, "td")
            .into_iter()
            .filter(|text| is_iso_date(text))
            .collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));

        assert_eq!(dates, sorted);
        assert_eq!(dates.first().map(String::as_str), Some("2004-04-04"));
    }

    #[rstest]
    fn every_bill_gets_a_row_and_an_eye_icon(bills: Vec<Bill>) {
        let html = render(&ViewState::Loaded(bills.clone()));
        let document = Html::parse_document(&html);

        let rows = Selector::parse("tbody tr").unwrap();
        assert_eq!(document.select(&rows).count(), 4);

        let icons = Selector::parse(r#"[data-testid="icon-eye"]"#).unwrap();
        let urls: Vec<&str> = document
            .select(&icons)
            .filter_map(|icon| icon.value().attr("data-bill-url"))
            .collect();
        let expected: Vec<&str> = bills.iter().map(|bill| bill.file_url.as_str()).collect();
        assert_eq!(urls, expected);
    }

    #[rstest]
    fn loaded_page_has_title_button_and_modal(bills: Vec<Bill>) {
        let html = render(&ViewState::Loaded(bills));

        assert!(html.contains("Mes notes de frais"));
        assert!(html.contains(r#"data-testid="btn-new-bill""#));
        assert!(html.contains(r#"data-testid="modalFile""#));
    }

    #[rstest]
    fn status_and_amount_are_formatted(bills: Vec<Bill>) {
        let html = render(&ViewState::Loaded(bills));

        assert!(html.contains("400 €"));
        assert!(html.contains(BillStatus::Pending.label()));
        assert!(html.contains(BillStatus::Accepted.label()));
    }

    #[test]
    fn loading_state_renders_loading_page() {
        let html = render(&ViewState::Loading);
        assert!(html.contains("Loading..."));
    }

    #[rstest]
    #[case("Erreur 404")]
    #[case("Erreur 500")]
    fn error_state_renders_error_message(#[case] message: &str) {
        let html = render(&ViewState::Error(message.to_string()));

        assert!(html.contains("Erreur"));
        let messages = texts_matching(&html, r#"[data-testid="error-message"]"#);
        assert_eq!(messages, vec![message.to_string()]);
    }

    #[test]
    fn text_is_escaped() {
        let mut bill = fixture_bills().remove(0);
        bill.name = "<script>alert(1)</script>".to_string();
        bill.file_url = r#"x" onclick="evil"#.to_string();

        let html = render(&ViewState::Loaded(vec![bill]));

        assert!(!html.contains("<script>"));
        assert!(!html.contains(r#"onclick="evil""#));
    }

    #[rstest]
    fn loading_takes_precedence_over_error_and_data(bills: Vec<Bill>) {
        let state = ViewState::from_parts(true, Some("Erreur 404".to_string()), Some(bills));
        assert_eq!(state, ViewState::Loading);
    }

    #[rstest]
    fn error_takes_precedence_over_data(bills: Vec<Bill>) {
        let state = ViewState::from_parts(false, Some("Erreur 500".to_string()), Some(bills));
        assert_eq!(state, ViewState::Error("Erreur 500".to_string()));
    }

    #[test]
    fn missing_data_is_an_empty_list() {
        assert_eq!(ViewState::from_parts(false, None, None), ViewState::Loaded(Vec::new()));
    }
}

use crate::ui::components::layout::{vertical_layout, ActiveIcon};

/// Expense categories offered by the form
pub const EXPENSE_TYPES: [&str; 7] = [
    "Transports",
    "Restaurants et bars",
    "Hôtel et logement",
    "Services en ligne",
    "IT et électronique",
    "Equipement et matériel",
    "Fournitures de bureau",
];

fn expense_type_options() -> String {
    EXPENSE_TYPES
        .iter()
        .map(|label| format!("<option>{label}</option>"))
        .collect::<Vec<_>>()
        .join("\n              ")
}

/// Render the new bill form.
pub fn render() -> String {
    format!(
        r#"<div class="layout">
    {layout}
    <div class="content">
      <div class="content-header">
        <div class="content-title"> Envoyer une note de frais </div>
      </div>
      <div class="form-newbill-container content-inner">
        <form data-testid="form-new-bill">
          <div class="row">
            <div class="col-md-6">
              <div class="col-half">
                <label for="expense-type" class="bold-label">Type de dépense</label>
                <select required class="form-control blue-border" data-testid="expense-type">
              {options}
                </select>
              </div>
              <div class="col-half">
                <label for="expense-name" class="bold-label">Nom de la dépense</label>
                <input type="text" class="form-control blue-border" data-testid="expense-name" placeholder="Vol Paris Londres" />
              </div>
              <div class="col-half">
                <label for="datepicker" class="bold-label">Date</label>
                <input required type="date" class="form-control blue-border" data-testid="datepicker" />
              </div>
              <div class="col-half">
                <label for="amount" class="bold-label">Montant TTC </label>
                <input required type="number" class="form-control blue-border input-icon input-icon-right" data-testid="amount" placeholder="348"/>
              </div>
              <div class="col-half-row">
                <div class="flex-col">
                  <label for="vat" class="bold-label">TVA</label>
                  <input type="number" class="form-control blue-border" data-testid="vat" placeholder="70" />
                </div>
                <div class="flex-col">
                  <input type="number" class="form-control blue-border" data-testid="pct" placeholder="20" />
                </div>
              </div>
            </div>
            <div class="col-md-6">
              <div class="col-half">
                <label for="commentary" class="bold-label">Commentaire</label>
                <textarea class="form-control blue-border" data-testid="commentary" rows="3"></textarea>
              </div>
              <div class="col-half">
                <label for="file" class="bold-label">Justificatif</label>
                <input required type="file" accept=".jpg,.jpeg,.png" class="form-control blue-border" data-testid="file" />
              </div>
            </div>
          </div>
          <div class="row">
            <div class="col-md-6">
              <div class="col-half">
                <button type="submit" id="btn-send-bill" data-testid="btn-send-bill" class="btn btn-primary">Envoyer</button>
              </div>
            </div>
          </div>
        </form>
      </div>
    </div>
  </div>"#,
        layout = vertical_layout(120, ActiveIcon::Mail),
        options = expense_type_options(),
    )
}

use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;
use perk_filter::{DisplayState, PerkRecord};

fn records_table(records: &[PerkRecord]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["#", "Title", "Merchant", "Description"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for (idx, record) in records.iter().enumerate() {
        table.add_row(vec![
            (idx + 1).to_string(),
            record.title.clone(),
            record.merchant.clone(),
            record.description.clone().unwrap_or_default(),
        ]);
    }
    table
}

pub fn display_state(state: &DisplayState) {
    if state.is_loading {
        println!("{}", "Loading perks...".dark_grey());
    }
    if state.has_error {
        println!(
            "{}",
            "Could not reach the catalog; showing the last results. Type `refresh` to retry."
                .red()
        );
    }

    let filter = state
        .last_applied_criteria
        .as_ref()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string());
    println!("{} {}", state.summary().green().bold(), format!("({})", filter).dark_grey());

    if state.visible_records.is_empty() {
        println!("{}", "No perks match the current filters.".yellow());
    } else {
        println!("{}", records_table(&state.visible_records));
    }
}

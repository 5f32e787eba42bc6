use devrang_engine::{catalog_objects::SimilarProduct, db_types::Product};
use prettytable::{
    format::{LinePosition, LineSeparator, TableFormat},
    row,
    Table,
};

use crate::seed::SeedReport;

fn markdown_format() -> TableFormat {
    prettytable::format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

pub fn format_seed_report(report: &SeedReport) -> String {
    let mut table = Table::new();
    table.set_format(markdown_format());
    table.set_titles(row!["", "Added", "Already present"]);
    table.add_row(row!["Products", r->report.products_added, r->report.products_skipped]);
    table.add_row(row!["Customers", r->report.customers_added, r->report.customers_skipped]);
    let mut result = table.to_string();
    if report.rejected > 0 {
        result.push_str(&format!("{} entries were rejected. Run with RUST_LOG=warn for details.\n", report.rejected));
    }
    result
}

pub fn format_similar_products(product: &Product, similar: &[SimilarProduct]) -> String {
    let mut table = Table::new();
    table.set_format(markdown_format());
    table.set_titles(row!["#", "Id", "Name", "Category", "Price", "Score"]);
    for (i, s) in similar.iter().enumerate() {
        table.add_row(row![
            r->i + 1,
            r->s.product.id,
            s.product.name,
            s.product.category,
            r->s.product.price,
            r->format!("{:.3}", s.score)
        ]);
    }
    format!("Products similar to #{} ({})\n{table}", product.id, product.name)
}

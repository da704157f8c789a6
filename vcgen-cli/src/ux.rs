use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use crossterm::style::{style, Color, Stylize};

/// Borderless table with bold titles
#[must_use]
pub fn new_table<'a>(titles: impl IntoIterator<Item = &'a str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            titles
                .into_iter()
                .map(|t| Cell::new(t).add_attribute(Attribute::Bold)),
        );
    table
}

pub fn print_path(path: &str) {
    let path = style(path)
        .with(Color::Rgb {
            r: 0xAA,
            g: 0xAA,
            b: 0xAA,
        })
        .bold();
    println!(" {path}");
}

pub fn print_error_title(title: &str) {
    eprintln!(" {}", title.dark_red().bold());
}

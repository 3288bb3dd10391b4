//! Language catalogue listing.

use console::style;

use crate::ocr::{LANGUAGES, DEFAULT_LANGUAGES};

/// Print every supported language code.
pub fn cmd_languages() -> anyhow::Result<()> {
    println!("{}", style("Supported languages").bold());
    for lang in LANGUAGES {
        let marker = if DEFAULT_LANGUAGES.contains(&lang.code) {
            style("*").green().to_string()
        } else {
            " ".to_string()
        };
        println!("{} {:<15} — {}", marker, lang.code, lang.name);
    }
    println!();
    println!(
        "  {} default selection: {}",
        style("→").dim(),
        DEFAULT_LANGUAGES.join(", ")
    );
    Ok(())
}

//! Tool and model availability check.

use console::style;

use crate::config::Settings;
use crate::ocr::tools::{check_tools, REQUIRED_TOOLS};
use crate::ocr::TesseractFactory;

/// Report external tools and which configured languages have models.
pub fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    settings.validate()?;
    match settings.source_path {
        Some(ref path) => println!("{} Config: {}", style("→").cyan(), path.display()),
        None => println!("{} Config: built-in defaults", style("→").cyan()),
    }
    println!();

    println!("{}", style("External tools").bold());
    let mut all_found = true;
    for ((tool, found), (_, hint)) in check_tools().into_iter().zip(REQUIRED_TOOLS) {
        if found {
            println!("  {} {}", style("✓").green(), tool);
        } else {
            all_found = false;
            println!("  {} {} ({})", style("✗").red(), tool, style(hint).dim());
        }
    }

    println!();
    println!("{}", style("Language models").bold());
    let factory = TesseractFactory::with_tessdata_dir(settings.tessdata_dir.clone());
    match factory.installed_models() {
        Ok(installed) => {
            let languages = settings.language_set()?;
            for lang in languages.languages() {
                if installed.iter().any(|m| m == lang.model) {
                    println!("  {} {} ({})", style("✓").green(), lang.code, lang.model);
                } else {
                    all_found = false;
                    println!(
                        "  {} {} ({}) not installed",
                        style("✗").red(),
                        lang.code,
                        lang.model
                    );
                }
            }
            println!(
                "  {} {} model(s) installed: {}",
                style("→").dim(),
                installed.len(),
                installed.join(", ")
            );
        }
        Err(e) => {
            all_found = false;
            println!("  {} {}", style("✗").red(), e);
        }
    }

    println!();
    if all_found {
        println!("{} Ready", style("✓").green());
    } else {
        println!(
            "{} Some requirements are missing; extraction may fail",
            style("!").yellow()
        );
    }
    Ok(())
}

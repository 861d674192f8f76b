//! Tool availability check.

use console::style;

use crate::extract::TextExtractor;

/// Check that the external extraction tools are installed.
pub async fn cmd_check() -> anyhow::Result<()> {
    println!("\n{}", style("Extraction Tool Status").bold());
    println!("{}", "-".repeat(40));

    let tools = TextExtractor::check_tools();
    let mut all_found = true;

    for (tool, available) in &tools {
        let status = if *available {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<12} {}", tool, status);
    }

    if all_found {
        println!("\n{} All tools available", style("✓").green());
    } else {
        println!(
            "\n{} Missing tools; install poppler-utils and tesseract-ocr",
            style("!").yellow()
        );
    }

    Ok(())
}

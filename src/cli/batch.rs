use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::SousConfig;

/// Generate recipes for every prompt in a file (one per line), committing
/// each success as a persisted recipe. Failed prompts are reported at their
/// line number without aborting the rest.
pub async fn batch(config: &SousConfig, file: &str, owner: &str) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read prompt file {file}"))?;
    let prompts: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect();

    if prompts.is_empty() {
        println!("No prompts found in {file}.");
        return Ok(());
    }

    let pipeline = super::build_pipeline(config)?;

    let bar = ProgressBar::new(prompts.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .expect("valid progress template"),
    );
    bar.set_message("generating recipes");
    bar.enable_steady_tick(std::time::Duration::from_millis(120));

    let results = pipeline.generate_batch(&prompts, owner).await;
    bar.finish_and_clear();

    let mut committed = 0usize;
    for (index, result) in results.iter().enumerate() {
        match result {
            Ok(recipe) => {
                committed += 1;
                println!("  {} -> {} [{}]", prompts[index], recipe.name, recipe.id);
            }
            Err(e) => {
                println!("  {} -> FAILED: {e}", prompts[index]);
            }
        }
    }

    println!(
        "\nCommitted {committed}/{} recipes ({} failed).",
        prompts.len(),
        prompts.len() - committed
    );
    Ok(())
}

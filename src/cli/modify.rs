use anyhow::{bail, Result};

use crate::config::SousConfig;
use crate::recipe::types::Modification;

/// Modify an existing recipe: scale, substitute ingredients, or apply new
/// dietary constraints. Exactly one modification kind per invocation.
pub async fn modify(
    config: &SousConfig,
    recipe_id: &str,
    scale: Option<f64>,
    substitutions: Vec<String>,
    dietary: Vec<String>,
    request: Option<String>,
) -> Result<()> {
    let modification = parse_modification(scale, substitutions, &dietary, request)?;

    let pipeline = super::build_pipeline(config)?;
    let updated = pipeline
        .modify_recipe(recipe_id, modification, &dietary, &[])
        .await?;

    println!("Updated recipe:");
    super::print_recipe(&updated);
    Ok(())
}

fn parse_modification(
    scale: Option<f64>,
    substitutions: Vec<String>,
    dietary: &[String],
    request: Option<String>,
) -> Result<Modification> {
    let chosen = [
        scale.is_some(),
        !substitutions.is_empty(),
        !dietary.is_empty(),
        request.is_some(),
    ]
    .iter()
    .filter(|b| **b)
    .count();
    if chosen != 1 {
        bail!("pass exactly one of --scale, --substitute, --dietary, or --request");
    }

    if let Some(factor) = scale {
        if factor <= 0.0 {
            bail!("--scale must be positive");
        }
        return Ok(Modification::Scale { factor });
    }

    if !substitutions.is_empty() {
        let mut replacements = Vec::with_capacity(substitutions.len());
        for pair in &substitutions {
            let (from, to) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("--substitute expects from=to, got {pair}"))?;
            replacements.push((from.trim().to_string(), to.trim().to_string()));
        }
        return Ok(Modification::Substitute { replacements });
    }

    if !dietary.is_empty() {
        return Ok(Modification::Dietary {
            constraints: dietary.to_vec(),
        });
    }

    Ok(Modification::Freeform {
        request: request.unwrap_or_default(),
    })
}

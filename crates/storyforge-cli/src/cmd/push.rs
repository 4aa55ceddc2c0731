use std::path::Path;

use anyhow::Context;
use storyforge_core::artifact::load_stories;

use crate::output::print_json;

pub async fn run(
    config: Option<&Path>,
    feature_id: &str,
    file: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let settings = super::load_settings(config)?;
    super::require_tracker(&settings)?;
    let pipeline = super::build_pipeline(&settings)?;

    let stories = load_stories(file)
        .with_context(|| format!("failed to load stories from {}", file.display()))?;
    if stories.is_empty() {
        anyhow::bail!("{} contains no stories", file.display());
    }

    let results = pipeline.persist_stories(feature_id, &stories).await;

    if json {
        return print_json(&serde_json::json!({
            "feature": feature_id,
            "results": results,
        }));
    }

    for r in &results {
        match &r.error {
            None => println!("story {}: created", r.index + 1),
            Some(e) => println!("story {}: failed: {e}", r.index + 1),
        }
    }
    let ok = results.iter().filter(|r| r.succeeded).count();
    println!();
    println!("{ok} created, {} failed", results.len() - ok);
    Ok(())
}

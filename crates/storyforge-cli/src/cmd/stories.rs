use std::path::Path;

use anyhow::Context;
use storyforge_core::artifact::save_stories;
use storyforge_core::pipeline::Pipeline;

use crate::output::print_json;

pub async fn run(
    config: Option<&Path>,
    page_id: &str,
    context: &str,
    out: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let settings = super::load_settings(config)?;
    super::require_wiki(&settings)?;
    let pipeline = super::build_pipeline(&settings)?;

    let result = generate(&pipeline, page_id, context, out, json).await;
    pipeline.reset_assistant().await;
    result
}

async fn generate(
    pipeline: &Pipeline,
    page_id: &str,
    context: &str,
    out: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let (doc, stories) = match pipeline.generate_stories(page_id, context).await {
        Ok(ok) => ok,
        Err(e) => {
            if let Some(doc) = &e.document {
                eprintln!("fetched page {} (\"{}\") but generation failed", doc.id, doc.title);
            }
            return Err(e.into());
        }
    };

    if let Some(path) = out {
        save_stories(path, &stories)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!(
            "Wrote {} stories from \"{}\" to {}",
            stories.len(),
            doc.title,
            path.display()
        );
        return Ok(());
    }

    if json {
        return print_json(&serde_json::json!({
            "page": doc,
            "stories": stories,
        }));
    }

    println!("{} stories from \"{}\"", stories.len(), doc.title);
    for (i, story) in stories.iter().enumerate() {
        println!();
        println!("{}. {}", i + 1, story.title);
        println!("{}", story.description);
        println!("Acceptance criteria:");
        println!("{}", story.acceptance_criteria);
        if !story.notes.trim().is_empty() {
            println!("Notes: {}", story.notes);
        }
    }
    Ok(())
}

use std::path::Path;

use anyhow::Context;
use storyforge_core::pipeline::Pipeline;

use crate::output::print_json;

pub async fn run(
    config: Option<&Path>,
    ticket_id: &str,
    context: &str,
    comment: bool,
    as_task: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let settings = super::load_settings(config)?;
    super::require_tracker(&settings)?;
    let pipeline = super::build_pipeline(&settings)?;

    let result = generate(&pipeline, ticket_id, context, comment, as_task, json).await;
    // The CLI owns the Copilot server process; tear it down before exiting.
    pipeline.reset_assistant().await;
    result
}

async fn generate(
    pipeline: &Pipeline,
    ticket_id: &str,
    context: &str,
    comment: bool,
    as_task: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let (doc, report) = match pipeline.generate_test_cases(ticket_id, context).await {
        Ok(ok) => ok,
        Err(e) => {
            if let Some(doc) = &e.document {
                eprintln!("fetched work item {} (\"{}\") but generation failed", doc.id, doc.title);
            }
            return Err(e.into());
        }
    };

    let comment_receipt = if comment {
        Some(
            pipeline
                .append_report_comment(ticket_id, &report)
                .await
                .context("failed to append the report comment")?,
        )
    } else {
        None
    };
    let task_receipt = match as_task {
        Some(title) => Some(
            pipeline
                .create_task_from_report(ticket_id, title, &report)
                .await
                .context("failed to create the test case task")?,
        ),
        None => None,
    };

    if json {
        return print_json(&serde_json::json!({
            "ticket": doc,
            "report": report,
            "comment": comment_receipt,
            "task": task_receipt,
        }));
    }

    println!("Test cases for work item {} ({})", doc.id, doc.title);
    println!();
    println!("{report}");
    if comment_receipt.is_some() || task_receipt.is_some() {
        println!();
    }
    if let Some(r) = &comment_receipt {
        println!("Comment added to work item {}.", r.id);
    }
    if let Some(r) = &task_receipt {
        println!("Created task {}: {}", r.id, r.url);
    }
    Ok(())
}

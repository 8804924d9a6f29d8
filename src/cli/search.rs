use crate::cli::SearchArgs;
use crate::config::Config;
use crate::error::{ExitStatus, Result};
use crate::flow::{KnowledgeSearchFlow, KnowledgeSearchOutput, SearchKnowledgeInput};
use crate::knowledge::{self, KnowledgeCategory};
use crate::model::build_model_client;
use crate::ui;
use tracing::info;

/// Run the search command
pub async fn run_search(args: SearchArgs, config: &Config) -> Result<ExitStatus> {
    let knowledge_base = match args.knowledge_base.as_ref().or(config.data.knowledge_base.as_ref()) {
        Some(path) => {
            info!(path = %path.display(), "Using knowledge base file");
            knowledge::load_knowledge_base(path)?
        }
        None => knowledge::bundled_knowledge_base()?,
    };

    let input = SearchKnowledgeInput {
        search_term: args.term.clone(),
        knowledge_base,
    };

    let model = build_model_client(&config.model)?;
    let flow = KnowledgeSearchFlow::new(model)?;

    if args.dry_run {
        println!("{}", flow.render_prompt(&input)?);
        return Ok(ExitStatus::Success);
    }

    let spinner = ui::Spinner::new(&format!("Searching for \"{}\"...", args.term.trim()));
    let output = match flow.invoke(&input).await {
        Ok(output) => {
            spinner.finish_and_clear();
            output
        }
        Err(e) => {
            spinner.finish_with_error("Search failed");
            return Err(e);
        }
    };

    if args.json {
        ui::print_json(&output)?;
    } else {
        print_results(&output, &input.knowledge_base, args.full);
    }
    Ok(ExitStatus::Success)
}

fn print_results(output: &KnowledgeSearchOutput, knowledge_base: &[KnowledgeCategory], full: bool) {
    if output.results.is_empty() {
        ui::print_info("No relevant articles found.");
        return;
    }

    for result in &output.results {
        ui::print_heading(&format!("{} ({})", result.title, result.category));
        ui::print_dim(&result.summary);
        if full {
            match knowledge::find_article(knowledge_base, &result.title) {
                Some(article) => println!("{}", article.content),
                // The model may paraphrase a title
                None => ui::print_warning("Full article not found in the knowledge base"),
            }
        }
        ui::print_blank();
    }
}

use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use vn_runtime::{FsRepository, StoryRepository};

pub fn run(dir: &Path) -> Result<(), String> {
    let repository = FsRepository::new(dir);
    let library = repository.load_library().map_err(|e| e.to_string())?;

    if library.is_empty() {
        println!("  No stories in the library.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Title", "Description"]);

    for summary in &library {
        let description = match &summary.description {
            Some(d) if d.chars().count() > 60 => {
                format!("{}...", d.chars().take(57).collect::<String>())
            }
            Some(d) => d.clone(),
            None => "—".to_string(),
        };
        table.add_row(vec![
            summary.id.as_str(),
            summary.title.as_str(),
            description.as_str(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} stories", library.len());

    Ok(())
}

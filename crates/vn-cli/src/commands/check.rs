use std::path::Path;

use colored::Colorize;
use vn_core::{PROTAGONIST_SPEAKER, validate_library, validate_story};
use vn_runtime::{FsRepository, StoryRepository};

pub fn run(dir: &Path, id: Option<&str>) -> Result<(), String> {
    let repository = FsRepository::new(dir);
    let mut total_issues = 0;

    let ids: Vec<String> = match id {
        Some(id) => vec![id.to_string()],
        None => {
            let library = repository.load_library().map_err(|e| e.to_string())?;
            let issues = validate_library(&library);
            for issue in &issues {
                println!("  {} {issue}", "library".red().bold());
            }
            total_issues += issues.len();
            library.into_iter().map(|s| s.id).collect()
        }
    };

    for story_id in &ids {
        let story = repository.load_story(story_id).map_err(|e| e.to_string())?;
        let issues = validate_story(&story, PROTAGONIST_SPEAKER);
        if issues.is_empty() {
            println!("  {} {story_id}", "ok".green());
        } else {
            println!("  {} {story_id}", "FAIL".red().bold());
            for issue in &issues {
                println!("    - {issue}");
            }
            total_issues += issues.len();
        }
    }

    if total_issues > 0 {
        Err(format!("validation failed with {total_issues} issue(s)"))
    } else {
        println!();
        println!("  All checks passed.");
        Ok(())
    }
}

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use colored::Colorize;
use vn_runtime::{
    FsRepository, JsonFileStore, Notification, Phase, Session, SessionConfig,
};

pub fn run(dir: &Path, id: &str, save_dir: &Path, fast: bool) -> Result<(), String> {
    let mut session = Session::new(
        Box::new(FsRepository::new(dir)),
        Box::new(JsonFileStore::new(save_dir)),
        SessionConfig::default(),
    );
    session.open_story(id).map_err(|e| e.to_string())?;

    if let Some(title) = session.story().and_then(|s| s.title.clone()) {
        println!("{}", title.bold());
        println!();
    }

    let mut printed = 0;
    let stdin = io::stdin();

    loop {
        // Drive pending reveal steps, honoring the pacing unless --fast.
        while let Some(due) = session.next_due_in() {
            if !fast {
                thread::sleep(Duration::from_millis(due));
            }
            session.advance(due);
            flush_output(&mut session, &mut printed);
        }
        flush_output(&mut session, &mut printed);

        match session.phase() {
            Phase::AwaitingChoice => {
                let Some(choice_id) = prompt_choice(&session, &stdin)? else {
                    break;
                };
                session.choose(&choice_id).map_err(|e| e.to_string())?;
                flush_output(&mut session, &mut printed);
            }
            _ => {
                let next = session.chapter_index().map(|i| i + 1);
                let chapters = session.story().map(|s| s.chapters.len()).unwrap_or(0);
                match next {
                    Some(next) if next < chapters => {
                        if !prompt_continue(&stdin)? {
                            break;
                        }
                        session.start_chapter(next).map_err(|e| e.to_string())?;
                        // The transcript starts over with the new chapter.
                        printed = 0;
                        println!();
                    }
                    _ => {
                        println!();
                        println!("{}", "The End.".bold());
                        break;
                    }
                }
            }
        }
    }

    session.persist_now().map_err(|e| e.to_string())
}

/// Print transcript lines and toasts that appeared since the last call.
fn flush_output(session: &mut Session, printed: &mut usize) {
    let messages = session.transcript().messages();
    for message in &messages[*printed..] {
        match &message.speaker {
            Some(speaker) if message.from_user => {
                println!("{} {}", format!("{speaker}:").cyan().bold(), message.text);
            }
            Some(speaker) => {
                println!("{} {}", format!("{speaker}:").bold(), message.text);
            }
            None => println!("{}", message.text.italic()),
        }
    }
    *printed = messages.len();

    for notification in session.drain_notifications() {
        if let Notification::Toast(text) = notification {
            println!("  {}", text.yellow());
        }
    }
}

/// Show the numbered choice menu and read a selection. `None` means the
/// reader quit (or stdin closed).
fn prompt_choice(session: &Session, stdin: &io::Stdin) -> Result<Option<String>, String> {
    let choices = session.current_choices();
    println!();
    for (i, choice) in choices.iter().enumerate() {
        println!("  {} {}", format!("[{}]", i + 1).bold(), choice.text);
    }

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        let mut line = String::new();
        let read = stdin.lock().read_line(&mut line).map_err(|e| e.to_string())?;
        if read == 0 {
            return Ok(None);
        }
        let input = line.trim();
        if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
            return Ok(None);
        }
        match input.parse::<usize>() {
            Ok(n) if (1..=choices.len()).contains(&n) => {
                return Ok(Some(choices[n - 1].id.clone()));
            }
            _ => println!("  pick 1-{} (or q to quit)", choices.len()),
        }
    }
}

/// Ask whether to continue into the next chapter.
fn prompt_continue(stdin: &io::Stdin) -> Result<bool, String> {
    println!();
    print!("{}", "-- next chapter? [Enter to continue, q to quit] ".dimmed());
    io::stdout().flush().map_err(|e| e.to_string())?;

    let mut line = String::new();
    let read = stdin.lock().read_line(&mut line).map_err(|e| e.to_string())?;
    Ok(read != 0 && !line.trim().eq_ignore_ascii_case("q"))
}

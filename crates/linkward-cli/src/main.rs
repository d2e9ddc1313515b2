use anyhow::{Context, Result};
use linkward_config::Config;
use linkward_engine::{DocumentStore, NotesDir, PathChange, Rewriter, paths};
use std::{env, path::PathBuf, process};
use tracing::warn;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    // The first argument may name the notes folder; otherwise it comes from
    // the config file.
    let notes_path;
    let from_config;
    let mut rename_titles_default = false;
    let command: &[String];

    match args.get(1) {
        Some(arg) if !is_command(arg) => {
            notes_path = PathBuf::from(arg);
            from_config = false;
            command = &args[2..];
        }
        _ => {
            match Config::load() {
                Ok(Some(config)) => {
                    notes_path = config.notes_path;
                    rename_titles_default = config.rename_titles;
                    from_config = true;
                    command = &args[1..];
                }
                Ok(None) => {
                    eprintln!("Error: No notes path provided and no config file found");
                    eprintln!("Create a config file at {}", config_path.display());
                    print_usage(&args[0]);
                    process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error: Failed to load config file: {e}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
            };
        }
    }

    let store = match NotesDir::open(&notes_path) {
        Ok(store) => store,
        Err(e) => {
            let source = if from_config {
                format!(" from config file '{}'", config_path.display())
            } else {
                String::new()
            };
            eprintln!(
                "Error: Notes path '{}'{} is invalid: {e}",
                notes_path.display(),
                source
            );
            process::exit(1);
        }
    };
    let rewriter = Rewriter::new(&store);

    match command {
        [cmd, note] if cmd == "links" => cmd_links(&rewriter, note),
        [cmd, target] if cmd == "backlinks" => cmd_backlinks(&rewriter, target),
        [cmd, old, new] if cmd == "move" => {
            cmd_move(&store, &rewriter, old, new, rename_titles_default)
        }
        [cmd, old, new, flag] if cmd == "move" && flag == "--rename-titles" => {
            cmd_move(&store, &rewriter, old, new, true)
        }
        [cmd, note, new_base] if cmd == "rename" => {
            cmd_rename(&store, &rewriter, note, new_base, rename_titles_default)
        }
        [cmd, note, new_base, flag] if cmd == "rename" && flag == "--rename-titles" => {
            cmd_rename(&store, &rewriter, note, new_base, true)
        }
        _ => {
            print_usage(&args[0]);
            process::exit(1);
        }
    }
}

fn is_command(arg: &str) -> bool {
    matches!(arg, "links" | "backlinks" | "move" | "rename")
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} [notes-folder-path] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  links <note>                list the links found in a note");
    eprintln!("  backlinks <path>            list notes whose links resolve to a path");
    eprintln!("  move <old> <new> [--rename-titles]");
    eprintln!("                              rewrite links after a file moved from <old> to <new>");
    eprintln!("  rename <note> <new-name> [--rename-titles]");
    eprintln!("                              rewrite links after a note's file name changed");
    eprintln!();
    eprintln!(
        "The notes folder may also come from {}",
        Config::config_path().display()
    );
}

fn cmd_links<S: DocumentStore>(rewriter: &Rewriter<'_, S>, note: &str) -> Result<()> {
    let note = paths::normalize(note);
    let occurrences = rewriter
        .find_links(&note)
        .with_context(|| format!("cannot list links in '{note}'"))?;

    for occurrence in occurrences {
        match paths::resolve_link(&occurrence.target, &note) {
            Ok(resolved) => println!(
                "[{}]({}) -> {}",
                occurrence.display_text, occurrence.target, resolved
            ),
            Err(_) => println!(
                "[{}]({}) -> (unresolvable)",
                occurrence.display_text, occurrence.target
            ),
        }
    }
    Ok(())
}

fn cmd_backlinks<S: DocumentStore>(rewriter: &Rewriter<'_, S>, target: &str) -> Result<()> {
    let target = paths::normalize(target);
    let documents = rewriter
        .find_documents_linking_to(&target)
        .with_context(|| format!("cannot search for links to '{target}'"))?;

    if documents.is_empty() {
        println!("no documents link to '{target}'");
    } else {
        for doc in documents {
            println!("{doc}");
        }
    }
    Ok(())
}

fn cmd_move<S: DocumentStore>(
    store: &S,
    rewriter: &Rewriter<'_, S>,
    old: &str,
    new: &str,
    rename_titles: bool,
) -> Result<()> {
    let change = PathChange::new(paths::normalize(old), paths::normalize(new));
    let updated = apply_change_across_corpus(store, rewriter, change, rename_titles)?;
    println!("updated {updated} document(s)");
    Ok(())
}

fn cmd_rename<S: DocumentStore>(
    store: &S,
    rewriter: &Rewriter<'_, S>,
    note: &str,
    new_base: &str,
    rename_titles: bool,
) -> Result<()> {
    let old_path = paths::normalize(note);
    let new_path = paths::with_renamed_base(&old_path, new_base);
    let change = PathChange::new(old_path, new_path.clone());
    let updated = apply_change_across_corpus(store, rewriter, change, rename_titles)?;
    println!("updated {updated} document(s); links now point at '{new_path}'");
    Ok(())
}

fn apply_change_across_corpus<S: DocumentStore>(
    store: &S,
    rewriter: &Rewriter<'_, S>,
    change: PathChange,
    rename_titles: bool,
) -> Result<usize> {
    let files = store.list_files().context("cannot list files")?;
    if !files.contains(&change.new_path) {
        warn!(path = %change.new_path, "move target does not exist in the notes folder");
    }

    let changes = [change];
    let mut updated = 0;
    for doc in store.list_documents().context("cannot list documents")? {
        match rewriter.apply_path_changes(&doc, &changes, rename_titles) {
            Ok(true) => updated += 1,
            Ok(false) => {}
            // one broken document must not stop the rest of the sweep
            Err(e) => warn!(document = %doc, error = %e, "skipping document"),
        }
    }
    Ok(updated)
}

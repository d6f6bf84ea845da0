use std::error::Error;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{load_config, resolve_data_dir};
use crate::io::recovery::{read_recovery_entries, recovery_log_path};
use crate::io::storage::FileStorage;
use crate::model::task::{Task, TaskChanges};
use crate::ops::reorder::ProposedOrder;
use crate::ops::session::Session;

type CmdResult = Result<(), Box<dyn Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let data_dir = resolve_data_dir(cli.data_dir.as_deref())?;

    let Some(cmd) = cli.command else {
        return Err("no command given (run without arguments for the terminal UI)".into());
    };

    // Reading the recovery log doesn't need the task document
    if let Commands::Recovery(args) = cmd {
        return cmd_recovery(&data_dir, args, json);
    }

    let mut session = open_session(&data_dir)?;
    match cmd {
        // Read commands
        Commands::List(args) => cmd_list(&session, args, json),

        // Write commands
        Commands::Add(args) => cmd_add(&mut session, args, json),
        Commands::Edit(args) => cmd_edit(&mut session, args, json),
        Commands::Rm(args) => cmd_rm(&mut session, args),
        Commands::Mv(args) => cmd_mv(&mut session, args, json),
        Commands::Done(args) => cmd_set_completed(&mut session, args, true, json),
        Commands::Undone(args) => cmd_set_completed(&mut session, args, false, json),
        Commands::Order(args) => cmd_order(&mut session, args, json),
        Commands::Clear(args) => cmd_clear(&mut session, args, json),

        Commands::Recovery(_) => unreachable!("handled above"),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_session(data_dir: &Path) -> Result<Session<FileStorage>, Box<dyn Error>> {
    let config = load_config(data_dir)?;
    let storage = FileStorage::new(data_dir, config.quota_bytes);
    Ok(Session::open(storage, &config, Some(data_dir.to_path_buf())))
}

/// Write pending changes before reporting success
fn save(session: &mut Session<FileStorage>) -> CmdResult {
    session
        .flush_pending()
        .map_err(|e| format!("changes not saved: {}", e))?;
    Ok(())
}

/// Find a visible task by full id or unique id prefix.
fn resolve_id(session: &Session<FileStorage>, prefix: &str) -> Result<String, Box<dyn Error>> {
    if prefix.is_empty() {
        return Err("task id is empty".into());
    }
    let view = session.projected_view();
    let matches: Vec<&Task> = view
        .iter()
        .flat_map(|(_, lane)| lane.iter().copied())
        .filter(|t| t.id.starts_with(prefix))
        .collect();

    if let Some(exact) = matches.iter().find(|t| t.id == prefix) {
        return Ok(exact.id.clone());
    }
    match matches.as_slice() {
        [] => Err(format!("task not found: {}", prefix).into()),
        [only] => Ok(only.id.clone()),
        many => Err(format!("ambiguous task id '{}' matches {} tasks", prefix, many.len()).into()),
    }
}

fn print_task(session: &Session<FileStorage>, id: &str, json: bool) -> CmdResult {
    let task = session
        .store()
        .get(id)
        .ok_or_else(|| format!("task not found: {}", id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task))?);
    } else {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(session: &Session<FileStorage>, args: ListArgs, json: bool) -> CmdResult {
    let view = session.projected_view();
    if json {
        let matrix = matrix_to_json(&view, args.quadrant);
        println!("{}", serde_json::to_string_pretty(&matrix)?);
        return Ok(());
    }

    let mut first = true;
    for (quadrant, tasks) in view.iter() {
        if args.quadrant.is_some_and(|q| q != quadrant) {
            continue;
        }
        if !first {
            println!();
        }
        first = false;
        for line in format_lane(quadrant, tasks) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_recovery(data_dir: &Path, args: RecoveryArgs, json: bool) -> CmdResult {
    if args.path {
        println!("{}", recovery_log_path(data_dir).display());
        return Ok(());
    }

    let mut entries = read_recovery_entries(data_dir);
    entries.reverse();
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }

    if json {
        let out: Vec<_> = entries.iter().map(recovery_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if entries.is_empty() {
        println!("recovery log is empty");
    } else {
        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                println!();
            }
            for line in format_recovery_entry(entry) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(session: &mut Session<FileStorage>, args: AddArgs, json: bool) -> CmdResult {
    session.store().validate_text(&args.text)?;
    let quadrant = args
        .quadrant
        .unwrap_or_else(|| session.store().last_quadrant());
    let id = session
        .add_task(&args.text, quadrant)
        .ok_or("task was not added")?;
    save(session)?;

    if json {
        print_task(session, &id, true)
    } else {
        println!("{}", id);
        Ok(())
    }
}

fn cmd_edit(session: &mut Session<FileStorage>, args: EditArgs, json: bool) -> CmdResult {
    let id = resolve_id(session, &args.id)?;
    session.edit_text(&id, &args.text)?;
    save(session)?;
    print_task(session, &id, json)
}

fn cmd_rm(session: &mut Session<FileStorage>, args: IdArg) -> CmdResult {
    let id = resolve_id(session, &args.id)?;
    session.delete_task(&id);
    save(session)?;
    println!("deleted {}", id);
    Ok(())
}

fn cmd_mv(session: &mut Session<FileStorage>, args: MvArgs, json: bool) -> CmdResult {
    let id = resolve_id(session, &args.id)?;
    if !session.move_task(&id, args.quadrant) {
        tracing::info!(%id, quadrant = %args.quadrant, "task already in quadrant");
    }
    save(session)?;
    print_task(session, &id, json)
}

fn cmd_set_completed(
    session: &mut Session<FileStorage>,
    args: IdArg,
    completed: bool,
    json: bool,
) -> CmdResult {
    let id = resolve_id(session, &args.id)?;
    let already = session.store().get(&id).is_some_and(|t| t.completed == completed);
    if !already {
        session.update_task(&id, TaskChanges::completed(completed));
    }
    save(session)?;
    print_task(session, &id, json)
}

fn cmd_order(session: &mut Session<FileStorage>, args: OrderArgs, json: bool) -> CmdResult {
    let quadrant = args.quadrant;
    let mut listed = Vec::with_capacity(args.ids.len());
    for prefix in &args.ids {
        let id = resolve_id(session, prefix)?;
        if listed.contains(&id) {
            return Err(format!("task {} listed twice", id).into());
        }
        listed.push(id);
    }

    let proposal = {
        let view = session.projected_view();
        let lane = view.ids(quadrant);
        if let Some(stray) = listed.iter().find(|id| !lane.contains(*id)) {
            return Err(format!("task {} is not in {}", stray, quadrant.label()).into());
        }
        let rest: Vec<String> = lane.into_iter().filter(|id| !listed.contains(id)).collect();
        listed.extend(rest);
        ProposedOrder::from_view(&view).replace_lane(quadrant, listed)
    };
    session.reorder(&proposal);
    save(session)?;

    let view = session.projected_view();
    if json {
        let matrix = matrix_to_json(&view, Some(quadrant));
        println!("{}", serde_json::to_string_pretty(&matrix)?);
    } else {
        for line in format_lane(quadrant, view.lane(quadrant)) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_clear(session: &mut Session<FileStorage>, args: ClearArgs, json: bool) -> CmdResult {
    let outcome = if args.yes {
        session.clear_all(&mut |_: &str| true)
    } else {
        session.clear_all(&mut ask_on_stdin)
    };
    let cleared = match outcome {
        None => {
            eprintln!("cancelled");
            return Ok(());
        }
        Some(result) => result.map_err(|e| format!("tasks cleared but not saved: {}", e))?,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&ClearedJson { cleared })?
        );
    } else {
        println!("cleared {} tasks", cleared);
    }
    Ok(())
}

/// Prompt on stderr and read a y/n answer from stdin. Anything but yes declines.
fn ask_on_stdin(prompt: &str) -> bool {
    eprint!("{} [y/N] ", prompt);
    let _ = std::io::stderr().flush();
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes" | "Yes")
}

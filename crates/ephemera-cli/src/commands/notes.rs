//! Note command handlers.

use ephemera_core::service::{NewNote, NoteEdit};
use ephemera_core::NoteError;

use crate::app::AppContext;
use crate::cli::{CreateArgs, EditArgs, NoteIdArgs, UnlockArgs};
use crate::helpers::{parse_note_id, prompt_note_password, read_note_content};
use crate::output::{
    print_disclosed, print_json, print_note_list, print_status, print_summary,
};

pub fn handle_create(ctx: &AppContext, args: &CreateArgs) -> anyhow::Result<()> {
    let notes = ctx.notes()?;
    let caller = ctx.caller()?;
    let content = read_note_content(args.content.clone())?;

    let mut draft = NewNote::new(content, args.expiration_type);
    if let Some(title) = &args.title {
        draft = draft.with_title(title);
    }
    if let Some(ttl) = &args.ttl {
        draft = draft.with_expiration(ttl);
    }
    let password = match &args.password {
        Some(password) => Some(password.clone()),
        None if args.protect => Some(prompt_note_password(true)?),
        None => None,
    };
    if let Some(password) = password {
        draft = draft.with_password(password);
    }

    let summary = notes.create(&draft, &caller)?;

    if args.json {
        print_json(&summary)?;
    } else if ctx.quiet() {
        println!("{}", summary.id);
    } else {
        println!("Created note");
        print_summary(&summary);
    }
    Ok(())
}

pub fn handle_status(ctx: &AppContext, args: &NoteIdArgs) -> anyhow::Result<()> {
    let id = parse_note_id(&args.id)?;
    let status = ctx.notes()?.status(&id)?;
    if args.json {
        print_json(&status)?;
    } else {
        print_status(&status);
    }
    Ok(())
}

pub fn handle_view(ctx: &AppContext, args: &NoteIdArgs) -> anyhow::Result<()> {
    let id = parse_note_id(&args.id)?;
    let note = ctx.notes()?.view(&id)?;
    if args.json {
        print_json(&note)?;
    } else {
        print_disclosed(&note, ctx.quiet());
    }
    Ok(())
}

pub fn handle_unlock(ctx: &AppContext, args: &UnlockArgs) -> anyhow::Result<()> {
    let id = parse_note_id(&args.id)?;
    let notes = ctx.notes()?;
    let password = match &args.password {
        Some(password) => password.clone(),
        None => prompt_note_password(false)?,
    };

    let note = notes.unlock(&id, &password)?;
    if args.json {
        print_json(&note)?;
    } else {
        print_disclosed(&note, ctx.quiet());
    }
    Ok(())
}

pub fn handle_edit(ctx: &AppContext, args: &EditArgs) -> anyhow::Result<()> {
    let id = parse_note_id(&args.id)?;
    let notes = ctx.notes()?;
    let edit = NoteEdit {
        title: args.title.clone(),
        content: read_note_content(args.content.clone())?,
    };

    let summary = notes.edit(&id, &edit)?;
    if args.json {
        print_json(&summary)?;
    } else if !ctx.quiet() {
        println!("Updated note");
        print_summary(&summary);
    }
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, id: &str) -> anyhow::Result<()> {
    let id = parse_note_id(id)?;
    if !ctx.notes()?.remove(&id)? {
        return Err(NoteError::NotFound.into());
    }
    if !ctx.quiet() {
        println!("Deleted note {}", id);
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let notes = ctx.notes()?;
    let summaries = notes.list(&ctx.caller()?)?;
    if json {
        print_json(&summaries)?;
    } else if ctx.quiet() {
        for summary in &summaries {
            println!("{}", summary.id);
        }
    } else {
        print_note_list(&summaries);
    }
    Ok(())
}

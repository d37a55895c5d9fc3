//! Output formatting for controller events and tables.

use dramatis::{Character, NoticeKind, UiEvent, directory::DirectoryEntry};

/// Renderer for the CLI: controller events become terminal output.
pub fn print_event(event: &UiEvent) {
    match event {
        UiEvent::Notice { kind, message } => match kind {
            NoticeKind::Success => println!("{message}"),
            NoticeKind::Error => eprintln!("error: {message}"),
        },
        UiEvent::CollectionLoaded { owner, characters } => {
            print_characters(owner.as_str(), characters);
        }
        UiEvent::StateChanged(snapshot) => {
            if let (Some(session), Some(view)) = (&snapshot.session, &snapshot.view) {
                let library = if snapshot.permission.can_edit {
                    "your library".to_string()
                } else {
                    format!(
                        "{}'s library (read-only)",
                        view.owner_display_name.as_deref().unwrap_or(&view.owner_id)
                    )
                };
                tracing::debug!(user = session.label(), %library, "state changed");
            }
        }
        UiEvent::LoginPromptRequested => {
            tracing::debug!("not signed in");
        }
        UiEvent::LoginDialogClosed => {}
    }
}

pub fn print_characters(owner: &str, characters: &[Character]) {
    if characters.is_empty() {
        println!("No characters in {owner}'s library.");
        return;
    }
    let rows: Vec<Vec<String>> = characters
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.occupation.clone().unwrap_or_default(),
                c.relations.len().to_string(),
                c.gallery.len().to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "OCCUPATION", "RELATIONS", "GALLERY"], &rows);
}

pub fn print_directory(entries: &[DirectoryEntry]) {
    if entries.is_empty() {
        println!("No public libraries.");
        return;
    }
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| vec![e.user_id.to_string(), e.username.clone()])
        .collect();
    print_table(&["ID", "USERNAME"], &rows);
}

/// Print a table with aligned columns in human-readable format.
///
/// `headers` and each row in `rows` must have the same length.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    // Calculate column widths (max of header and all row values)
    let col_count = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    // Print header
    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:<width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_line.join("  "));

    // Print rows
    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .take(col_count)
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        println!("{}", line.join("  "));
    }
}

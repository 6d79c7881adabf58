use std::fmt::Write as _;
use std::io::{self, Write};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use once_cell::sync::Lazy;
use strum::IntoEnumIterator;
use time::format_description::well_known::Rfc3339;
use time::format_description::{self, FormatItem};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::app::{LinkBoard, ReminderOutcome};
use crate::model::Link;
use crate::sort::SortCriterion;

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Display text for the link
    pub text: String,
    /// Full URL, e.g. https://www.example.com
    pub url: String,
    /// Skip confirmation prompts
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RemoveArgs {
    /// Display text of the link to remove
    pub text: String,
    /// URL of the link to remove
    pub url: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RemindArgs {
    /// Display text of the link
    pub text: String,
    /// URL of the link
    pub url: String,
    /// Reminder phrase, e.g. "2 hours from now". Anything else is kept as a note.
    #[arg()]
    pub when: Option<String>,
    /// Absolute time: RFC 3339, or local wall clock "YYYY-MM-DD HH:MM"
    #[arg(long, conflicts_with = "when")]
    pub at: Option<String>,
    /// Clear the reminder
    #[arg(long, conflicts_with_all = ["when", "at"])]
    pub clear: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SortArgs {
    /// One of: dateAdded_asc, dateAdded_desc, text_asc, text_desc,
    /// scheduledTime_asc, scheduledTime_desc
    pub criterion: String,
}

static WALL_CLOCK_FORMAT: Lazy<Vec<FormatItem<'static>>> = Lazy::new(|| {
    format_description::parse("[year]-[month]-[day] [hour]:[minute]")
        .expect("valid wall-clock format description")
});

pub fn list_links(board: &LinkBoard) -> Result<()> {
    print!("{}", render_links(board.links()));
    Ok(())
}

pub fn add_link(board: &mut LinkBoard, args: AddArgs) -> Result<()> {
    let text = args.text.trim().to_string();
    if text.is_empty() {
        bail!("link text cannot be empty");
    }
    let url = normalize_url(args.url.trim(), args.yes)?;
    board.add_link(&text, &url)?;
    println!("Added \"{text}\" ({url})");
    Ok(())
}

pub fn remove_link(board: &mut LinkBoard, args: RemoveArgs) -> Result<()> {
    let text = args.text.trim();
    let url = args.url.trim();
    if !args.yes
        && !confirm(&format!(
            "Remove the link \"{text}\"? This cannot be undone."
        ))?
    {
        println!("Removal cancelled.");
        return Ok(());
    }
    if !board.remove_link(url, text) {
        bail!("no link matching \"{text}\" ({url})");
    }
    println!("Removed \"{text}\".");
    Ok(())
}

pub fn set_reminder(board: &mut LinkBoard, args: RemindArgs) -> Result<()> {
    let text = args.text.trim();
    let url = args.url.trim();

    if args.clear {
        return match board.set_reminder(url, text, None) {
            ReminderOutcome::NotFound => Err(not_found(text, url)),
            _ => {
                println!("Reminder cleared for \"{text}\".");
                Ok(())
            }
        };
    }

    if let Some(raw) = args.at.as_deref() {
        let instant = parse_wall_clock(raw)?;
        let display = format_instant(instant);
        return match board.set_reminder_at(url, text, instant, &display) {
            ReminderOutcome::NotFound => Err(not_found(text, url)),
            _ => {
                println!("Reminder set for {display}.");
                Ok(())
            }
        };
    }

    let Some(phrase) = args.when.as_deref() else {
        bail!("provide a reminder phrase, --at <time>, or --clear");
    };
    match board.set_reminder(url, text, Some(phrase)) {
        ReminderOutcome::Scheduled(instant) => {
            println!("Reminder set for {} (\"{}\").", format_instant(instant), phrase.trim());
        }
        ReminderOutcome::DisplayOnly => {
            println!(
                "Kept \"{}\" as a note; it is not a relative time expression.",
                phrase.trim()
            );
        }
        ReminderOutcome::Cleared => {
            println!("Reminder cleared for \"{text}\".");
        }
        ReminderOutcome::NotFound => return Err(not_found(text, url)),
    }
    Ok(())
}

pub fn set_sort(board: &mut LinkBoard, args: SortArgs) -> Result<()> {
    let raw = args.criterion.trim();
    let criterion: SortCriterion = raw.parse().map_err(|_| {
        anyhow!(
            "unknown sort criterion \"{raw}\" (expected one of: {})",
            criterion_names()
        )
    })?;
    board.set_criterion(criterion);
    println!("Sorting by {criterion}.");
    Ok(())
}

fn not_found(text: &str, url: &str) -> anyhow::Error {
    anyhow!("no link matching \"{text}\" ({url})")
}

fn criterion_names() -> String {
    SortCriterion::iter()
        .map(|criterion| criterion.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_links(links: &[Link]) -> String {
    if links.is_empty() {
        return "No links have been added yet. Use `linkdeck add` to create one.\n".to_string();
    }
    let mut out = String::new();
    for link in links {
        let _ = writeln!(&mut out, "{}  ({})", link.text, link.url);
        if let Some(instant) = link.scheduled_at {
            let _ = writeln!(&mut out, "    visit {}", format_instant(instant));
        } else if let Some(display) = &link.scheduled_time_display {
            let _ = writeln!(&mut out, "    visit {display}");
        }
    }
    out
}

/// Auto-prefixes bare hosts with https://, asking first unless the caller
/// passed --yes.
fn normalize_url(raw: &str, assume_yes: bool) -> Result<String> {
    if raw.is_empty() {
        bail!("link URL cannot be empty");
    }
    let lowered = raw.to_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return Ok(raw.to_string());
    }
    if assume_yes
        || confirm(&format!(
            "\"{raw}\" has no http:// or https:// prefix. Add \"https://\"?"
        ))?
    {
        Ok(format!("https://{raw}"))
    } else {
        bail!("invalid URL format: include http:// or https://");
    }
}

fn confirm(label: &str) -> Result<bool> {
    let mut stdout = io::stdout();
    write!(stdout, "{label} [y/N] ")?;
    stdout.flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim(), "y" | "Y" | "yes" | "Yes"))
}

/// Accepts RFC 3339 directly; otherwise treats the input as local wall
/// clock and applies the current UTC offset.
fn parse_wall_clock(raw: &str) -> Result<OffsetDateTime> {
    if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(instant.to_offset(UtcOffset::UTC));
    }
    let naive = PrimitiveDateTime::parse(raw, &*WALL_CLOCK_FORMAT).with_context(|| {
        format!("unrecognized time \"{raw}\" (expected RFC 3339 or \"YYYY-MM-DD HH:MM\")")
    })?;
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    Ok(naive.assume_offset(offset).to_offset(UtcOffset::UTC))
}

/// Human display of a reminder instant, in the viewer's wall clock.
fn format_instant(instant: OffsetDateTime) -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    instant
        .to_offset(offset)
        .format(&*WALL_CLOCK_FORMAT)
        .unwrap_or_else(|_| instant.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigPaths, StorageOptions};
    use crate::storage;
    use tempfile::TempDir;
    use time::macros::datetime;

    fn temp_board() -> Result<(TempDir, LinkBoard)> {
        let temp = TempDir::new()?;
        let root = temp.path();
        let paths = ConfigPaths {
            config_dir: root.join("config"),
            config_file: root.join("config/config.toml"),
            data_dir: root.join("data"),
            database_path: root.join("data/links.db"),
        };
        paths.ensure_directories()?;
        let store = storage::init(&paths, &StorageOptions::default())?;
        Ok((temp, LinkBoard::load(store, SortCriterion::default())))
    }

    #[test]
    fn normalize_url_prefixes_bare_hosts_with_yes() -> Result<()> {
        assert_eq!(
            normalize_url("www.example.com", true)?,
            "https://www.example.com"
        );
        assert_eq!(
            normalize_url("HTTPS://www.example.com", true)?,
            "HTTPS://www.example.com"
        );
        assert_eq!(
            normalize_url("http://plain.example", true)?,
            "http://plain.example"
        );
        assert!(normalize_url("", true).is_err());
        Ok(())
    }

    #[test]
    fn parse_wall_clock_accepts_rfc3339_and_normalizes_to_utc() -> Result<()> {
        let instant = parse_wall_clock("2025-06-01T10:00:00+02:00")?;
        assert_eq!(instant, datetime!(2025-06-01 08:00:00 UTC));
        assert!(parse_wall_clock("06/01/2025").is_err());
        Ok(())
    }

    #[test]
    fn render_links_annotates_reminders() -> Result<()> {
        let mut scheduled = Link::new("Docs", "https://developer.mozilla.org", 0);
        scheduled.scheduled_time_display = Some("2 hours from now".into());
        scheduled.scheduled_at = Some(datetime!(2025-05-14 22:00:00 UTC));
        let mut noted = Link::new("Wiki", "https://www.wikipedia.org", 0);
        noted.scheduled_time_display = Some("Tomorrow AM".into());
        let plain = Link::new("Example", "https://www.example.com", 0);

        let output = render_links(&[scheduled, noted, plain]);
        assert!(output.contains("Docs  (https://developer.mozilla.org)"));
        assert!(output.contains("visit Tomorrow AM"));
        assert!(output.contains("Example  (https://www.example.com)"));
        Ok(())
    }

    #[test]
    fn render_links_handles_empty_collection() {
        let output = render_links(&[]);
        assert!(output.contains("No links have been added yet"));
    }

    #[test]
    fn add_and_remove_commands_round_trip() -> Result<()> {
        let (_temp, mut board) = temp_board()?;
        add_link(
            &mut board,
            AddArgs {
                text: "Rust Book".into(),
                url: "doc.rust-lang.org/book".into(),
                yes: true,
            },
        )?;
        assert!(board
            .links()
            .iter()
            .any(|link| link.url == "https://doc.rust-lang.org/book"));

        remove_link(
            &mut board,
            RemoveArgs {
                text: "Rust Book".into(),
                url: "https://doc.rust-lang.org/book".into(),
                yes: true,
            },
        )?;
        assert!(!board.links().iter().any(|link| link.text == "Rust Book"));
        Ok(())
    }

    #[test]
    fn remind_command_sets_and_clears() -> Result<()> {
        let (_temp, mut board) = temp_board()?;
        set_reminder(
            &mut board,
            RemindArgs {
                text: "Google Search".into(),
                url: "https://www.google.com".into(),
                when: Some("2 hours from now".into()),
                at: None,
                clear: false,
            },
        )?;
        let link = board
            .links()
            .iter()
            .find(|link| link.text == "Google Search")
            .expect("seed link present");
        assert!(link.scheduled_at.is_some());

        set_reminder(
            &mut board,
            RemindArgs {
                text: "Google Search".into(),
                url: "https://www.google.com".into(),
                when: None,
                at: None,
                clear: true,
            },
        )?;
        let link = board
            .links()
            .iter()
            .find(|link| link.text == "Google Search")
            .expect("seed link present");
        assert!(link.scheduled_at.is_none());
        assert!(link.scheduled_time_display.is_none());
        Ok(())
    }

    #[test]
    fn remind_command_rejects_unknown_links() -> Result<()> {
        let (_temp, mut board) = temp_board()?;
        let result = set_reminder(
            &mut board,
            RemindArgs {
                text: "Ghost".into(),
                url: "https://nowhere.example".into(),
                when: Some("1 hour later".into()),
                at: None,
                clear: false,
            },
        );
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn sort_command_validates_criterion() -> Result<()> {
        let (_temp, mut board) = temp_board()?;
        set_sort(
            &mut board,
            SortArgs {
                criterion: "text_asc".into(),
            },
        )?;
        assert_eq!(board.criterion(), SortCriterion::TextAsc);

        let err = set_sort(
            &mut board,
            SortArgs {
                criterion: "updated_desc".into(),
            },
        )
        .expect_err("unknown criterion must be rejected");
        assert!(err.to_string().contains("dateAdded_asc"));
        Ok(())
    }
}

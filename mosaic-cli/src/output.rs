use std::fmt::Display;

use console::{StyledObject, style};
use mosaic_shard::FeedStatus;

const STATUS_WIDTH: usize = 12;

/// `label` right-aligned in the status column, followed by `message`.
fn column_line<D: Display>(label: StyledObject<D>, message: &str) -> String {
    format!("{:>width$} {}", label.bold(), message, width = STATUS_WIDTH)
}

pub fn status(label: &str, message: impl AsRef<str>) {
    eprintln!("{}", column_line(style(label).green(), message.as_ref()));
}

pub fn warn(message: impl AsRef<str>) {
    eprintln!("{}: {}", style("warning").yellow().bold(), message.as_ref());
}

pub fn error(message: impl AsRef<str>) {
    eprintln!("{}: {}", style("error").red().bold(), message.as_ref());
}

/// Prints the controller's load state in the status column.
pub fn feed_status(feed: &FeedStatus) {
    let line = match feed {
        FeedStatus::Idle => column_line(style("Idle").dim(), "no fetch started"),
        FeedStatus::Loading => column_line(style("Loading").cyan(), "fetch in progress"),
        FeedStatus::Ready => column_line(style("Ready").green(), "layout is current"),
        FeedStatus::Failed(reason) => column_line(style("Failed").red(), reason),
    };
    eprintln!("{line}");
}

/// One `glyph  id` line per content tile shown in the mosaic.
pub fn legend<'a>(entries: impl IntoIterator<Item = (char, &'a str)>) {
    for (glyph, id) in entries {
        eprintln!("{}", column_line(style(glyph).cyan(), id));
    }
}

#[cfg(test)]
mod tests {
    use console::strip_ansi_codes;

    use super::*;

    #[test]
    fn labels_share_one_right_aligned_column() {
        let loaded = column_line(style("Loaded").green(), "3 posts");
        assert_eq!(strip_ansi_codes(&loaded), "      Loaded 3 posts");

        let glyph = column_line(style('A').cyan(), "42");
        assert_eq!(strip_ansi_codes(&glyph), "           A 42");
    }
}

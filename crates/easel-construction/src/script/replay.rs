//! Rebuilding a construction from its script.

use super::OpcodeRecord;
use crate::commands::{parse_command, ObjectNameMap};
use crate::history::CommandHistory;
use crate::store::NoduleStore;
use easel_core::{Error, Result, ScriptError};

/// Lines starting with this are ignored.
pub const COMMENT_PREFIX: char = '#';

/// Non-blank, non-comment lines of `text` with their one-based line numbers.
pub fn script_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with(COMMENT_PREFIX))
}

/// Decodes, parses and executes every line of `text` in order.
///
/// Stops at the first failure. The caller owns atomicity: replay into a
/// fresh store and history and discard both on error.
pub fn replay(
    text: &str,
    history: &mut CommandHistory,
    store: &mut NoduleStore,
) -> Result<ObjectNameMap> {
    let mut names = ObjectNameMap::new();
    let mut count = 0usize;
    for (line_number, line) in script_lines(text) {
        let record = OpcodeRecord::decode(line).map_err(|e| at_line(e, line_number))?;
        let command = parse_command(&record, &mut names, store).map_err(|e| {
            tracing::warn!(line = line_number, tag = record.tag(), error = %e, "Script line rejected");
            e
        })?;
        history.execute(command, store)?;
        count += 1;
    }
    tracing::info!(commands = count, objects = names.len(), "Script replayed");
    Ok(names)
}

fn at_line(error: ScriptError, line_number: usize) -> Error {
    match error {
        ScriptError::Malformed { reason, .. } => ScriptError::Malformed {
            line_number,
            reason,
        }
        .into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let text = "# header\n\nAddPoint&pointVector=0,0,1\n   \n";
        let lines: Vec<_> = script_lines(text).collect();
        assert_eq!(lines, vec![(3, "AddPoint&pointVector=0,0,1")]);
    }

    #[test]
    fn test_malformed_line_reports_its_number() {
        let mut store = NoduleStore::new();
        let mut history = CommandHistory::new();
        let err = replay("# c\nAddPoint&broken", &mut history, &mut store).unwrap_err();
        match err {
            Error::Script(ScriptError::Malformed { line_number, .. }) => {
                assert_eq!(line_number, 2)
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let mut store = NoduleStore::new();
        let mut history = CommandHistory::new();
        let err = replay("Frobnicate&x=1", &mut history, &mut store).unwrap_err();
        assert!(matches!(
            err,
            Error::Script(ScriptError::UnknownCommand { .. })
        ));
    }
}

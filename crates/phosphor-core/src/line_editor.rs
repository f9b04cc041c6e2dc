use crate::host::{Cue, Host};
use crate::parser::tokenize;
use crate::screen::Screen;

/// Width the completion listing is laid out for, regardless of the real
/// terminal width.
pub const LISTING_WIDTH: usize = 80;

/// Committed lines, oldest first. Never holds two identical entries in a row.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<String>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the trimmed line. Empty lines and repeats of the newest entry
    /// are dropped; returns whether anything was appended.
    pub fn push(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() || self.entries.last().is_some_and(|last| last == line) {
            return false;
        }
        self.entries.push(line.to_string());
        true
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry `back` steps from the newest (0 = newest).
    pub fn from_end(&self, back: usize) -> Option<&str> {
        let idx = self.entries.len().checked_sub(back + 1)?;
        self.entries.get(idx).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    None,
    /// Text appended to the line.
    Extended(String),
    /// Candidates printed because no unambiguous extension exists.
    Listed(Vec<String>),
}

/// The unterminated input line plus history browsing and completion.
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    line: String,
    history: HistoryLog,
    /// Steps back from the newest history entry; `None` when not browsing.
    browsing: Option<usize>,
    /// What was typed before browsing started.
    saved: Option<String>,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn is_browsing(&self) -> bool {
        self.browsing.is_some()
    }

    pub fn insert(&mut self, c: char, screen: &mut Screen, host: &mut dyn Host) {
        self.line.push(c);
        let mut buf = [0u8; 4];
        screen.write(c.encode_utf8(&mut buf));
        host.play(Cue::Key);
    }

    pub fn backspace(&mut self, screen: &mut Screen, host: &mut dyn Host) {
        if self.line.pop().is_some() {
            screen.erase(1);
            host.play(Cue::Delete);
        }
    }

    /// Take the line for dispatch, recording it in history.
    pub fn commit(&mut self) -> String {
        let line = std::mem::take(&mut self.line);
        self.history.push(&line);
        self.browsing = None;
        self.saved = None;
        line
    }

    /// Drop the line without recording it.
    pub fn abandon(&mut self) {
        self.line.clear();
        self.browsing = None;
        self.saved = None;
    }

    pub fn history_up(&mut self, screen: &mut Screen) {
        if self.history.is_empty() {
            return;
        }
        let back = match self.browsing {
            None => {
                self.saved = Some(self.line.clone());
                0
            }
            Some(back) => (back + 1).min(self.history.len() - 1),
        };
        self.browsing = Some(back);
        let entry = self.history.from_end(back).unwrap_or_default().to_string();
        self.replace(entry, screen);
    }

    pub fn history_down(&mut self, screen: &mut Screen) {
        match self.browsing {
            None => {}
            Some(0) => {
                self.browsing = None;
                let restored = self.saved.take().unwrap_or_default();
                self.replace(restored, screen);
            }
            Some(back) => {
                self.browsing = Some(back - 1);
                let entry = self.history.from_end(back - 1).unwrap_or_default().to_string();
                self.replace(entry, screen);
            }
        }
    }

    /// Erase the visible line, then write its replacement.
    fn replace(&mut self, text: String, screen: &mut Screen) {
        screen.erase(self.line.chars().count());
        screen.write(&text);
        self.line = text;
    }

    /// Tab completion of the command name. Only applies while the line is a
    /// single token with the cursor still on it.
    pub fn complete(&mut self, names: &[String], screen: &mut Screen, prompt: &str) -> Completion {
        if self.line.ends_with([' ', '\t']) {
            return Completion::None;
        }
        let tokens = tokenize(&self.line);
        let [typed] = tokens.as_slice() else {
            return Completion::None;
        };
        let typed_len = typed.chars().count();

        let matches = candidates(typed, names);
        let extension = match matches.as_slice() {
            [] => return Completion::None,
            [only] => {
                let mut rest: String = only.chars().skip(typed_len).collect();
                if !only.ends_with('/') {
                    rest.push(' ');
                }
                rest
            }
            _ => common_prefix(&matches).chars().skip(typed_len).collect(),
        };

        if !extension.is_empty() {
            self.line.push_str(&extension);
            screen.write(&extension);
            return Completion::Extended(extension);
        }

        screen.write("\n");
        for row in columns(&matches, LISTING_WIDTH) {
            screen.writeln(&row);
        }
        screen.write(prompt);
        screen.write(&self.line);
        Completion::Listed(matches)
    }
}

/// Names whose lowercase form starts with the lowercase `typed`, sorted.
pub fn candidates(typed: &str, names: &[String]) -> Vec<String> {
    let prefix = typed.to_lowercase();
    let mut matches: Vec<String> = names
        .iter()
        .filter(|n| n.to_lowercase().starts_with(&prefix))
        .cloned()
        .collect();
    matches.sort();
    matches
}

/// Longest character-wise common prefix, case-sensitive.
fn common_prefix(words: &[String]) -> String {
    let Some(first) = words.first() else {
        return String::new();
    };
    let mut len = first.chars().count();
    for w in &words[1..] {
        len = first
            .chars()
            .zip(w.chars())
            .take(len)
            .take_while(|(a, b)| a == b)
            .count();
    }
    first.chars().take(len).collect()
}

/// Lay words out in equal-width columns across `width` characters.
pub fn columns(words: &[String], width: usize) -> Vec<String> {
    let col_width = words.iter().map(|w| w.chars().count()).max().unwrap_or(0) + 2;
    let per_row = (width / col_width).max(1);
    words
        .chunks(per_row)
        .map(|chunk| {
            chunk
                .iter()
                .map(|w| format!("{w:<col_width$}"))
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::RecordingHost;
    use crate::host::NullHost;

    const PROMPT: &str = "$ ";

    fn type_str(ed: &mut LineEditor, s: &str, screen: &mut Screen) {
        for c in s.chars() {
            ed.insert(c, screen, &mut NullHost);
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn fresh() -> (LineEditor, Screen) {
        let mut screen = Screen::new(80, 24);
        screen.write(PROMPT);
        (LineEditor::new(), screen)
    }

    #[test]
    fn repeated_line_is_recorded_once() {
        let mut log = HistoryLog::new();
        assert!(log.push("ls"));
        assert!(!log.push("ls"));
        assert!(log.push("help"));
        assert!(log.push("ls"));
        assert_eq!(log.entries(), &["ls", "help", "ls"]);
    }

    #[test]
    fn blank_lines_never_enter_history() {
        let (mut ed, mut screen) = fresh();
        type_str(&mut ed, "   ", &mut screen);
        assert_eq!(ed.commit(), "   ");
        assert!(ed.history().is_empty());
    }

    #[test]
    fn commit_through_editor_dedups() {
        let (mut ed, mut screen) = fresh();
        for line in ["same", "same", "other"] {
            type_str(&mut ed, line, &mut screen);
            ed.commit();
        }
        assert_eq!(ed.history().entries(), &["same", "other"]);
    }

    #[test]
    fn browsing_round_trip_restores_typed_line() {
        let (mut ed, mut screen) = fresh();
        for line in ["a", "b", "c"] {
            type_str(&mut ed, line, &mut screen);
            ed.commit();
            screen.write("\n");
            screen.write(PROMPT);
        }
        type_str(&mut ed, "d", &mut screen);

        let mut seen = Vec::new();
        for _ in 0..3 {
            ed.history_up(&mut screen);
            seen.push(ed.line().to_string());
        }
        assert_eq!(seen, vec!["c", "b", "a"]);

        for _ in 0..3 {
            ed.history_down(&mut screen);
        }
        assert_eq!(ed.line(), "d");
        assert!(!ed.is_browsing());
        assert_eq!(screen.live_line(), "$ d");
    }

    #[test]
    fn up_clamps_at_oldest_entry() {
        let (mut ed, mut screen) = fresh();
        type_str(&mut ed, "only", &mut screen);
        ed.commit();
        screen.write("\n$ ");
        for _ in 0..5 {
            ed.history_up(&mut screen);
        }
        assert_eq!(ed.line(), "only");
        assert_eq!(screen.live_line(), "$ only");
    }

    #[test]
    fn arrows_without_history_do_nothing() {
        let (mut ed, mut screen) = fresh();
        type_str(&mut ed, "x", &mut screen);
        ed.history_up(&mut screen);
        ed.history_down(&mut screen);
        assert_eq!(ed.line(), "x");
        assert!(!ed.is_browsing());
    }

    #[test]
    fn backspace_erases_and_cues() {
        let mut screen = Screen::new(80, 24);
        let mut host = RecordingHost::default();
        let mut ed = LineEditor::new();
        ed.insert('h', &mut screen, &mut host);
        ed.insert('i', &mut screen, &mut host);
        ed.backspace(&mut screen, &mut host);
        assert_eq!(ed.line(), "h");
        assert_eq!(screen.live_line(), "h");
        ed.backspace(&mut screen, &mut host);
        ed.backspace(&mut screen, &mut host);
        assert_eq!(host.cues(), vec![Cue::Key, Cue::Key, Cue::Delete, Cue::Delete]);
    }

    #[test]
    fn single_match_completes_with_trailing_space() {
        let (mut ed, mut screen) = fresh();
        type_str(&mut ed, "PI", &mut screen);
        let out = ed.complete(&names(&["piano", "help"]), &mut screen, PROMPT);
        assert_eq!(out, Completion::Extended("ano ".into()));
        assert_eq!(ed.line(), "PIano ");
    }

    #[test]
    fn single_match_ending_in_separator_gets_no_space() {
        let (mut ed, mut screen) = fresh();
        type_str(&mut ed, "do", &mut screen);
        let out = ed.complete(&names(&["docs/"]), &mut screen, PROMPT);
        assert_eq!(out, Completion::Extended("cs/".into()));
    }

    #[test]
    fn no_match_is_a_no_op() {
        let (mut ed, mut screen) = fresh();
        type_str(&mut ed, "zz", &mut screen);
        assert_eq!(ed.complete(&names(&["help"]), &mut screen, PROMPT), Completion::None);
        assert_eq!(ed.line(), "zz");
    }

    #[test]
    fn arguments_are_not_completed() {
        let (mut ed, mut screen) = fresh();
        type_str(&mut ed, "less he", &mut screen);
        assert_eq!(ed.complete(&names(&["help"]), &mut screen, PROMPT), Completion::None);
        let (mut ed, mut screen) = fresh();
        type_str(&mut ed, "help ", &mut screen);
        assert_eq!(ed.complete(&names(&["help"]), &mut screen, PROMPT), Completion::None);
    }

    #[test]
    fn candidates_are_sorted_and_filtered() {
        let all = names(&["help", "history", "hello"]);
        assert_eq!(candidates("he", &all), vec!["hello", "help"]);
    }

    #[test]
    fn shared_prefix_extends_then_lists() {
        let all = names(&["help", "history", "hello"]);
        let (mut ed, mut screen) = fresh();
        type_str(&mut ed, "he", &mut screen);

        // "hello" and "help" share "hel", one past what was typed
        assert_eq!(ed.complete(&all, &mut screen, PROMPT), Completion::Extended("l".into()));
        assert_eq!(ed.line(), "hel");

        let out = ed.complete(&all, &mut screen, PROMPT);
        assert_eq!(out, Completion::Listed(vec!["hello".into(), "help".into()]));
        assert_eq!(ed.line(), "hel");
        let lines = screen.lines();
        assert_eq!(lines[lines.len() - 2], "hello  help");
        assert_eq!(screen.live_line(), "$ hel");
    }

    #[test]
    fn columns_wrap_at_listing_width() {
        let words: Vec<String> = (0..12).map(|i| format!("command{i:02}")).collect();
        let rows = columns(&words, LISTING_WIDTH);
        // 9 chars + 2 padding = 11 wide, 7 per row
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("command00  command01"));
    }
}

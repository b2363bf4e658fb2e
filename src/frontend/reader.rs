use std::io::BufRead;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Supplies raw source lines to the lexer.
///
/// Interactive sources show `prompt` before reading; script sources ignore it.
/// `None` means the input is exhausted.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Reads lines from any buffered reader (files, piped stdin, test strings).
pub struct ScriptSource<R> {
    reader: R,
}

impl<R: BufRead> ScriptSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ScriptSource<R> {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Some(line)
            }
        }
    }
}

/// Reads lines through rustyline, with history and line editing.
pub struct InteractiveSource {
    editor: DefaultEditor,
}

impl InteractiveSource {
    pub fn new() -> Option<Self> {
        DefaultEditor::new().ok().map(|editor| Self { editor })
    }
}

impl LineSource for InteractiveSource {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Some(line)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => None,
            Err(_) => None,
        }
    }
}

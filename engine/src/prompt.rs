use std::io::{self, BufRead, Write};

/// Source of answers for interactive follow-up questions.
pub trait Prompt {
    /// Show `question` and wait for one line of input (without the line ending).
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Line-oriented prompt over any reader/writer pair; stdin/stdout in the CLI.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Next raw line, or `None` at end of input.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        self.next_line()?.ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "input closed while waiting for an answer")
        })
    }
}

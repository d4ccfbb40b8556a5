use super::StateSink;
use crate::pipeline::PublishedState;
use anyhow::{Context, Result};
use std::io::Write;

/// Prints the current estimate as a line of text whenever it changes
pub struct ConsoleSink<W: Write> {
    out: W,
    last_line: Option<String>,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_line: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(state: &PublishedState) -> Option<String> {
        if !state.face_found {
            // Nothing to report before the first cycle completes
            return (state.version > 0).then(|| "Face not found".to_string());
        }
        state
            .prediction
            .map(|prediction| format!("Age: {}", prediction.age))
    }
}

impl<W: Write> StateSink for ConsoleSink<W> {
    fn present(&mut self, state: &PublishedState) -> Result<()> {
        let Some(line) = Self::render(state) else {
            return Ok(());
        };
        if self.last_line.as_deref() == Some(line.as_str()) {
            return Ok(());
        }

        writeln!(self.out, "{}", line).context("Failed to write status line")?;
        self.out.flush().context("Failed to flush status line")?;
        self.last_line = Some(line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::Prediction;

    fn state(prediction: Option<u32>, face_found: bool, version: u64) -> PublishedState {
        PublishedState {
            prediction: prediction.map(|age| Prediction { age }),
            face_found,
            version,
        }
    }

    #[test]
    fn prints_only_changes() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.present(&state(None, false, 0)).unwrap();
        sink.present(&state(None, false, 1)).unwrap();
        sink.present(&state(None, true, 2)).unwrap();
        sink.present(&state(Some(27), true, 3)).unwrap();
        sink.present(&state(Some(27), true, 4)).unwrap();
        sink.present(&state(Some(27), false, 5)).unwrap();
        sink.present(&state(Some(30), true, 6)).unwrap();

        let printed = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(printed, "Face not found\nAge: 27\nFace not found\nAge: 30\n");
    }
}

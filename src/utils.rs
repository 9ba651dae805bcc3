use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Render values as a bracketed, comma-separated list
pub fn format_list(values: &[f64], precision: usize) -> String {
    let items: Vec<String> = values
        .iter()
        .map(|v| format!("{:.*}", precision, v))
        .collect();
    format!("[{}]", items.join(", "))
}

/// Print `prompt` to `output` and parse one index from `input`
pub fn prompt_index(input: &mut impl BufRead, output: &mut impl Write, prompt: &str) -> Result<usize> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read star index")?;
    if read == 0 {
        return Err(anyhow::anyhow!("No star index given on standard input"));
    }

    let trimmed = line.trim();
    trimmed
        .parse::<usize>()
        .with_context(|| format!("Invalid star index: '{}'", trimmed))
}

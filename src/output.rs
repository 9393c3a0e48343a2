//! JSON rendering for command results.
//!
//! Output above [`LARGE_OUTPUT_THRESHOLD`] is also spilled to a private temp
//! file, since agents and pagers often truncate captured stdout.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::Builder;
use tracing::info;

pub const LARGE_OUTPUT_THRESHOLD: usize = 30 * 1024;

/// Pretty-prints `value` to stdout, spilling large output to the system temp
/// directory.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    render(
        value,
        &mut stdout.lock(),
        &mut stderr.lock(),
        &std::env::temp_dir(),
    )?;
    Ok(())
}

/// Writes `value` to `out` and, when large, to a file in `spill_dir`.
/// Returns the spill path if one was written.
pub fn render<T, O, E>(value: &T, out: &mut O, err: &mut E, spill_dir: &Path) -> Result<Option<PathBuf>>
where
    T: Serialize + ?Sized,
    O: Write,
    E: Write,
{
    let mut rendered = serde_json::to_vec_pretty(value).context("rendering JSON output")?;
    rendered.push(b'\n');

    let mut spilled = None;
    if rendered.len() > LARGE_OUTPUT_THRESHOLD {
        let size = format_size(rendered.len());
        match write_spill(spill_dir, &rendered) {
            Ok(path) => {
                info!(path = %path.display(), size = rendered.len(), "large output spilled");
                writeln!(err, "Output is large ({size}). Full output written to: {}", path.display())?;
                writeln!(err)?;
                writeln!(err, "To reduce output size:")?;
                writeln!(err, "  - Use fewer --breakdown flags")?;
                writeln!(err, "  - Use a shorter --time-range")?;
                writeln!(err, "  - Add filters to narrow results")?;
                spilled = Some(path);
            }
            Err(e) => {
                writeln!(
                    err,
                    "warning: output is large ({size}) and could not be saved to a temp file: {e:#}"
                )?;
            }
        }
    }

    out.write_all(&rendered).context("writing output")?;
    out.flush()?;
    Ok(spilled)
}

/// Creates `hccli-<random>.json` (mode 0600 on unix) and keeps it on disk.
fn write_spill(dir: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let mut file = Builder::new()
        .prefix("hccli-")
        .suffix(".json")
        .tempfile_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    file.write_all(bytes).context("writing temp file")?;
    let (_, path) = file.keep().context("keeping temp file")?;
    Ok(path)
}

pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    match bytes {
        b if b < 1024 => format!("{b}B"),
        b if b < 1024 * 1024 => format!("{:.1}KB", b as f64 / KB),
        b => format!("{:.1}MB", b as f64 / MB),
    }
}

//! Input loading, result sinks and the plain-text matrix dump used by `debug_print`.
use std::fs::File;
use std::io::{
    BufWriter,
    Write,
};
use std::path::Path;

use ss_core::errors::*;
use ss_core::Configuration;
use tracing::{
    info,
    instrument,
};

/// Write `name:` followed by one bracketed line per row.
pub fn write_table<T: Copy>(
    out: &mut dyn Write,
    name: &str,
    rows: &[Vec<T>],
    cell: &dyn Fn(T) -> String,
) -> EmptyResult {
    writeln!(out, "{name}:")?;
    for row in rows {
        writeln!(out, "{}", bracketed(row, cell))?;
    }
    Ok(())
}

/// Write `name:` followed by a single bracketed line.
pub fn write_row<T: Copy>(out: &mut dyn Write, name: &str, row: &[T], cell: &dyn Fn(T) -> String) -> EmptyResult {
    writeln!(out, "{name}:")?;
    writeln!(out, "{}", bracketed(row, cell))?;
    Ok(())
}

/// `[a b c]`.
fn bracketed<T: Copy>(row: &[T], cell: &dyn Fn(T) -> String) -> String {
    let cells: Vec<_> = row.iter().map(|&v| cell(v)).collect();
    format!("[{}]", cells.join(" "))
}

/// One line per present result, every value followed by a space; absent results produce no line.
pub fn write_delays<W: Write>(out: &mut W, results: &[Option<Vec<f64>>]) -> EmptyResult {
    for delays in results.iter().flatten() {
        for value in delays {
            write!(out, "{value} ")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// [`write_delays`] into a new file at `path`.
#[instrument(skip(results), fields(runs = results.len()))]
pub fn write_delays_file(path: &Path, results: &[Option<Vec<f64>>]) -> EmptyResult {
    let mut out = BufWriter::new(File::create(path)?);
    write_delays(&mut out, results)?;
    out.flush()?;
    info!("delays written to {}", path.display());
    Ok(())
}

/// Write `count` as a single line.
pub fn write_absorbing_count(path: &Path, count: usize) -> EmptyResult {
    let mut file = File::create(path)?;
    writeln!(file, "{count}")?;
    info!("absorbing-state count written to {}", path.display());
    Ok(())
}

/// Load a list of configurations serialized as either JSON or YAML.
#[instrument]
pub fn load_configurations(path: &Path) -> anyhow::Result<Vec<Configuration>> {
    let contents = std::fs::read_to_string(path)?;
    let configurations: Vec<Configuration> = match serde_json::from_str(&contents) {
        Ok(configurations) => configurations,
        Err(json_err) => serde_yaml::from_str(&contents)
            .map_err(|yaml_err| anyhow!("{} is neither JSON ({json_err}) nor YAML ({yaml_err})", path.display()))?,
    };
    info!(count = configurations.len(), "loaded configurations from {}", path.display());
    Ok(configurations)
}

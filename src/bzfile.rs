//! # Magnetic-Field Input Reader
//!
//! Reads the flux-tube input text format: a header line with two integers
//! (model count, height-step count), followed by the shared ascending height
//! grid (Rsun above photosphere), followed once per model by a label line and
//! that many magnetic-field-strength values (Gauss). Values may be spread
//! over several lines.
//!
//! A point multiplier can linearly subdivide every grid interval (the final
//! interval is extended by extrapolated points) and re-interpolate the field
//! onto the refined grid; a multiplier of 1 reproduces the input exactly.

use crate::Numerics::finite_diff::interp;
use crate::model::WindError;
use nalgebra::DVector;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parsed content of one input file.
#[derive(Debug, Clone)]
pub struct BzInput {
    /// Shared heights (Rsun above photosphere), ascending
    pub heights: Vec<f64>,
    /// One label line per model (model number, latitude, ...)
    pub labels: Vec<String>,
    /// One field-strength profile per model (Gauss)
    pub b: Vec<Vec<f64>>,
}

impl BzInput {
    pub fn nmods(&self) -> usize {
        self.b.len()
    }

    pub fn nsteps(&self) -> usize {
        self.heights.len()
    }
}

/// Collect `count` whitespace-separated floats from the line stream.
fn collect_values<I>(lines: &mut I, count: usize, what: &str) -> Result<Vec<f64>, WindError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let mut values = Vec::with_capacity(count);
    while values.len() < count {
        let line = lines
            .next()
            .ok_or_else(|| WindError::Parse(format!("unexpected end of file reading {}", what)))??;
        for token in line.split_whitespace() {
            if values.len() == count {
                return Err(WindError::Parse(format!(
                    "extra value '{}' on a {} line",
                    token, what
                )));
            }
            let value: f64 = token
                .parse()
                .map_err(|_| WindError::Parse(format!("bad {} value '{}'", what, token)))?;
            values.push(value);
        }
    }
    Ok(values)
}

/// Parse the input format from any buffered reader.
pub fn read_bz<R: BufRead>(reader: R) -> Result<BzInput, WindError> {
    let mut lines = reader.lines();
    let header = lines
        .next()
        .ok_or_else(|| WindError::Parse("empty input".to_string()))??;
    let mut parts = header.split_whitespace();
    let nmods: usize = parts
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| WindError::Parse(format!("bad header line '{}'", header)))?;
    let nsteps: usize = parts
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| WindError::Parse(format!("bad header line '{}'", header)))?;
    if nmods == 0 || nsteps == 0 {
        return Err(WindError::Parse(format!(
            "header must give positive counts, got '{}'",
            header
        )));
    }

    let heights = collect_values(&mut lines, nsteps, "height")?;

    let mut labels = Vec::with_capacity(nmods);
    let mut b = Vec::with_capacity(nmods);
    for i in 0..nmods {
        let label = loop {
            let line = lines.next().ok_or_else(|| {
                WindError::Parse(format!("unexpected end of file before model {}", i))
            })??;
            if !line.trim().is_empty() {
                break line.trim().to_string();
            }
        };
        labels.push(label);
        b.push(collect_values(&mut lines, nsteps, "field")?);
    }

    Ok(BzInput { heights, labels, b })
}

/// Parse an input file from disk.
pub fn read_bz_file<P: AsRef<Path>>(path: P) -> Result<BzInput, WindError> {
    let file = File::open(path)?;
    read_bz(BufReader::new(file))
}

/// Subdivide every grid interval into `multiple` points (extending the last
/// interval with extrapolated heights) and re-interpolate the field profiles
/// onto the refined grid. `multiple == 1` returns the input unchanged.
pub fn refine(input: &BzInput, multiple: usize) -> Result<BzInput, WindError> {
    if multiple == 0 {
        return Err(WindError::Parse(
            "interpolation multiple must be at least 1".to_string(),
        ));
    }
    let nsteps = input.nsteps();
    if nsteps < 2 {
        return Err(WindError::Parse(format!(
            "need at least 2 heights to refine, got {}",
            nsteps
        )));
    }
    let old_zx = &input.heights;
    let mut zx = Vec::with_capacity(nsteps * multiple);
    for i in 0..nsteps - 1 {
        let delz = (old_zx[i + 1] - old_zx[i]) / multiple as f64;
        for l in 0..multiple {
            zx.push(old_zx[i] + delz * l as f64);
        }
    }
    // extend past the final height, reusing the last interval's spacing
    let delz = (old_zx[nsteps - 1] - old_zx[nsteps - 2]) / multiple as f64;
    for l in 0..multiple {
        zx.push(old_zx[nsteps - 1] + delz * l as f64);
    }

    let old_zx_v = DVector::from_vec(old_zx.clone());
    let mut b = Vec::with_capacity(input.nmods());
    for profile in &input.b {
        let old_b = DVector::from_vec(profile.clone());
        let new_b: Vec<f64> = zx.iter().map(|&z| interp(z, &old_zx_v, &old_b)).collect();
        b.push(new_b);
    }

    Ok(BzInput {
        heights: zx,
        labels: input.labels.clone(),
        b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;

    const TWO_MODEL_INPUT: &str = "2 5\n\
        0.0 0.01 0.1 1.0 10.0\n\
        1 45.0\n\
        10.0 8.0 4.0 1.0 0.1\n\
        2 -30.0\n\
        5.0 4.5 3.0 0.8 0.05\n";

    #[test]
    fn parses_two_model_block() {
        let input = read_bz(Cursor::new(TWO_MODEL_INPUT)).unwrap();
        assert_eq!(input.nmods(), 2);
        assert_eq!(input.nsteps(), 5);
        assert_eq!(input.heights, vec![0.0, 0.01, 0.1, 1.0, 10.0]);
        assert_eq!(input.labels[1], "2 -30.0");
        assert_eq!(input.b[0], vec![10.0, 8.0, 4.0, 1.0, 0.1]);
        assert_eq!(input.b[1], vec![5.0, 4.5, 3.0, 0.8, 0.05]);
    }

    #[test]
    fn refine_with_multiple_one_is_exact_round_trip() {
        let input = read_bz(Cursor::new(TWO_MODEL_INPUT)).unwrap();
        let refined = refine(&input, 1).unwrap();
        assert_eq!(refined.heights, input.heights);
        assert_eq!(refined.b, input.b);
        assert_eq!(refined.labels, input.labels);
    }

    #[test]
    fn refine_doubles_points() {
        let input = read_bz(Cursor::new(TWO_MODEL_INPUT)).unwrap();
        let refined = refine(&input, 2).unwrap();
        assert_eq!(refined.nsteps(), 10);
        // midpoint of the first interval
        assert_eq!(refined.heights[1], 0.005);
        assert_eq!(refined.b[0][1], 9.0);
        // extrapolated final height keeps the last interval's spacing
        assert_eq!(refined.heights[9], 10.0 + 4.5);
        // interpolation clamps at the profile end
        assert_eq!(refined.b[0][9], 0.1);
    }

    #[test]
    fn rejects_malformed_header() {
        assert!(read_bz(Cursor::new("two 5\n0 1 2 3 4\n")).is_err());
        assert!(read_bz(Cursor::new("0 5\n")).is_err());
        assert!(read_bz(Cursor::new("")).is_err());
    }

    #[test]
    fn rejects_truncated_model_block() {
        let text = "2 3\n0.0 0.1 0.2\nmodel 1\n1.0 2.0 3.0\n";
        assert!(read_bz(Cursor::new(text)).is_err());
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_MODEL_INPUT.as_bytes()).unwrap();
        let input = read_bz_file(file.path()).unwrap();
        assert_eq!(input.nmods(), 2);
        assert_eq!(input.heights.len(), 5);
    }
}

//! Reader for the simulator's raw waveform container.
//!
//! The format is a text header (title, plot name, flags, variable table)
//! followed by sample data, either ASCII (`Values:`) or little-endian
//! binary (`Binary:`). Runs executed with a `.step` directive concatenate
//! one segment per step into the same file; segment boundaries are
//! recovered by watching the sweep axis reset.

use std::ops::Range;
use std::path::Path;

use num_complex::Complex64;

use crate::error::{BenchError, Result};

#[derive(Debug, Clone)]
pub enum TraceValues {
    Real(Vec<f64>),
    Complex(Vec<Complex64>),
}

impl TraceValues {
    pub fn len(&self) -> usize {
        match self {
            TraceValues::Real(v) => v.len(),
            TraceValues::Complex(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_real(&self) -> Option<&[f64]> {
        match self {
            TraceValues::Real(v) => Some(v),
            TraceValues::Complex(_) => None,
        }
    }
}

/// One named sample sequence.
#[derive(Debug, Clone)]
pub struct Trace {
    pub name: String,
    pub unit: String,
    pub values: TraceValues,
}

/// A fully loaded waveform file. Read-only after construction.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub title: String,
    pub plotname: String,
    pub flags: Vec<String>,
    pub points: usize,
    traces: Vec<Trace>,
    steps: Vec<Range<usize>>,
}

impl RawFile {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).map_err(|err| BenchError::io("read waveform file", path, err))?;
        Self::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Parser::new(bytes).parse()
    }

    pub fn trace_names(&self) -> Vec<&str> {
        self.traces.iter().map(|t| t.name.as_str()).collect()
    }

    /// Look up a trace by name: exact match first, then a case-insensitive
    /// scan (the waveform stage lowercases names the netlist kept cased).
    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces
            .iter()
            .find(|t| t.name == name)
            .or_else(|| self.traces.iter().find(|t| t.name.eq_ignore_ascii_case(name)))
    }

    /// The sweep axis (variable 0).
    pub fn axis(&self) -> Option<&Trace> {
        self.traces.first()
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step_range(&self, step: usize) -> Option<Range<usize>> {
        self.steps.get(step).cloned()
    }

    /// Real samples of `trace` restricted to one sweep step.
    pub fn step_slice<'a>(&self, trace: &'a Trace, step: usize) -> Result<&'a [f64]> {
        let range = self.steps.get(step).ok_or_else(|| {
            BenchError::MalformedWaveform(format!(
                "step {} out of range ({} steps)",
                step,
                self.steps.len()
            ))
        })?;
        let values = trace.values.as_real().ok_or_else(|| {
            BenchError::MalformedWaveform(format!(
                "trace {} holds complex data where real samples were expected",
                trace.name
            ))
        })?;
        values.get(range.clone()).ok_or_else(|| {
            BenchError::MalformedWaveform(format!(
                "trace {} shorter than its step index",
                trace.name
            ))
        })
    }
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn next_line(&mut self) -> Result<Option<&'a str>> {
        if self.pos >= self.bytes.len() {
            return Ok(None);
        }
        let rest = &self.bytes[self.pos..];
        let (line, consumed) = match rest.iter().position(|&b| b == b'\n') {
            Some(idx) => (&rest[..idx], idx + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        let line = std::str::from_utf8(line).map_err(|_| {
            BenchError::MalformedWaveform("header is not valid UTF-8".to_string())
        })?;
        Ok(Some(line.trim_end_matches('\r')))
    }

    fn parse(mut self) -> Result<RawFile> {
        let mut title = String::new();
        let mut plotname = String::new();
        let mut flags: Vec<String> = Vec::new();
        let mut n_vars: Option<usize> = None;
        let mut n_points: Option<usize> = None;
        let mut variables: Vec<(String, String)> = Vec::new();
        let mut data_kind: Option<DataKind> = None;

        while let Some(line) = self.next_line()? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(rest) = strip_key(line, "Title:") {
                title = rest.to_string();
            } else if let Some(rest) = strip_key(line, "Plotname:") {
                plotname = rest.to_string();
            } else if let Some(rest) = strip_key(line, "Flags:") {
                flags = rest.split_whitespace().map(str::to_string).collect();
            } else if let Some(rest) = strip_key(line, "No. Variables:") {
                n_vars = Some(parse_count(rest, "No. Variables")?);
            } else if let Some(rest) = strip_key(line, "No. Points:") {
                n_points = Some(parse_count(rest, "No. Points")?);
            } else if strip_key(line, "Variables:").is_some() {
                let count = n_vars.ok_or_else(|| {
                    BenchError::MalformedWaveform(
                        "Variables section before No. Variables".to_string(),
                    )
                })?;
                for _ in 0..count {
                    let var_line = self.next_line()?.ok_or_else(|| {
                        BenchError::MalformedWaveform("truncated variable table".to_string())
                    })?;
                    let mut fields = var_line.split_whitespace();
                    let _index = fields.next();
                    let name = fields.next().ok_or_else(|| {
                        BenchError::MalformedWaveform(format!(
                            "variable entry missing name: {:?}",
                            var_line
                        ))
                    })?;
                    let unit = fields.next().unwrap_or("unknown");
                    variables.push((name.to_string(), unit.to_string()));
                }
            } else if strip_key(line, "Values:").is_some() {
                data_kind = Some(DataKind::Ascii);
                break;
            } else if strip_key(line, "Binary:").is_some() {
                data_kind = Some(DataKind::Binary);
                break;
            }
            // Date, Command and other informational keys are skipped.
        }

        let n_points = n_points
            .ok_or_else(|| BenchError::MalformedWaveform("missing No. Points".to_string()))?;
        let n_vars = n_vars
            .ok_or_else(|| BenchError::MalformedWaveform("missing No. Variables".to_string()))?;
        if variables.len() != n_vars {
            return Err(BenchError::MalformedWaveform(format!(
                "variable table has {} entries, header declares {}",
                variables.len(),
                n_vars
            )));
        }
        let data_kind = data_kind
            .ok_or_else(|| BenchError::MalformedWaveform("no Values/Binary section".to_string()))?;
        let complex = flags.iter().any(|f| f.eq_ignore_ascii_case("complex"));

        let columns = match data_kind {
            DataKind::Ascii => self.read_ascii(n_vars, n_points, complex)?,
            DataKind::Binary => self.read_binary(n_vars, n_points, complex)?,
        };

        let traces: Vec<Trace> = variables
            .into_iter()
            .zip(columns)
            .map(|((name, unit), values)| Trace { name, unit, values })
            .collect();

        let steps = segment_steps(&traces, n_points);

        Ok(RawFile {
            title,
            plotname,
            flags,
            points: n_points,
            traces,
            steps,
        })
    }

    fn read_ascii(
        &mut self,
        n_vars: usize,
        n_points: usize,
        complex: bool,
    ) -> Result<Vec<TraceValues>> {
        let rest = std::str::from_utf8(&self.bytes[self.pos..]).map_err(|_| {
            BenchError::MalformedWaveform("ASCII data section is not valid UTF-8".to_string())
        })?;
        let mut tokens = rest.split_whitespace();
        let mut columns = new_columns(n_vars, n_points, complex);

        for point in 0..n_points {
            let index_token = tokens.next().ok_or_else(|| {
                BenchError::MalformedWaveform(format!(
                    "data ends at point {} of {}",
                    point, n_points
                ))
            })?;
            let index: usize = index_token.parse().map_err(|_| {
                BenchError::MalformedWaveform(format!("bad point index: {:?}", index_token))
            })?;
            if index != point {
                return Err(BenchError::MalformedWaveform(format!(
                    "point index {} where {} was expected",
                    index, point
                )));
            }
            for column in columns.iter_mut() {
                let token = tokens.next().ok_or_else(|| {
                    BenchError::MalformedWaveform(format!(
                        "point {} is missing values",
                        point
                    ))
                })?;
                push_token(column, token)?;
            }
        }
        Ok(columns)
    }

    fn read_binary(
        &mut self,
        n_vars: usize,
        n_points: usize,
        complex: bool,
    ) -> Result<Vec<TraceValues>> {
        let data = &self.bytes[self.pos..];
        let width = if complex { 16 } else { 8 };
        let expected = n_vars * n_points * width;
        if data.len() < expected {
            return Err(BenchError::MalformedWaveform(format!(
                "binary payload holds {} bytes, {} required",
                data.len(),
                expected
            )));
        }
        let mut columns = new_columns(n_vars, n_points, complex);
        let mut offset = 0usize;
        for _point in 0..n_points {
            for column in columns.iter_mut() {
                match column {
                    TraceValues::Real(values) => {
                        values.push(read_f64(data, offset));
                        offset += 8;
                    }
                    TraceValues::Complex(values) => {
                        let re = read_f64(data, offset);
                        let im = read_f64(data, offset + 8);
                        values.push(Complex64::new(re, im));
                        offset += 16;
                    }
                }
            }
        }
        Ok(columns)
    }
}

enum DataKind {
    Ascii,
    Binary,
}

fn strip_key<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let trimmed = line.trim_start();
    if trimmed.len() >= key.len() && trimmed[..key.len()].eq_ignore_ascii_case(key) {
        Some(trimmed[key.len()..].trim())
    } else {
        None
    }
}

fn parse_count(text: &str, what: &str) -> Result<usize> {
    text.trim()
        .parse()
        .map_err(|_| BenchError::MalformedWaveform(format!("bad {} value: {:?}", what, text)))
}

fn new_columns(n_vars: usize, n_points: usize, complex: bool) -> Vec<TraceValues> {
    (0..n_vars)
        .map(|_| {
            if complex {
                TraceValues::Complex(Vec::with_capacity(n_points))
            } else {
                TraceValues::Real(Vec::with_capacity(n_points))
            }
        })
        .collect()
}

fn push_token(column: &mut TraceValues, token: &str) -> Result<()> {
    match column {
        TraceValues::Real(values) => {
            let value: f64 = token.parse().map_err(|_| {
                BenchError::MalformedWaveform(format!("unparseable sample: {:?}", token))
            })?;
            values.push(value);
        }
        TraceValues::Complex(values) => {
            let (re, im) = token.split_once(',').ok_or_else(|| {
                BenchError::MalformedWaveform(format!(
                    "complex sample without re,im pair: {:?}",
                    token
                ))
            })?;
            let re: f64 = re.trim().parse().map_err(|_| {
                BenchError::MalformedWaveform(format!("unparseable sample: {:?}", token))
            })?;
            let im: f64 = im.trim().parse().map_err(|_| {
                BenchError::MalformedWaveform(format!("unparseable sample: {:?}", token))
            })?;
            values.push(Complex64::new(re, im));
        }
    }
    Ok(())
}

fn read_f64(data: &[u8], offset: usize) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[offset..offset + 8]);
    f64::from_le_bytes(buf)
}

/// Split the point axis into per-step ranges. A stepped run restarts the
/// sweep axis from its initial value at each segment, so a drop below the
/// previous sample marks a boundary. Unstepped (or complex-axis) data is a
/// single segment.
fn segment_steps(traces: &[Trace], n_points: usize) -> Vec<Range<usize>> {
    let axis = match traces.first().and_then(|t| t.values.as_real()) {
        Some(axis) if axis.len() == n_points && n_points > 0 => axis,
        _ => return vec![0..n_points],
    };
    let mut boundaries = vec![0usize];
    for i in 1..axis.len() {
        if axis[i] < axis[i - 1] {
            boundaries.push(i);
        }
    }
    boundaries.push(n_points);
    boundaries
        .windows(2)
        .map(|pair| pair[0]..pair[1])
        .collect()
}

//! Trajectory capture for fixed-step runs.
//!
//! The solver reports every `(time, state)` sample through the [`Observer`]
//! trait: once with the initial condition, then once after each completed
//! step. [`Trajectory`] accumulates samples in memory; [`CsvObserver`]
//! streams them to disk instead.

use std::{fmt::Write, fs::File, io::BufWriter, path::Path};

use serde::{Deserialize, Serialize};

use crate::{error::OdeErrors, state::OdeState};

/// Capability for receiving `(time, state)` samples as the solver advances.
///
/// Implementations must copy anything they want to keep: the solver reuses
/// its working buffers after each call, so holding a reference past the
/// call would alias later-mutated state.
pub trait Observer<State: OdeState> {
    fn record(&mut self, t: f64, x: &State) -> Result<(), OdeErrors>;
}

/// In-memory recording of a run: parallel time and state sequences with
/// matching indices, append-only while the solver runs and owned outright
/// by the caller afterwards.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Trajectory<State: OdeState> {
    t: Vec<f64>,
    y: Vec<State>,
}

impl<State: OdeState> Trajectory<State> {
    pub fn new() -> Self {
        Self {
            t: Vec::new(),
            y: Vec::new(),
        }
    }

    /// Preallocates for a fixed-step run over `tspan` with step `dt`,
    /// which produces `⌊(tf − t0)/dt⌋ + 1` samples.
    pub fn for_span(tspan: (f64, f64), dt: f64) -> Self {
        let n = ((tspan.1 - tspan.0) / dt).floor() as usize + 1;
        Self {
            t: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, t: f64, x: &State) {
        self.t.push(t);
        self.y.push(x.clone());
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Recorded times, one per sample, strictly increasing.
    pub fn times(&self) -> &[f64] {
        &self.t
    }

    /// Recorded states, index-aligned with [`times`](Self::times).
    pub fn states(&self) -> &[State] {
        &self.y
    }

    pub fn last(&self) -> Option<(f64, &State)> {
        self.t.last().map(|t| (*t, self.y.last().unwrap()))
    }

    /// Projects one scalar component out of every recorded state, aligned
    /// index-for-index with [`times`](Self::times). No resampling is done;
    /// comparing against a reference sequence evaluated at other times is
    /// the caller's problem.
    ///
    /// # Panics
    ///
    /// Panics if `channel` is out of range for the state type.
    pub fn channel(&self, channel: usize) -> Vec<f64> {
        self.y.iter().map(|x| x.component(channel)).collect()
    }
}

impl<State: OdeState> Observer<State> for Trajectory<State> {
    fn record(&mut self, t: f64, x: &State) -> Result<(), OdeErrors> {
        self.push(t, x);
        Ok(())
    }
}

/// Streams samples to a CSV file instead of holding them in memory.
///
/// The header row (`t, x0, x1, ...`) is written with the first sample, when
/// the state dimension is known. The field buffer is reused across rows.
pub struct CsvObserver {
    writer: csv::Writer<BufWriter<File>>,
    fields: Vec<String>,
    wrote_header: bool,
}

impl CsvObserver {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, OdeErrors> {
        let file = File::create(path)?;
        let writer = csv::Writer::from_writer(BufWriter::new(file));
        Ok(Self {
            writer,
            fields: Vec::new(),
            wrote_header: false,
        })
    }

    /// Flushes buffered rows. Also happens on drop, but dropping swallows
    /// errors; call this when the run matters.
    pub fn flush(&mut self) -> Result<(), OdeErrors> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<State: OdeState> Observer<State> for CsvObserver {
    fn record(&mut self, t: f64, x: &State) -> Result<(), OdeErrors> {
        if !self.wrote_header {
            let mut header = vec!["t".to_string()];
            header.extend((0..x.dim()).map(|i| format!("x{i}")));
            self.writer.write_record(&header)?;
            self.fields = vec![String::new(); x.dim() + 1];
            self.wrote_header = true;
        }
        self.fields[0].clear();
        write!(self.fields[0], "{t}").unwrap();
        for i in 0..x.dim() {
            self.fields[i + 1].clear();
            write!(self.fields[i + 1], "{}", x.component(i)).unwrap();
        }
        self.writer.write_record(&self.fields)?;
        Ok(())
    }
}

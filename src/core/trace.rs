use crate::core::error::SimResult;
use crate::core::traits::SaveData;
use ndarray::*;
use serde::Serialize;
use std::io::Write;

/// In-cylinder state recorded at the end of one crank step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrankSample {
    pub angle: f64,           // [CA deg]
    pub pressure: f64,        // [Pa]
    pub volume: f64,          // [m³]
    pub temperature: f64,     // [K] - mixture temperature used by the heat-transfer model
    pub burned_fraction: f64, // [-]
}

impl SaveData for CrankSample {
    fn get_headers(&self) -> String {
        "crank-angle [deg]\tpressure [bar]\tvolume [cm³]\ttemperature [K]\tburned fraction [-]"
            .to_string()
    }
    fn num_storable_variables(&self) -> usize {
        5
    }
    fn get_storable_data(&self) -> Array1<f64> {
        array![
            self.angle,
            self.pressure / 1e5,
            self.volume * 1e6,
            self.temperature,
            self.burned_fraction
        ]
    }
}

/// Ordered, append-only pressure trace of one closed cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trace {
    samples: Vec<CrankSample>,
}

impl Trace {
    pub fn new() -> Trace {
        Trace { samples: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Trace {
        Trace {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, sample: CrankSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[CrankSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `(crank angle [CA deg], pressure [Pa])` pairs in crank order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.samples.iter().map(|s| (s.angle, s.pressure))
    }

    pub fn angles(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.angle).collect()
    }

    pub fn pressures(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.pressure).collect()
    }

    /// Returns `(angle, pressure)` of the highest pressure sample.
    pub fn peak_pressure(&self) -> Option<(f64, f64)> {
        self.samples
            .iter()
            .fold(None, |peak: Option<&CrankSample>, s| match peak {
                Some(p) if p.pressure >= s.pressure => Some(p),
                _ => Some(s),
            })
            .map(|s| (s.angle, s.pressure))
    }

    /// Pressure recorded at `angle`, if a sample lies within 1e-9 CA deg of it.
    pub fn pressure_at(&self, angle: f64) -> Option<f64> {
        self.samples
            .iter()
            .find(|s| (s.angle - angle).abs() < 1e-9)
            .map(|s| s.pressure)
    }

    /// Every sample as a row of `get_storable_data()`.
    pub fn to_array(&self) -> Array2<f64> {
        let cols = self
            .samples
            .first()
            .map_or(0, |s| s.num_storable_variables());
        let mut data = Array2::zeros((self.samples.len(), cols));
        for (mut row, sample) in data.axis_iter_mut(Axis(0)).zip(self.samples.iter()) {
            row.assign(&sample.get_storable_data());
        }
        data
    }

    /// Writes the trace as a tab-separated text file with a header line. An empty trace
    /// leaves the file system untouched.
    pub fn write_to_file(&self, file_name: &str) -> SimResult<()> {
        let headers = match self.samples.first() {
            Some(s) => s.get_headers(),
            None => return Ok(()),
        };
        let mut file = std::fs::File::create(file_name)?;
        writeln!(file, "{}", headers)?;
        for row in self.to_array().axis_iter(Axis(0)) {
            let line: Vec<String> = row.iter().map(|v| format!("{:.6e}", v)).collect();
            writeln!(file, "{}", line.join("\t"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(angle: f64, pressure: f64) -> CrankSample {
        CrankSample {
            angle,
            pressure,
            volume: 1e-4,
            temperature: 300.0,
            burned_fraction: 0.0,
        }
    }

    #[test]
    fn peak_of_empty_trace_is_none() {
        assert_eq!(Trace::new().peak_pressure(), None);
    }

    #[test]
    fn peak_picks_first_maximum() {
        let mut trace = Trace::new();
        trace.push(sample(180.5, 1e5));
        trace.push(sample(181.0, 3e5));
        trace.push(sample(181.5, 3e5));
        trace.push(sample(182.0, 2e5));
        assert_eq!(trace.peak_pressure(), Some((181.0, 3e5)));
        assert_eq!(trace.pressure_at(181.5), Some(3e5));
        assert_eq!(trace.pressure_at(190.0), None);
    }

    #[test]
    fn array_export_converts_units() {
        let mut trace = Trace::new();
        trace.push(sample(200.0, 2e5));
        let data = trace.to_array();
        assert_eq!(data.shape(), &[1, 5]);
        assert_eq!(data[[0, 0]], 200.0);
        assert_eq!(data[[0, 1]], 2.0);
        assert!((data[[0, 2]] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn writes_header_and_rows() {
        let mut trace = Trace::new();
        trace.push(sample(200.0, 2e5));
        trace.push(sample(200.5, 2.1e5));
        let path = std::env::temp_dir().join("lmb_cycle_trace_test.txt");
        let path = path.to_str().unwrap();
        trace.write_to_file(path).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("crank-angle"));
        assert_eq!(lines[1].split('\t').count(), 5);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn empty_trace_does_not_touch_existing_file() {
        let path = std::env::temp_dir().join(format!("lmb_cycle_empty_{}.txt", std::process::id()));
        std::fs::write(&path, "previous run\n").unwrap();
        let path_str = path.to_str().unwrap();
        Trace::new().write_to_file(path_str).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous run\n");
        std::fs::remove_file(&path).unwrap();

        Trace::new().write_to_file(path_str).unwrap();
        assert!(!path.exists());
    }
}

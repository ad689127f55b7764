//! Sweep planning: the simulation directives injected into the compiled
//! netlist, and the rule for picking which sweep step becomes the reported
//! scalar.

use std::path::Path;

#[derive(Debug, Clone)]
pub struct GateSweep {
    /// Name of the swept source in the compiled netlist.
    pub source: String,
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Default for GateSweep {
    fn default() -> Self {
        Self {
            source: "V1".to_string(),
            start: 0.0,
            stop: 5.0,
            step: 0.05,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TemperatureStep {
    pub start: f64,
    pub stop: f64,
    pub incr: f64,
}

impl Default for TemperatureStep {
    fn default() -> Self {
        Self {
            start: -55.0,
            stop: 175.0,
            incr: 10.0,
        }
    }
}

impl TemperatureStep {
    /// The stepped temperature values, in run order.
    pub fn values(&self) -> Vec<f64> {
        if self.incr <= 0.0 {
            return vec![self.start];
        }
        let mut out = Vec::new();
        let mut t = self.start;
        while t <= self.stop + self.incr * 0.5 {
            out.push(t);
            t += self.incr;
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub gate: GateSweep,
    pub temperature: Option<TemperatureStep>,
    /// Reference drain current of the fixed-current threshold definition.
    pub reference_current: f64,
    /// Temperature whose step supplies the scalar threshold figure.
    pub report_temperature: f64,
}

impl Default for SweepPlan {
    fn default() -> Self {
        Self {
            gate: GateSweep::default(),
            temperature: Some(TemperatureStep::default()),
            reference_current: 1e-3,
            report_temperature: 25.0,
        }
    }
}

impl SweepPlan {
    /// Simulation-control statements, in injection order. Order matters:
    /// a later `.options` card overrides an earlier one with the same
    /// effect, and the library include must precede the sweep.
    pub fn directives(&self, library_path: &Path) -> Vec<String> {
        let mut out = vec![format!(".lib \"{}\"", library_path.display())];
        out.push(format!(
            ".dc {} {} {} {}",
            self.gate.source, self.gate.start, self.gate.stop, self.gate.step
        ));
        if let Some(temp) = &self.temperature {
            out.push(format!(
                ".step temp {} {} {}",
                temp.start, temp.stop, temp.incr
            ));
        }
        out.push(".options plotwinsize=0".to_string());
        out
    }

    /// Index of the sweep step closest to the report temperature, clamped
    /// to the number of steps actually present in the waveform. Step 0 when
    /// the run was not temperature-stepped.
    pub fn report_step(&self, step_count: usize) -> usize {
        let Some(temp) = &self.temperature else {
            return 0;
        };
        if step_count == 0 {
            return 0;
        }
        let temps = temp.values();
        let mut best = 0usize;
        let mut best_dist = f64::INFINITY;
        for (idx, t) in temps.iter().enumerate().take(step_count) {
            let dist = (t - self.report_temperature).abs();
            if dist < best_dist {
                best = idx;
                best_dist = dist;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn directives_keep_injection_order() {
        let plan = SweepPlan::default();
        let lines = plan.directives(&PathBuf::from("/abs/models/a.lib"));
        assert_eq!(lines[0], ".lib \"/abs/models/a.lib\"");
        assert_eq!(lines[1], ".dc V1 0 5 0.05");
        assert_eq!(lines[2], ".step temp -55 175 10");
        assert_eq!(lines[3], ".options plotwinsize=0");
    }

    #[test]
    fn report_step_picks_nearest_temperature() {
        let plan = SweepPlan::default();
        // temps run -55, -45, ..., 25 lands on index 8
        assert_eq!(plan.report_step(24), 8);
    }

    #[test]
    fn report_step_clamps_to_available_steps() {
        let plan = SweepPlan::default();
        assert_eq!(plan.report_step(3), 2);
        assert_eq!(plan.report_step(0), 0);
    }

    #[test]
    fn report_step_without_temperature_sweep_is_zero() {
        let plan = SweepPlan {
            temperature: None,
            ..SweepPlan::default()
        };
        assert_eq!(plan.report_step(10), 0);
    }
}

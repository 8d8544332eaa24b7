use ndarray::{Array1, ArrayView1};
use crate::error::{ConcordanceError, Result};

/// one subject: observed time, event flag, model risk score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subject {
    pub time: f64,   // event time if event, censoring time otherwise
    pub event: bool, // true = event observed, false = censored
    pub risk: f64,   // higher risk should mean earlier event
}

impl Subject {
    pub fn new(time: f64, event: bool, risk: f64) -> Self {
        Self { time, event, risk }
    }
}

/// evaluation set - times, events, and risk scores
#[derive(Debug, Clone)]
pub struct SurvivalData {
    times: Array1<f64>,  // time to event/censoring
    events: Vec<bool>,   // true = event, false = censored
    risks: Array1<f64>,  // model output per subject
}

impl SurvivalData {
    /// make new survival data from raw vecs
    pub fn new(
        times: Vec<f64>,  // survival/censoring times
        events: Vec<bool>, // true = event occurred, false = censored
        risks: Vec<f64>,  // predicted risk scores
    ) -> Result<Self> {
        let n_samples = times.len();

        if events.len() != n_samples {
            return Err(ConcordanceError::invalid_input(
                format!("times len ({}) != events len ({})", n_samples, events.len())
            ));
        }

        if risks.len() != n_samples {
            return Err(ConcordanceError::invalid_input(
                format!("times len ({}) != risks len ({})", n_samples, risks.len())
            ));
        }

        if let Some(i) = times.iter().position(|&t| t < 0.0 || !t.is_finite()) {
            return Err(ConcordanceError::invalid_input(
                format!("time at index {} is {} - times must be nonnegative & finite", i, times[i])
            ));
        }

        if let Some(i) = risks.iter().position(|r| !r.is_finite()) {
            return Err(ConcordanceError::invalid_input(
                format!("risk at index {} is {} - risks must be finite", i, risks[i])
            ));
        }

        Ok(Self {
            times: Array1::from(times),
            events,
            risks: Array1::from(risks),
        })
    }

    /// build from subject records
    pub fn from_subjects(subjects: &[Subject]) -> Result<Self> {
        Self::new(
            subjects.iter().map(|s| s.time).collect(),
            subjects.iter().map(|s| s.event).collect(),
            subjects.iter().map(|s| s.risk).collect(),
        )
    }

    /// build from numeric event codes (0 = censored, 1 = event), as they come out of arrays/tensors
    pub fn from_event_codes(times: Vec<f64>, codes: &[f64], risks: Vec<f64>) -> Result<Self> {
        let events = codes
            .iter()
            .enumerate()
            .map(|(i, &code)| {
                if code == 1.0 {
                    Ok(true)
                } else if code == 0.0 {
                    Ok(false)
                } else {
                    Err(ConcordanceError::invalid_input(
                        format!("event code at index {} is {} - must be 0 or 1", i, code)
                    ))
                }
            })
            .collect::<Result<Vec<bool>>>()?;

        Self::new(times, events, risks)
    }

    /// how many subjects
    pub fn n_samples(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// how many observed events
    pub fn n_events(&self) -> usize {
        self.events.iter().filter(|&&e| e).count()
    }

    /// survival/censoring times
    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.times.view()
    }

    /// event indicators (true = event, false = censored)
    pub fn events(&self) -> &[bool] {
        &self.events
    }

    /// risk scores
    pub fn risks(&self) -> ArrayView1<'_, f64> {
        self.risks.view()
    }

    pub fn subject(&self, index: usize) -> Option<Subject> {
        if index >= self.n_samples() {
            return None;
        }
        Some(Subject::new(self.times[index], self.events[index], self.risks[index]))
    }

    pub fn iter(&self) -> impl Iterator<Item = Subject> + '_ {
        self.times
            .iter()
            .zip(self.events.iter())
            .zip(self.risks.iter())
            .map(|((&time, &event), &risk)| Subject::new(time, event, risk))
    }

    /// grab subjects by indices - repeats allowed, which is what resampling needs
    pub fn subset(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_samples()) {
            return Err(ConcordanceError::invalid_input(
                format!("subset index {} out of bounds for {} subjects", bad, self.n_samples())
            ));
        }

        // rows were validated on the way in
        Ok(Self {
            times: indices.iter().map(|&i| self.times[i]).collect(),
            events: indices.iter().map(|&i| self.events[i]).collect(),
            risks: indices.iter().map(|&i| self.risks[i]).collect(),
        })
    }

    /// flip risk sign - for models whose score means "longer survival"
    pub fn with_negated_risk(&self) -> Self {
        Self {
            times: self.times.clone(),
            events: self.events.clone(),
            risks: self.risks.mapv(|r| -r),
        }
    }
}

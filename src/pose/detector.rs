use serde::Serialize;

use crate::pose::error::PoseError;
use crate::pose::exercise::ExerciseKind;
use crate::pose::landmarks::LandmarkSet;
use crate::pose::tracker::{step, HysteresisRule, Phase, TrackerState};

/// Threshold rules per exercise; defaults are the built-in constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleSet {
    pub squat: HysteresisRule,
    pub push_up: HysteresisRule,
    pub bicep_curl: HysteresisRule,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            squat: HysteresisRule::for_exercise(ExerciseKind::Squat),
            push_up: HysteresisRule::for_exercise(ExerciseKind::PushUp),
            bicep_curl: HysteresisRule::for_exercise(ExerciseKind::BicepCurl),
        }
    }
}

impl RuleSet {
    pub fn rule(&self, kind: ExerciseKind) -> &HysteresisRule {
        match kind {
            ExerciseKind::Squat => &self.squat,
            ExerciseKind::PushUp => &self.push_up,
            ExerciseKind::BicepCurl => &self.bicep_curl,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub angle: f64,
    pub exercise: ExerciseKind,
    pub rep_count: u32,
    pub phase: Phase,
    pub rep_completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorSnapshot {
    pub rep_count: u32,
    pub phase: Phase,
    pub last_angle: Option<f64>,
    pub exercise: Option<ExerciseKind>,
}

/// Rep counter for one workout session.
///
/// The rep count, phase and baseline angle are shared across exercise kinds;
/// switching exercise mid-session does not reset them.
#[derive(Debug, Clone, Default)]
pub struct ExerciseDetector {
    state: TrackerState,
    rules: RuleSet,
    last_exercise: Option<ExerciseKind>,
}

impl ExerciseDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: RuleSet) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Measures the frame for `kind` and advances the phase machine.
    ///
    /// The new state is computed in full before it replaces the old one.
    pub fn analyze(&mut self, landmarks: &LandmarkSet, kind: ExerciseKind) -> Measurement {
        let rule = self.rules.rule(kind);
        let angle = rule.measure(landmarks);
        let transition = step(rule, &self.state, angle);

        self.state = transition.next;
        self.last_exercise = Some(kind);

        if transition.rep_completed {
            tracing::debug!(
                exercise = %kind,
                rep_count = self.state.rep_count,
                angle,
                "repetition completed"
            );
        }

        Measurement {
            angle,
            exercise: kind,
            rep_count: self.state.rep_count,
            phase: self.state.phase,
            rep_completed: transition.rep_completed,
        }
    }

    /// Like [`analyze`](Self::analyze) but takes the caller's raw exercise tag.
    /// An unknown tag fails before any state is touched.
    pub fn analyze_tag(
        &mut self,
        landmarks: &LandmarkSet,
        tag: Option<&str>,
    ) -> Result<Measurement, PoseError> {
        let kind = ExerciseKind::resolve(tag)?;
        Ok(self.analyze(landmarks, kind))
    }

    pub fn rep_count(&self) -> u32 {
        self.state.rep_count
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn previous_angle(&self) -> Option<f64> {
        self.state.previous_angle
    }

    pub fn last_exercise(&self) -> Option<ExerciseKind> {
        self.last_exercise
    }

    /// Clears the count, phase and baseline. Returns the new count.
    pub fn reset(&mut self) -> u32 {
        self.state = TrackerState::default();
        self.state.rep_count
    }

    pub fn snapshot(&self) -> DetectorSnapshot {
        DetectorSnapshot {
            rep_count: self.state.rep_count,
            phase: self.state.phase,
            last_angle: self.state.previous_angle,
            exercise: self.last_exercise,
        }
    }
}

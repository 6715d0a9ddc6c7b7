//! The exercise driver.
//!
//! Walks a student through an exercise one step at a time:
//! 1. **Stepping:** A forward-only cursor over the exercise's operations.
//! 2. **Grading:** Hit/miss and decomposition checks with a two-attempt rule.
//! 3. **Reports:** Whole-run execution for non-interactive use and answer-key validation.
//!
//! Grading uses the engine's pure queries (`probe`, `decompose`), so a wrong
//! answer costs an attempt but never disturbs the cache. The graded access
//! executes exactly once, when the step is committed.

use serde::Serialize;
use tracing::debug;

use crate::common::data::MemOp;
use crate::common::error::EngineError;
use crate::core::decoder::DecomposedAddress;
use crate::core::engine::{AccessOutcome, CacheEngine};
use crate::exercise::{Exercise, Step};
use crate::stats::CacheStats;

/// Answers allowed per step before the driver reveals the solution.
const MAX_ATTEMPTS: u32 = 2;

/// The driver's judgement of one submitted answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the answer was right.
    pub correct: bool,
    /// Whether the step was committed and the cursor moved on.
    pub advance: bool,
    /// Text to show the student.
    pub feedback: String,
    /// What the committed access did; `Some` exactly when `advance` is true.
    pub outcome: Option<AccessOutcome>,
}

/// What one committed step did, paired with the worksheet's expectation.
#[derive(Clone, Debug, Serialize)]
pub struct StepRecord {
    /// Zero-based step index.
    pub index: usize,
    /// The operation that ran.
    pub op: MemOp,
    /// The worksheet answer key for this step, if any.
    pub expected_hit: Option<bool>,
    /// What actually happened.
    pub outcome: AccessOutcome,
}

impl StepRecord {
    /// Whether the outcome agreed with the answer key; `None` without a key.
    pub fn matched(&self) -> Option<bool> {
        self.expected_hit.map(|expected| expected == self.outcome.hit)
    }
}

/// Result of running an exercise start to finish.
#[derive(Clone, Debug, Serialize)]
pub struct ExerciseReport {
    /// Name of the exercise that ran.
    pub exercise: String,
    /// One record per committed step, in order.
    pub records: Vec<StepRecord>,
    /// Dirty lines written back by the final flush.
    pub flushed: usize,
    /// Counters after the last step.
    pub stats: CacheStats,
}

impl ExerciseReport {
    /// True when no step contradicted the answer key.
    pub fn all_matched(&self) -> bool {
        self.records
            .iter()
            .all(|record| record.matched() != Some(false))
    }
}

/// Drives one student session over one exercise.
///
/// Owns its engine; construction configures the cache and loads the
/// exercise's memory image. Stepping is forward-only. `reset` rebuilds the
/// whole session, which is exact because the engine is deterministic.
#[derive(Debug)]
pub struct ExerciseDriver {
    engine: CacheEngine,
    exercise: Exercise,
    cursor: usize,
    attempts: u32,
}

impl ExerciseDriver {
    /// Builds a session for `exercise`.
    ///
    /// Fails if the exercise's geometry is invalid or its memory image
    /// contains an out-of-range address.
    pub fn new(exercise: Exercise) -> Result<Self, EngineError> {
        let mut engine = CacheEngine::new();
        engine.configure(exercise.geometry)?;
        engine.load_memory_image(&exercise.image_pairs())?;
        Ok(Self {
            engine,
            exercise,
            cursor: 0,
            attempts: 0,
        })
    }

    /// The exercise being driven.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// Read-only view of the session's engine, for snapshots and statistics.
    pub fn engine(&self) -> &CacheEngine {
        &self.engine
    }

    /// The step awaiting an answer, or `None` when finished.
    pub fn current(&self) -> Option<&Step> {
        self.exercise.steps.get(self.cursor)
    }

    /// Zero-based index of the current step.
    pub fn step_index(&self) -> usize {
        self.cursor
    }

    /// Number of steps in the exercise.
    pub fn total_steps(&self) -> usize {
        self.exercise.steps.len()
    }

    /// Whether every step has been committed.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.exercise.steps.len()
    }

    /// Grades a hit/miss prediction for the current step.
    ///
    /// Correct answers commit the step. Wrong answers cost an attempt; the
    /// second wrong answer reveals the truth, commits, and moves on.
    pub fn check_hit_miss(&mut self, answer: bool) -> Result<Verdict, EngineError> {
        let step = self.current_step()?;
        let would_hit = self.engine.probe(step.op.addr())?;

        if answer == would_hit {
            let outcome = self.commit()?;
            return Ok(Verdict {
                correct: true,
                advance: true,
                feedback: format!("correct, this access is a {}", hit_name(would_hit)),
                outcome: Some(outcome),
            });
        }

        self.attempts += 1;
        if self.attempts >= MAX_ATTEMPTS {
            let outcome = self.commit()?;
            Ok(Verdict {
                correct: false,
                advance: true,
                feedback: format!(
                    "incorrect, the answer was {}; moving to the next step",
                    hit_name(would_hit)
                ),
                outcome: Some(outcome),
            })
        } else {
            Ok(Verdict {
                correct: false,
                advance: false,
                feedback: format!(
                    "incorrect, try again (attempt {} of {MAX_ATTEMPTS})",
                    self.attempts
                ),
                outcome: None,
            })
        }
    }

    /// Grades an address decomposition for the current step.
    ///
    /// Same attempt rule as `check_hit_miss`; feedback names the fields that
    /// were wrong.
    pub fn check_decomposition(
        &mut self,
        answer: DecomposedAddress,
    ) -> Result<Verdict, EngineError> {
        let step = self.current_step()?;
        let correct = self.engine.decompose(step.op.addr())?;

        if answer == correct {
            let outcome = self.commit()?;
            return Ok(Verdict {
                correct: true,
                advance: true,
                feedback: "correct, all four fields match".to_owned(),
                outcome: Some(outcome),
            });
        }

        let mut wrong = Vec::new();
        if answer.tag != correct.tag {
            wrong.push("tag");
        }
        if answer.set_index != correct.set_index {
            wrong.push("set index");
        }
        if answer.block_offset != correct.block_offset {
            wrong.push("block offset");
        }
        if answer.byte_offset != correct.byte_offset {
            wrong.push("byte offset");
        }
        let wrong = wrong.join(", ");

        self.attempts += 1;
        if self.attempts >= MAX_ATTEMPTS {
            let outcome = self.commit()?;
            Ok(Verdict {
                correct: false,
                advance: true,
                feedback: format!("incorrect ({wrong}); moving to the next step"),
                outcome: Some(outcome),
            })
        } else {
            Ok(Verdict {
                correct: false,
                advance: false,
                feedback: format!(
                    "incorrect ({wrong}), try again (attempt {} of {MAX_ATTEMPTS})",
                    self.attempts
                ),
                outcome: None,
            })
        }
    }

    /// Executes the current step's operation and advances the cursor.
    pub fn commit(&mut self) -> Result<AccessOutcome, EngineError> {
        let step = self.current_step()?;
        let outcome = self.engine.access(step.op)?;
        debug!(
            "committed step {} of {}: {} ({})",
            self.cursor + 1,
            self.total_steps(),
            step.op,
            hit_name(outcome.hit)
        );
        self.cursor += 1;
        self.attempts = 0;
        Ok(outcome)
    }

    /// Commits every remaining step, flushes, and reports what happened.
    pub fn run_all(&mut self) -> Result<ExerciseReport, EngineError> {
        let mut records = Vec::with_capacity(self.total_steps() - self.cursor);
        while !self.is_finished() {
            let index = self.cursor;
            let expected_hit = self.exercise.steps[index].expected_hit;
            let op = self.exercise.steps[index].op;
            let outcome = self.commit()?;
            records.push(StepRecord {
                index,
                op,
                expected_hit,
                outcome,
            });
        }
        let flushed = self.engine.flush()?;
        let stats = self.engine.stats().unwrap_or_default();
        Ok(ExerciseReport {
            exercise: self.exercise.name.clone(),
            records,
            flushed,
            stats,
        })
    }

    /// Writes back any dirty lines, typically after the last step.
    pub fn flush(&mut self) -> Result<usize, EngineError> {
        self.engine.flush()
    }

    /// Restarts the session from step zero with a freshly built engine.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        *self = Self::new(self.exercise.clone())?;
        Ok(())
    }

    fn current_step(&self) -> Result<Step, EngineError> {
        self.current().cloned().ok_or(EngineError::IllegalOperation {
            reason: "the exercise is already finished",
        })
    }
}

/// Student-facing name for a hit/miss outcome.
fn hit_name(hit: bool) -> &'static str {
    if hit { "hit" } else { "miss" }
}

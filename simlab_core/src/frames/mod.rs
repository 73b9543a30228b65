//! # Frames
//!
//! A frame is one discrete state of the simulated patient: what the monitor
//! shows, what the operator does, what the learners are expected to do, and
//! where the scenario goes next. Frames are kept in authoring order and
//! linked by transitions into a directed graph keyed by [`FrameId`].
//!
//! ## Example
//!
//! ```rust
//! use simlab_core::frames::{Frame, FrameSequence, ParameterSet, Transition};
//!
//! let mut frames = FrameSequence::default();
//! let initial = frames.add(Frame::new("Initial assessment").with_duration(5));
//! let arrest = frames.add(
//!     Frame::new("Cardiac arrest").with_parameters(ParameterSet {
//!         heart_rate_bpm: Some(0),
//!         rhythm: Some("AESP".to_string()),
//!         ..Default::default()
//!     }),
//! );
//!
//! frames.add_transition(initial, Transition::new(arrest, "No airway support after 2 min")).unwrap();
//! assert_eq!(frames.len(), 2);
//! assert_eq!(frames.with_parameters_count(), 1);
//! ```

mod parameters;

pub use parameters::ParameterSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{SimError, SimResult};

/// Identifier of a frame, unique within its scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub u32);

impl FrameId {
    /// Parse `"F3"`, `"f3"` or `"3"`
    pub fn parse(raw: &str) -> SimResult<FrameId> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix('F')
            .or_else(|| trimmed.strip_prefix('f'))
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .map(FrameId)
            .map_err(|_| SimError::invalid_input("frame", raw, "Expected a frame id such as F3"))
    }
}

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// Directed edge from one frame to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Frame entered when the trigger fires
    pub target: FrameId,
    /// What triggers the transition (learner action, elapsed time, ...)
    #[serde(default)]
    pub trigger: String,
}

impl Transition {
    pub fn new(target: FrameId, trigger: impl Into<String>) -> Self {
        Transition {
            target,
            trigger: trigger.into(),
        }
    }
}

/// One step of the scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Assigned by [`FrameSequence::add`]; zero until the frame is inserted
    #[serde(default = "unassigned")]
    pub id: FrameId,

    pub title: String,

    /// Estimated duration in minutes
    #[serde(default)]
    pub duration_minutes: Option<u32>,

    #[serde(default)]
    pub parameters: Option<ParameterSet>,

    /// What the simulator operator does, in order
    #[serde(default)]
    pub operator_instructions: Vec<String>,

    /// What the learners are expected to do
    #[serde(default)]
    pub expected_actions: Vec<String>,

    #[serde(default)]
    pub transitions: Vec<Transition>,
}

fn unassigned() -> FrameId {
    FrameId(0)
}

impl Frame {
    pub fn new(title: impl Into<String>) -> Self {
        Frame {
            id: unassigned(),
            title: title.into(),
            duration_minutes: None,
            parameters: None,
            operator_instructions: Vec::new(),
            expected_actions: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_parameters(mut self, parameters: ParameterSet) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.operator_instructions.push(instruction.into());
        self
    }

    pub fn with_expected_action(mut self, action: impl Into<String>) -> Self {
        self.expected_actions.push(action.into());
        self
    }

    /// True when the frame carries a parameter set with at least one value
    pub fn has_parameters(&self) -> bool {
        self.parameters.as_ref().is_some_and(ParameterSet::is_populated)
    }
}

/// Ordered frame list with graph operations.
///
/// Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn as_slice(&self) -> &[Frame] {
        &self.frames
    }

    /// One past the highest id; the lowest free id once the highest is `u32::MAX`
    fn next_id(&self) -> FrameId {
        let max = self.frames.iter().map(|f| f.id.0).max().unwrap_or(0);
        match max.checked_add(1) {
            Some(next) => FrameId(next),
            None => (1..u32::MAX)
                .map(FrameId)
                .find(|id| self.index_of(*id).is_none())
                .unwrap_or(FrameId(0)),
        }
    }

    /// Check that every frame carries an assigned id and no id repeats.
    ///
    /// Frames deserialized without an id get the unassigned id 0.
    pub fn check_ids(&self) -> SimResult<()> {
        let mut seen = std::collections::BTreeSet::new();
        for frame in &self.frames {
            if frame.id == unassigned() {
                return Err(SimError::invalid_input(
                    "frames",
                    frame.title.as_str(),
                    "Frame has no id",
                ));
            }
            if !seen.insert(frame.id) {
                return Err(SimError::invalid_input(
                    "frames",
                    frame.id.to_string(),
                    "Frame id is used more than once",
                ));
            }
        }
        Ok(())
    }

    fn index_of(&self, id: FrameId) -> Option<usize> {
        self.frames.iter().position(|f| f.id == id)
    }

    fn require(&self, id: FrameId) -> SimResult<usize> {
        self.index_of(id).ok_or_else(|| SimError::not_found("Frame", id))
    }

    /// Append a frame, assigning it the next free id.
    pub fn add(&mut self, mut frame: Frame) -> FrameId {
        let id = self.next_id();
        frame.id = id;
        debug!(%id, title = %frame.title, "frame added");
        self.frames.push(frame);
        id
    }

    pub fn get(&self, id: FrameId) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: FrameId) -> Option<&mut Frame> {
        self.frames.iter_mut().find(|f| f.id == id)
    }

    /// Remove a frame and every transition that pointed at it.
    pub fn remove(&mut self, id: FrameId) -> Option<Frame> {
        let index = self.index_of(id)?;
        let removed = self.frames.remove(index);
        for frame in &mut self.frames {
            frame.transitions.retain(|t| t.target != id);
        }
        debug!(%id, "frame removed");
        Some(removed)
    }

    /// Move a frame to `index` (clamped to the end of the list).
    pub fn move_to(&mut self, id: FrameId, index: usize) -> SimResult<()> {
        let from = self.require(id)?;
        let frame = self.frames.remove(from);
        let to = index.min(self.frames.len());
        self.frames.insert(to, frame);
        Ok(())
    }

    /// Copy a frame (with its outgoing transitions) to the end of the list.
    pub fn duplicate(&mut self, id: FrameId) -> SimResult<FrameId> {
        let index = self.require(id)?;
        let mut copy = self.frames[index].clone();
        copy.title = format!("{} (copy)", copy.title);
        Ok(self.add(copy))
    }

    /// Add a transition from `from`.
    ///
    /// Both ends must exist and a frame cannot transition to itself. Adding a
    /// transition to a target that is already linked replaces its trigger.
    pub fn add_transition(&mut self, from: FrameId, transition: Transition) -> SimResult<()> {
        self.require(transition.target)?;
        if transition.target == from {
            return Err(SimError::invalid_input(
                "transition.target",
                transition.target.to_string(),
                "A frame cannot transition to itself",
            ));
        }
        let index = self.require(from)?;
        let frame = &mut self.frames[index];
        match frame.transitions.iter_mut().find(|t| t.target == transition.target) {
            Some(existing) => existing.trigger = transition.trigger,
            None => frame.transitions.push(transition),
        }
        Ok(())
    }

    /// Remove the transition `from -> to`; returns whether one existed.
    pub fn remove_transition(&mut self, from: FrameId, to: FrameId) -> bool {
        match self.get_mut(from) {
            Some(frame) => {
                let before = frame.transitions.len();
                frame.transitions.retain(|t| t.target != to);
                frame.transitions.len() != before
            }
            None => false,
        }
    }

    /// Frames whose parameter set is populated
    pub fn with_parameters_count(&self) -> usize {
        self.frames.iter().filter(|f| f.has_parameters()).count()
    }

    /// Transitions whose target does not exist, as `(from, to)` pairs.
    ///
    /// Only reachable through deserialized data; the mutators never create them.
    pub fn dangling_transitions(&self) -> Vec<(FrameId, FrameId)> {
        self.frames
            .iter()
            .flat_map(|f| f.transitions.iter().map(move |t| (f.id, t.target)))
            .filter(|(_, to)| self.index_of(*to).is_none())
            .collect()
    }

    /// Sum of the frames' estimated durations, ignoring frames without one
    pub fn total_duration_minutes(&self) -> u32 {
        self.frames.iter().filter_map(|f| f.duration_minutes).sum()
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vitals() -> ParameterSet {
        ParameterSet {
            heart_rate_bpm: Some(130),
            ..Default::default()
        }
    }

    #[test]
    fn test_frame_id_parse() {
        assert_eq!(FrameId::parse("F3").unwrap(), FrameId(3));
        assert_eq!(FrameId::parse(" f12 ").unwrap(), FrameId(12));
        assert_eq!(FrameId::parse("7").unwrap(), FrameId(7));
        assert!(FrameId::parse("frame").is_err());
    }

    #[test]
    fn test_ids_are_assigned_sequentially() {
        let mut frames = FrameSequence::default();
        assert_eq!(frames.add(Frame::new("A")), FrameId(1));
        assert_eq!(frames.add(Frame::new("B")), FrameId(2));
        frames.remove(FrameId(2));
        // Next id is one past the current highest, so removing the highest frame frees its id
        assert_eq!(frames.add(Frame::new("C")), FrameId(2));
    }

    #[test]
    fn test_remove_drops_inbound_transitions() {
        let mut frames = FrameSequence::default();
        let a = frames.add(Frame::new("A"));
        let b = frames.add(Frame::new("B"));
        let c = frames.add(Frame::new("C"));
        frames.add_transition(a, Transition::new(b, "improves")).unwrap();
        frames.add_transition(a, Transition::new(c, "worsens")).unwrap();

        assert!(frames.remove(b).is_some());
        let a_frame = frames.get(a).unwrap();
        assert_eq!(a_frame.transitions, vec![Transition::new(c, "worsens")]);
        assert!(frames.dangling_transitions().is_empty());
    }

    #[test]
    fn test_add_transition_requires_both_ends() {
        let mut frames = FrameSequence::default();
        let a = frames.add(Frame::new("A"));

        let err = frames.add_transition(a, Transition::new(FrameId(9), "x")).unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");

        let err = frames.add_transition(a, Transition::new(a, "loop")).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_add_transition_replaces_trigger() {
        let mut frames = FrameSequence::default();
        let a = frames.add(Frame::new("A"));
        let b = frames.add(Frame::new("B"));
        frames.add_transition(a, Transition::new(b, "after 2 min")).unwrap();
        frames.add_transition(a, Transition::new(b, "after 3 min")).unwrap();
        let transitions = &frames.get(a).unwrap().transitions;
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].trigger, "after 3 min");

        assert!(frames.remove_transition(a, b));
        assert!(!frames.remove_transition(a, b));
    }

    #[test]
    fn test_move_and_duplicate() {
        let mut frames = FrameSequence::default();
        let a = frames.add(Frame::new("A"));
        let b = frames.add(Frame::new("B"));
        frames.move_to(b, 0).unwrap();
        let order: Vec<FrameId> = frames.iter().map(|f| f.id).collect();
        assert_eq!(order, vec![b, a]);

        let copy = frames.duplicate(a).unwrap();
        assert_eq!(frames.get(copy).unwrap().title, "A (copy)");
        assert!(frames.move_to(FrameId(42), 0).is_err());
    }

    #[test]
    fn test_parameter_counts_and_duration() {
        let mut frames = FrameSequence::default();
        frames.add(Frame::new("A").with_parameters(vitals()).with_duration(5));
        frames.add(Frame::new("B").with_parameters(ParameterSet::default()).with_duration(3));
        frames.add(Frame::new("C"));
        assert_eq!(frames.with_parameters_count(), 1);
        assert_eq!(frames.total_duration_minutes(), 8);
    }

    #[test]
    fn test_check_ids_rejects_missing_and_repeated() {
        let missing: FrameSequence =
            serde_json::from_str(r#"[{"title": "A"}, {"title": "B", "transitions": [{"target": 0}]}]"#).unwrap();
        assert_eq!(missing.check_ids().unwrap_err().error_code(), "INVALID_INPUT");

        let repeated: FrameSequence =
            serde_json::from_str(r#"[{"id": 2, "title": "A"}, {"id": 2, "title": "B"}]"#).unwrap();
        assert!(repeated.check_ids().is_err());

        let mut fine = FrameSequence::default();
        fine.add(Frame::new("A"));
        fine.add(Frame::new("B"));
        assert!(fine.check_ids().is_ok());
    }

    #[test]
    fn test_add_after_max_id_does_not_overflow() {
        let mut frames: FrameSequence =
            serde_json::from_str(r#"[{"id": 4294967295, "title": "Last"}]"#).unwrap();
        assert_eq!(frames.add(Frame::new("Next")), FrameId(1));
        assert_eq!(frames.add(Frame::new("Then")), FrameId(2));
        assert!(frames.check_ids().is_ok());
    }

    #[test]
    fn test_dangling_transitions_from_json() {
        let json = r#"[
            {"id": 1, "title": "A", "transitions": [{"target": 2}, {"target": 5}]},
            {"id": 2, "title": "B"}
        ]"#;
        let frames: FrameSequence = serde_json::from_str(json).unwrap();
        assert_eq!(frames.dangling_transitions(), vec![(FrameId(1), FrameId(5))]);
    }
}

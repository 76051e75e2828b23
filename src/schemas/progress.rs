use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{ProgressRoot, QuestionProgress};
use crate::db::types::{AggregateLevel, ProgressMode, ProgressSource};

/// Full progress tree of one (user, course, mode) root. Quiz trees nest
/// chapters and subtopics under `nodes`; test trees keep every question in
/// the top-level `questions` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ProgressTree {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) mode: ProgressMode,
    pub(crate) total_questions: i32,
    pub(crate) attempted_questions: i32,
    pub(crate) flagged_count: i32,
    pub(crate) skipped_count: i32,
    pub(crate) correct_count: i32,
    pub(crate) last_viewed_question: Option<String>,
    pub(crate) is_submitted: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
    #[serde(default)]
    pub(crate) nodes: Vec<ProgressNode>,
    #[serde(default)]
    pub(crate) questions: Vec<QuestionProgressEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ProgressNode {
    pub(crate) id: String,
    pub(crate) level: AggregateLevel,
    pub(crate) entity_id: String,
    pub(crate) attempted_questions: i32,
    #[serde(default)]
    pub(crate) nodes: Vec<ProgressNode>,
    #[serde(default)]
    pub(crate) questions: Vec<QuestionProgressEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct QuestionProgressEntry {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) selected_option: Option<i16>,
    pub(crate) is_flagged: bool,
}

impl QuestionProgressEntry {
    pub(crate) fn from_db(question: &QuestionProgress) -> Self {
        Self {
            id: question.id.clone(),
            question_id: question.question_id.clone(),
            selected_option: question.selected_option,
            is_flagged: question.is_flagged,
        }
    }
}

impl ProgressTree {
    /// Root fields only; callers attach `nodes` and `questions`.
    pub(crate) fn from_root(root: &ProgressRoot) -> Self {
        Self {
            id: root.id.clone(),
            course_id: root.course_id.clone(),
            mode: root.mode,
            total_questions: root.total_questions,
            attempted_questions: root.attempted_questions,
            flagged_count: root.flagged_count,
            skipped_count: root.skipped_count,
            correct_count: root.correct_count,
            last_viewed_question: root.last_viewed_question_id.clone(),
            is_submitted: root.is_submitted,
            created_at: format_primitive(root.created_at),
            updated_at: format_primitive(root.updated_at),
            nodes: Vec::new(),
            questions: Vec::new(),
        }
    }

    /// Every leaf of the tree in display order.
    pub(crate) fn leaves(&self) -> Vec<&QuestionProgressEntry> {
        let mut leaves = Vec::with_capacity(usize::try_from(self.total_questions).unwrap_or(0));
        for node in &self.nodes {
            node.collect_leaves(&mut leaves);
        }
        leaves.extend(self.questions.iter());
        leaves
    }

    /// First counter identity the tree breaks, if any.
    pub(crate) fn find_inconsistency(&self) -> Option<String> {
        let leaves = self.leaves();
        let attempted = count_attempted(&leaves);
        let flagged = leaves.iter().filter(|leaf| leaf.is_flagged).count();

        if !counter_matches(self.total_questions, leaves.len()) {
            return Some(format!(
                "total_questions is {} but the tree holds {} questions",
                self.total_questions,
                leaves.len()
            ));
        }
        if self.attempted_questions + self.skipped_count != self.total_questions {
            return Some(format!(
                "attempted ({}) + skipped ({}) != total ({})",
                self.attempted_questions, self.skipped_count, self.total_questions
            ));
        }
        if !counter_matches(self.attempted_questions, attempted) {
            return Some(format!(
                "attempted_questions is {} but {} questions are answered",
                self.attempted_questions, attempted
            ));
        }
        if !counter_matches(self.flagged_count, flagged) {
            return Some(format!(
                "flagged_count is {} but {} questions are flagged",
                self.flagged_count, flagged
            ));
        }
        if self.correct_count < 0 || self.correct_count > self.attempted_questions {
            return Some(format!(
                "correct_count {} is outside 0..={}",
                self.correct_count, self.attempted_questions
            ));
        }
        self.nodes.iter().find_map(ProgressNode::find_inconsistency)
    }
}

fn count_attempted(leaves: &[&QuestionProgressEntry]) -> usize {
    leaves.iter().filter(|leaf| leaf.selected_option.is_some()).count()
}

/// A negative counter never matches a leaf count.
fn counter_matches(counter: i32, count: usize) -> bool {
    usize::try_from(counter).is_ok_and(|counter| counter == count)
}

impl ProgressNode {
    pub(crate) fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a QuestionProgressEntry>) {
        for child in &self.nodes {
            child.collect_leaves(out);
        }
        out.extend(self.questions.iter());
    }

    fn find_inconsistency(&self) -> Option<String> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        let attempted = count_attempted(&leaves);
        if !counter_matches(self.attempted_questions, attempted) {
            return Some(format!(
                "{:?} {} reports {} attempted but {} questions below it are answered",
                self.level, self.entity_id, self.attempted_questions, attempted
            ));
        }
        self.nodes.iter().find_map(ProgressNode::find_inconsistency)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProgressQuery {
    #[serde(default)]
    pub(crate) source: ProgressSource,
}

/// Missing `selected_option` means the question is left unanswered.
#[derive(Debug, Deserialize)]
pub(crate) struct UpdateQuestionRequest {
    /// Any integer; the engine rejects values outside 0..=3.
    #[serde(default)]
    pub(crate) selected_option: Option<i64>,
    #[serde(default)]
    pub(crate) is_flagged: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionUpdateResponse {
    pub(crate) status: String,
    pub(crate) attempted_questions: i32,
    pub(crate) flagged_count: i32,
    pub(crate) skipped_count: i32,
    pub(crate) correct_count: i32,
    pub(crate) last_viewed_question: Option<String>,
}

impl QuestionUpdateResponse {
    pub(crate) fn from_root(root: &ProgressRoot) -> Self {
        Self {
            status: "progress updated".to_string(),
            attempted_questions: root.attempted_questions,
            flagged_count: root.flagged_count,
            skipped_count: root.skipped_count,
            correct_count: root.correct_count,
            last_viewed_question: root.last_viewed_question_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusResponse {
    pub(crate) status: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionStatusResponse {
    pub(crate) course_id: String,
    pub(crate) mode: ProgressMode,
    pub(crate) is_submitted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, selected_option: Option<i16>) -> QuestionProgressEntry {
        QuestionProgressEntry {
            id: format!("leaf-{id}"),
            question_id: id.to_string(),
            selected_option,
            is_flagged: false,
        }
    }

    fn quiz_tree() -> ProgressTree {
        ProgressTree {
            id: "root".to_string(),
            course_id: "course".to_string(),
            mode: ProgressMode::Quiz,
            total_questions: 3,
            attempted_questions: 0,
            flagged_count: 0,
            skipped_count: 3,
            correct_count: 0,
            last_viewed_question: None,
            is_submitted: false,
            created_at: String::new(),
            updated_at: String::new(),
            nodes: vec![ProgressNode {
                id: "c1".to_string(),
                level: AggregateLevel::Chapter,
                entity_id: "chapter-1".to_string(),
                attempted_questions: 0,
                nodes: vec![
                    ProgressNode {
                        id: "s1".to_string(),
                        level: AggregateLevel::Subtopic,
                        entity_id: "subtopic-1".to_string(),
                        attempted_questions: 0,
                        nodes: Vec::new(),
                        questions: vec![entry("q1", None), entry("q2", None)],
                    },
                    ProgressNode {
                        id: "s2".to_string(),
                        level: AggregateLevel::Subtopic,
                        entity_id: "subtopic-2".to_string(),
                        attempted_questions: 0,
                        nodes: Vec::new(),
                        questions: vec![entry("q3", None)],
                    },
                ],
                questions: Vec::new(),
            }],
            questions: Vec::new(),
        }
    }

    #[test]
    fn leaves_walk_nodes_depth_first() {
        let tree = quiz_tree();
        let ids: Vec<&str> = tree.leaves().iter().map(|leaf| leaf.question_id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn fresh_tree_is_consistent() {
        assert_eq!(quiz_tree().find_inconsistency(), None);
    }

    #[test]
    fn negative_counters_never_match_leaf_counts() {
        let mut tree = quiz_tree();
        tree.flagged_count = -1;
        let problem = tree.find_inconsistency().expect("negative flagged count");
        assert!(problem.contains("flagged_count is -1"), "problem: {problem}");
        assert!(!counter_matches(-1, 0));
        assert!(counter_matches(3, 3));
    }

    #[test]
    fn detects_aggregate_drift() {
        let mut tree = quiz_tree();
        tree.nodes[0].nodes[0].questions[0].selected_option = Some(1);
        tree.attempted_questions = 1;
        tree.skipped_count = 2;
        let problem = tree.find_inconsistency().expect("subtopic count is stale");
        assert!(problem.contains("chapter-1"), "problem: {problem}");

        tree.nodes[0].attempted_questions = 1;
        tree.nodes[0].nodes[0].attempted_questions = 1;
        assert_eq!(tree.find_inconsistency(), None);
    }

    #[test]
    fn detects_broken_partition() {
        let mut tree = quiz_tree();
        tree.skipped_count = 2;
        let problem = tree.find_inconsistency().expect("partition broken");
        assert!(problem.contains("skipped"), "problem: {problem}");
    }

    #[test]
    fn update_request_defaults_to_unanswered_and_unflagged() {
        let request: UpdateQuestionRequest =
            serde_json::from_value(serde_json::json!({})).expect("payload");
        assert_eq!(request.selected_option, None);
        assert!(!request.is_flagged);

        let request: UpdateQuestionRequest =
            serde_json::from_value(serde_json::json!({"selected_option": 2, "is_flagged": true}))
                .expect("payload");
        assert_eq!(request.selected_option, Some(2));
        assert!(request.is_flagged);
    }
}

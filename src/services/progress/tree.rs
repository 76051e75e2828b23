use std::collections::HashMap;

use crate::db::models::{ProgressAggregate, ProgressRoot, QuestionProgress};
use crate::schemas::progress::{ProgressNode, ProgressTree, QuestionProgressEntry};

type Children<'a> = HashMap<Option<&'a str>, Vec<&'a ProgressAggregate>>;
type Leaves<'a> = HashMap<Option<&'a str>, Vec<QuestionProgressEntry>>;

/// Rebuilds the nested tree from flat rows. Rows must come ordered by
/// position; sibling order is preserved.
pub(crate) fn assemble(
    root: &ProgressRoot,
    aggregates: &[ProgressAggregate],
    questions: &[QuestionProgress],
) -> ProgressTree {
    let mut children: Children<'_> = HashMap::new();
    for aggregate in aggregates {
        children.entry(aggregate.parent_id.as_deref()).or_default().push(aggregate);
    }

    let mut leaves: Leaves<'_> = HashMap::new();
    for question in questions {
        leaves
            .entry(question.aggregate_id.as_deref())
            .or_default()
            .push(QuestionProgressEntry::from_db(question));
    }

    let mut tree = ProgressTree::from_root(root);
    tree.nodes = build_nodes(None, &children, &mut leaves);
    tree.questions = leaves.remove(&None).unwrap_or_default();
    tree
}

fn build_nodes<'a>(
    parent_id: Option<&'a str>,
    children: &Children<'a>,
    leaves: &mut Leaves<'a>,
) -> Vec<ProgressNode> {
    let Some(siblings) = children.get(&parent_id) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(siblings.len());
    for aggregate in siblings {
        let id = Some(aggregate.id.as_str());
        nodes.push(ProgressNode {
            id: aggregate.id.clone(),
            level: aggregate.level,
            entity_id: aggregate.entity_id.clone(),
            attempted_questions: aggregate.attempted_questions,
            nodes: build_nodes(id, children, leaves),
            questions: leaves.remove(&id).unwrap_or_default(),
        });
    }
    nodes
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::db::types::{AggregateLevel, ProgressMode};

    fn root(mode: ProgressMode, total: i32) -> ProgressRoot {
        ProgressRoot {
            id: "root".to_string(),
            user_id: "user".to_string(),
            course_id: "course".to_string(),
            mode,
            total_questions: total,
            attempted_questions: 1,
            flagged_count: 0,
            skipped_count: total - 1,
            correct_count: 1,
            last_viewed_question_id: Some("q-2".to_string()),
            is_submitted: false,
            created_at: datetime!(2025-03-01 09:00:00),
            updated_at: datetime!(2025-03-01 09:05:00),
        }
    }

    fn aggregate(
        id: &str,
        parent: Option<&str>,
        level: AggregateLevel,
        position: i32,
        attempted: i32,
    ) -> ProgressAggregate {
        ProgressAggregate {
            id: id.to_string(),
            root_id: "root".to_string(),
            parent_id: parent.map(str::to_string),
            level,
            entity_id: format!("entity-{id}"),
            position,
            attempted_questions: attempted,
        }
    }

    fn leaf(
        question_id: &str,
        aggregate: Option<&str>,
        position: i32,
        selected: Option<i16>,
    ) -> QuestionProgress {
        QuestionProgress {
            id: format!("leaf-{question_id}"),
            root_id: "root".to_string(),
            aggregate_id: aggregate.map(str::to_string),
            question_id: question_id.to_string(),
            position,
            selected_option: selected,
            is_flagged: false,
        }
    }

    #[test]
    fn nests_quiz_rows_under_their_aggregates() {
        let aggregates = vec![
            aggregate("ch-a", None, AggregateLevel::Chapter, 0, 1),
            aggregate("st-a", Some("ch-a"), AggregateLevel::Subtopic, 1, 1),
            aggregate("st-b", Some("ch-a"), AggregateLevel::Subtopic, 2, 0),
            aggregate("ch-b", None, AggregateLevel::Chapter, 3, 0),
        ];
        let questions = vec![
            leaf("q-1", Some("st-a"), 0, None),
            leaf("q-2", Some("st-a"), 1, Some(1)),
            leaf("q-3", Some("st-b"), 2, None),
        ];

        let tree = assemble(&root(ProgressMode::Quiz, 3), &aggregates, &questions);

        assert_eq!(tree.nodes.len(), 2);
        assert!(tree.questions.is_empty());
        let chapter = &tree.nodes[0];
        assert_eq!(chapter.entity_id, "entity-ch-a");
        assert_eq!(chapter.nodes.len(), 2);
        let ids: Vec<&str> =
            chapter.nodes[0].questions.iter().map(|entry| entry.question_id.as_str()).collect();
        assert_eq!(ids, vec!["q-1", "q-2"]);
        assert_eq!(chapter.nodes[1].questions.len(), 1);
        assert!(tree.nodes[1].nodes.is_empty());
        assert_eq!(tree.last_viewed_question.as_deref(), Some("q-2"));
        assert_eq!(tree.find_inconsistency(), None);
    }

    #[test]
    fn test_rows_stay_flat() {
        let questions = vec![leaf("q-1", None, 0, Some(0)), leaf("q-2", None, 1, None)];

        let tree = assemble(&root(ProgressMode::Test, 2), &[], &questions);

        assert!(tree.nodes.is_empty());
        assert_eq!(tree.questions.len(), 2);
        assert_eq!(tree.questions[0].selected_option, Some(0));
        assert_eq!(tree.created_at, "2025-03-01T09:00:00Z");
    }
}

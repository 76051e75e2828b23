use std::collections::HashMap;

use thiserror::Error;

use crate::db::types::AggregateLevel;
use crate::repositories::catalog::{ChapterRow, QuestionRow, SubtopicRow};

/// One catalog node with every level present, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OutlineNode {
    pub(crate) level: AggregateLevel,
    pub(crate) entity_id: String,
    pub(crate) children: Vec<OutlineNode>,
    pub(crate) questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlannedAggregate {
    pub(crate) id: String,
    pub(crate) parent_id: Option<String>,
    pub(crate) level: AggregateLevel,
    pub(crate) entity_id: String,
    pub(crate) position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlannedQuestion {
    pub(crate) id: String,
    pub(crate) aggregate_id: Option<String>,
    pub(crate) question_id: String,
    pub(crate) position: i32,
}

/// Rows to insert for a new progress tree. Aggregates are ordered parents
/// first; positions follow catalog order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct TreePlan {
    pub(crate) aggregates: Vec<PlannedAggregate>,
    pub(crate) questions: Vec<PlannedQuestion>,
}

/// The outline has more rows than the `INTEGER` position and counter
/// columns can address.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("course outline is too large to track: {0} rows")]
pub(crate) struct OutlineTooLarge(pub(crate) usize);

impl TreePlan {
    pub(crate) fn total_questions(&self) -> Result<i32, OutlineTooLarge> {
        position(self.questions.len())
    }
}

fn position(index: usize) -> Result<i32, OutlineTooLarge> {
    i32::try_from(index).map_err(|_| OutlineTooLarge(index))
}

pub(crate) fn outline_from_rows(
    chapters: &[ChapterRow],
    subtopics: &[SubtopicRow],
    questions: &[QuestionRow],
) -> Vec<OutlineNode> {
    let mut questions_by_subtopic: HashMap<&str, Vec<String>> = HashMap::new();
    for question in questions {
        questions_by_subtopic
            .entry(question.subtopic_id.as_str())
            .or_default()
            .push(question.id.clone());
    }

    let mut subtopics_by_chapter: HashMap<&str, Vec<OutlineNode>> = HashMap::new();
    for subtopic in subtopics {
        subtopics_by_chapter.entry(subtopic.chapter_id.as_str()).or_default().push(OutlineNode {
            level: AggregateLevel::Subtopic,
            entity_id: subtopic.id.clone(),
            children: Vec::new(),
            questions: questions_by_subtopic.remove(subtopic.id.as_str()).unwrap_or_default(),
        });
    }

    chapters
        .iter()
        .map(|chapter| OutlineNode {
            level: AggregateLevel::Chapter,
            entity_id: chapter.id.clone(),
            children: subtopics_by_chapter.remove(chapter.id.as_str()).unwrap_or_default(),
            questions: Vec::new(),
        })
        .collect()
}

/// Projects the outline onto the levels a mode tracks. A node whose level is
/// not tracked produces no aggregate; its children and questions attach to
/// the nearest tracked ancestor, or to the root when there is none.
pub(crate) fn plan(
    outline: &[OutlineNode],
    levels: &[AggregateLevel],
    mut new_id: impl FnMut() -> String,
) -> Result<TreePlan, OutlineTooLarge> {
    let mut plan = TreePlan::default();
    visit(outline, None, levels, &mut plan, &mut new_id)?;
    Ok(plan)
}

fn visit(
    nodes: &[OutlineNode],
    parent_id: Option<&str>,
    levels: &[AggregateLevel],
    plan: &mut TreePlan,
    new_id: &mut impl FnMut() -> String,
) -> Result<(), OutlineTooLarge> {
    for node in nodes {
        if levels.contains(&node.level) {
            let id = new_id();
            plan.aggregates.push(PlannedAggregate {
                id: id.clone(),
                parent_id: parent_id.map(str::to_string),
                level: node.level,
                entity_id: node.entity_id.clone(),
                position: position(plan.aggregates.len())?,
            });
            visit(&node.children, Some(&id), levels, plan, new_id)?;
            push_questions(&node.questions, Some(&id), plan, new_id)?;
        } else {
            visit(&node.children, parent_id, levels, plan, new_id)?;
            push_questions(&node.questions, parent_id, plan, new_id)?;
        }
    }
    Ok(())
}

fn push_questions(
    question_ids: &[String],
    aggregate_id: Option<&str>,
    plan: &mut TreePlan,
    new_id: &mut impl FnMut() -> String,
) -> Result<(), OutlineTooLarge> {
    for question_id in question_ids {
        plan.questions.push(PlannedQuestion {
            id: new_id(),
            aggregate_id: aggregate_id.map(str::to_string),
            question_id: question_id.clone(),
            position: position(plan.questions.len())?,
        });
    }
    Ok(())
}

mod commands;
mod queries;
mod types;

pub(crate) use commands::{
    apply_root_delta, delete_root, insert_aggregate, insert_question, insert_root_if_absent,
    mark_submitted, reset_aggregates, reset_questions, reset_root, set_question_state,
    shift_aggregate_chain,
};
pub(crate) use queries::{
    find_question_for_update, find_root, find_root_for_update, list_aggregates, list_questions,
};
pub(crate) use types::{CreateAggregate, CreateQuestion, CreateRoot, RootDelta};

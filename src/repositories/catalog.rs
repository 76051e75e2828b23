use crate::db::models::Course;

const COURSE_COLUMNS: &str = "id, name, created_at, updated_at";

/// Catalog coordinates of a question: course, chapter and subtopic it sits
/// under, plus its answer key.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct QuestionRef {
    pub(crate) course_id: String,
    pub(crate) chapter_id: String,
    pub(crate) subtopic_id: String,
    pub(crate) correct_option: i16,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ChapterRow {
    pub(crate) id: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SubtopicRow {
    pub(crate) id: String,
    pub(crate) chapter_id: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct QuestionRow {
    pub(crate) id: String,
    pub(crate) subtopic_id: String,
}

pub(crate) async fn find_course(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn list_chapters(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<Vec<ChapterRow>, sqlx::Error> {
    sqlx::query_as::<_, ChapterRow>(
        "SELECT id
         FROM chapters
         WHERE course_id = $1
         ORDER BY position, created_at, id",
    )
    .bind(course_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_subtopics(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<Vec<SubtopicRow>, sqlx::Error> {
    sqlx::query_as::<_, SubtopicRow>(
        "SELECT s.id, s.chapter_id
         FROM subtopics s
         JOIN chapters c ON c.id = s.chapter_id
         WHERE c.course_id = $1
         ORDER BY s.position, s.created_at, s.id",
    )
    .bind(course_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_questions(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<Vec<QuestionRow>, sqlx::Error> {
    sqlx::query_as::<_, QuestionRow>(
        "SELECT q.id, q.subtopic_id
         FROM questions q
         JOIN subtopics s ON s.id = q.subtopic_id
         JOIN chapters c ON c.id = s.chapter_id
         WHERE c.course_id = $1
         ORDER BY q.position, q.created_at, q.id",
    )
    .bind(course_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn resolve_question(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: &str,
) -> Result<Option<QuestionRef>, sqlx::Error> {
    sqlx::query_as::<_, QuestionRef>(
        "SELECT c.course_id, s.chapter_id, q.subtopic_id, q.correct_option
         FROM questions q
         JOIN subtopics s ON s.id = q.subtopic_id
         JOIN chapters c ON c.id = s.chapter_id
         WHERE q.id = $1",
    )
    .bind(question_id)
    .fetch_optional(executor)
    .await
}

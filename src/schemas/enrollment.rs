use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Enrollment;
use crate::db::types::EnrollmentStatus;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct EnrollRequest {
    #[validate(length(min = 1, max = 64))]
    pub(crate) course_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnrollmentUpdate {
    pub(crate) status: EnrollmentStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollmentResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) status: EnrollmentStatus,
    pub(crate) enrolled_at: String,
    pub(crate) updated_at: String,
}

impl EnrollmentResponse {
    pub(crate) fn from_db(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id,
            course_id: enrollment.course_id,
            status: enrollment.status,
            enrolled_at: format_primitive(enrollment.enrolled_at),
            updated_at: format_primitive(enrollment.updated_at),
        }
    }
}

pub mod common;

pub mod m202510010001_create_users;
pub mod m202510010002_create_subjects;
pub mod m202510010003_create_profiles;
pub mod m202510010004_create_courses;
pub mod m202510010005_create_course_enrollments;
pub mod m202510010006_create_assessments;
pub mod m202510010007_create_student_answers;
pub mod m202510010008_create_assignments;
pub mod m202510010009_create_assignment_submissions;
pub mod m202510010010_create_system_settings;
pub mod m202510010011_create_accessibility_preferences;
pub mod m202510080001_add_assessment_questions_file;
pub mod m202510080002_add_student_answer_file_and_ai_detection;
pub mod m202510080003_add_assignment_files_and_ai_detection;
pub mod m202510120001_create_exams;
pub mod m202510120002_create_exam_attempts;
pub mod m202510150001_add_teacher_approval_status;
pub mod m202510150002_add_enrollment_approved_at;
pub mod m202510180001_add_submission_unique_indexes;

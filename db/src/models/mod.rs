pub mod accessibility_preference;
pub mod ai_detection;
pub mod assessment;
pub mod assignment;
pub mod assignment_submission;
pub mod course;
pub mod course_enrollment;
pub mod exam;
pub mod exam_attempt;
pub mod student_answer;
pub mod student_profile;
pub mod subject;
pub mod system_setting;
pub mod teacher_profile;
pub mod user;

pub use accessibility_preference::Entity as AccessibilityPreference;
pub use assessment::Entity as Assessment;
pub use assignment::Entity as Assignment;
pub use assignment_submission::Entity as AssignmentSubmission;
pub use course::Entity as Course;
pub use course_enrollment::Entity as CourseEnrollment;
pub use exam::Entity as Exam;
pub use exam_attempt::Entity as ExamAttempt;
pub use student_answer::Entity as StudentAnswer;
pub use student_profile::Entity as StudentProfile;
pub use subject::Entity as Subject;
pub use system_setting::Entity as SystemSetting;
pub use teacher_profile::Entity as TeacherProfile;
pub use user::Entity as User;

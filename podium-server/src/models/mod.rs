//! Row models and request/response DTOs
//!
//! Row structs mirror the SQLite tables (`FromRow`); response structs are
//! what the API serializes inside the `{ "data": ... }` envelope.

pub mod avatar;
pub mod feedback;
pub mod learning;
pub mod presentation;
pub mod user;

pub use avatar::{Avatar, AvatarResponse};
pub use feedback::{Feedback, FeedbackResponse, FinalFeedbackResponse};
pub use learning::{
    Learning, LearningProgress, LearningProgressResponse, LearningProgressStatus,
    LearningResponse, StartLearningRequest,
};
pub use presentation::{
    AnalysisResponse, Answer, AnswerResponse, CreatedPresentationResponse, Presentation,
    PresentationResponse, PresentationStatus, Question, QuestionResponse,
    RevealedQuestionResponse, UpdatePresentationRequest,
};
pub use user::{
    LoginRequest, RegisterRequest, TokenResponse, UpdateUserRequest, User, UserResponse,
};

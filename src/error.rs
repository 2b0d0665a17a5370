use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BktError {
    #[error("parameter {name} must be a probability in [0, 1], got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("competency {0} appears more than once in the graph")]
    DuplicateCompetency(String),
    #[error("competency {competency} lists unknown prerequisite {prerequisite}")]
    UnknownPrerequisite {
        competency: String,
        prerequisite: String,
    },
    #[error("competency {0} lists itself as a prerequisite")]
    SelfPrerequisite(String),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BktError>;

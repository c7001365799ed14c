use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("unknown side acronym: {0:?}")]
    UnknownSide(String),

    #[error("bomb action {0:?} implies neither a planting nor a defusing side")]
    UnknownBombAction(String),

    #[error("invalid trace configuration: {0}")]
    InvalidTraceConfig(String),

    #[error("navigation data references unknown region {region_id}")]
    UnknownNavRegion { region_id: u32 },

    #[error("damage log disagrees at tick {tick}: {field} dealt {dealt} vs taken {taken}")]
    DamageFieldMismatch {
        tick: i64,
        field: &'static str,
        dealt: i32,
        taken: i32,
    },
}

impl AnalysisError {
    /// Whether the error points at malformed upstream data (as opposed to a
    /// caller-supplied parameter).
    pub fn is_data_contract_violation(&self) -> bool {
        match self {
            AnalysisError::UnknownSide(_) => true,
            AnalysisError::UnknownBombAction(_) => true,
            AnalysisError::UnknownNavRegion { .. } => true,
            AnalysisError::DamageFieldMismatch { .. } => true,
            AnalysisError::InvalidTraceConfig(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

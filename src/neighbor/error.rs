use thiserror::Error;

#[derive(Debug, Error)]
pub enum NeighborError {
    #[error("No record found for day {day} and area '{area}'")]
    ReferenceNotFound { day: u32, area: String },

    #[error("Record for day {day} and area '{area}' has no coordinates")]
    ReferenceWithoutCoordinate { day: u32, area: String },
}

use serde::{Deserialize, Serialize};

use crate::utils::Json;

/// Body of every non-2xx response.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    /// A description of the error condition
    #[serde(rename = "error")]
    pub error: String,
}

impl<'a> Json<'a> for ErrorBody {
    type Item = ErrorBody;
}

impl ErrorBody {
    pub fn new<S: Into<String>>(error: S) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// src/metrics/status.rs

/// Status-code class that selects which counter a response increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Redirection,
    ClientError,
    ServerError,
}

impl StatusClass {
    /// `None` for informational codes and anything outside 100–599.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            200..=299 => Some(Self::Success),
            300..=399 => Some(Self::Redirection),
            400..=499 => Some(Self::ClientError),
            500..=599 => Some(Self::ServerError),
            _ => None,
        }
    }

    pub fn metric_suffix(self) -> &'static str {
        match self {
            Self::Success => ".status.success",
            Self::Redirection => ".status.redirection",
            Self::ClientError => ".status.error.client",
            Self::ServerError => ".status.error.server",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(200, Some(StatusClass::Success))]
    #[case(204, Some(StatusClass::Success))]
    #[case(299, Some(StatusClass::Success))]
    #[case(300, Some(StatusClass::Redirection))]
    #[case(308, Some(StatusClass::Redirection))]
    #[case(400, Some(StatusClass::ClientError))]
    #[case(404, Some(StatusClass::ClientError))]
    #[case(499, Some(StatusClass::ClientError))]
    #[case(500, Some(StatusClass::ServerError))]
    #[case(599, Some(StatusClass::ServerError))]
    #[case(0, None)]
    #[case(100, None)]
    #[case(101, None)]
    #[case(199, None)]
    #[case(600, None)]
    #[case(999, None)]
    fn test_status_class_boundaries(#[case] code: u16, #[case] expected: Option<StatusClass>) {
        assert_eq!(StatusClass::from_code(code), expected);
    }

    #[test]
    fn test_metric_suffixes() {
        assert_eq!(StatusClass::Success.metric_suffix(), ".status.success");
        assert_eq!(StatusClass::Redirection.metric_suffix(), ".status.redirection");
        assert_eq!(StatusClass::ClientError.metric_suffix(), ".status.error.client");
        assert_eq!(StatusClass::ServerError.metric_suffix(), ".status.error.server");
    }
}

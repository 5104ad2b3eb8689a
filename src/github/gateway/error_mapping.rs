//! Translation of octocrab failures into review errors.

use http::StatusCode;

use crate::github::error::ReviewError;

/// Checks if an octocrab error represents a network/transport issue.
const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> ReviewError {
    if let octocrab::Error::GitHub { source, .. } = error {
        return classify_status(operation, source.status_code, &source.message);
    }

    if is_network_error(error) {
        return ReviewError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    ReviewError::Api {
        message: format!("{operation} failed: {error}"),
    }
}

/// Maps a GitHub error status to a review error.
///
/// 401 means the installation token itself was refused (expired or revoked
/// between refresh and use). 403 means the token is valid but the
/// installation lacks a permission the operation needs.
fn classify_status(operation: &str, status: StatusCode, message: &str) -> ReviewError {
    match status {
        StatusCode::UNAUTHORIZED => ReviewError::Authentication {
            message: format!(
                "{operation} failed: installation token refused ({status}): {message}"
            ),
        },
        StatusCode::FORBIDDEN => ReviewError::Authentication {
            message: format!(
                "{operation} failed: app installation lacks permission ({status}): {message}"
            ),
        },
        _ => ReviewError::Api {
            message: format!("{operation} failed with status {status}: {message}"),
        },
    }
}

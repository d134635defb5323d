use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::api::ApiError;

/// Produce a rectangle centered within `area` that spans the requested
/// percent of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Format an API failure for the footer or a modal. Server messages come
/// through verbatim; connectivity failures get the generic configuration
/// hint from the error's `Display` impl.
pub(crate) fn surface_error(err: &ApiError) -> String {
    match err {
        ApiError::Server { message, .. } => format!("Error: {message}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_messages_are_surfaced_verbatim() {
        let err = ApiError::Server {
            status: 409,
            message: "ISBN already exists".to_string(),
        };
        assert_eq!(surface_error(&err), "Error: ISBN already exists");
    }

    #[test]
    fn connectivity_failures_point_at_configuration() {
        assert!(surface_error(&ApiError::Connectivity).contains("Check API configuration"));
    }
}

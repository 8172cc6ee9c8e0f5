//! REST implementation of the PhaseSync [`TrackerApi`](phasesync_api::TrackerApi).
//!
//! Endpoints, relative to the configured base URL:
//!
//! | Operation             | Request                      |
//! |-----------------------|------------------------------|
//! | list phases           | `GET /phases`                |
//! | create phase          | `POST /phases`               |
//! | update phase          | `PUT /phases/{id}`           |
//! | phase detail          | `GET /phases/{id}`           |
//! | create deliverable    | `POST /deliverables`         |
//! | update deliverable    | `PUT /deliverables/{id}`     |
//! | delete deliverable    | `DELETE /deliverables/{id}`  |

mod auth;
mod client;

pub use auth::AuthHeader;
pub use client::{ClientSettings, HttpTrackerClient};

//! # bdx-extract
//!
//! Extraction of typed records from the facility-monitoring dashboards.
//!
//! The upstream pages have no schema contract: tables are found by nearby
//! landmark text, columns vary by page type, and units are embedded in cell
//! text. Everything in this crate is a pure function over an immutable page
//! snapshot; a missing table is an explicit [`ExtractError`], never a panic.
//!
//! ## Modules
//!
//! - [`text`]: tag stripping, label normalization and unit canonicalization
//! - [`html`]: case-insensitive element scanning
//! - [`locate`]: find the table region that follows a marker
//! - [`sensor`]: the JSON sensor array
//! - [`cdu`]: alarm and parameter tables on a cooling-unit dashboard
//! - [`liquid`]: CDU status tables and rack matrices on the liquid-cooling overview
//!
//! ## Example
//!
//! ```rust
//! use bdx_extract::cdu::parse_dashboard;
//!
//! let html = r#"
//!     <h5 class="card-title mb-0">CDU-2.1</h5>
//!     <h6>ALARM</h6>
//!     <table><tbody>
//!       <tr><td class="td-detail">CDU 1.1 - Data Hall</td><td>Active</td></tr>
//!     </tbody></table>
//! "#;
//!
//! let records = parse_dashboard(html, "http://bdx.local/cdu?id=2");
//! assert_eq!(records.name, "CDU_2.1");
//! assert_eq!(records.alarms[0].item, "cdu_1.1_data_hall");
//! assert_eq!(records.alarms[0].status, "active");
//! ```

pub mod cdu;
pub mod error;
pub mod html;
pub mod liquid;
pub mod locate;
pub mod sensor;
pub mod text;

pub use error::ExtractError;
pub use locate::{locate, locate_all, Boundary, LocatedRegion, TableRegion};

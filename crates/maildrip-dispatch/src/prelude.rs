pub use maildrip_core::app::App;
pub use maildrip_types::error::{Error, MdResult};
pub use maildrip_types::types::{Timestamp, UserId, now};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4

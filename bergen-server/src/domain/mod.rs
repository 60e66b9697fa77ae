//! Domain types for the departure aggregation server.
//!
//! These types represent validated stop and departure data. Identifiers are
//! checked at construction time, so code receiving a `StopId` can pass it
//! to upstream services without further escaping.

mod departure;
mod stop;
mod stop_id;

pub use departure::{Departure, Line, TaggedDeparture, TransportMode};
pub use stop::Stop;
pub use stop_id::{InvalidStopId, StopId};

pub mod coordinates;
pub mod route;
pub mod trip;

pub use coordinates::{Coordinates, NamedPoint};
pub use route::{RouteResult, SnapRequest, SnapResponse, TransportMode};
pub use trip::{Constraints, Day, DaySeed, Plan, SeedPoint, TripType};

pub mod day_builder;
pub mod geo_math;
pub mod llm;
pub mod osrm;
pub mod planner;
pub mod routing;
pub mod seed_generator;
pub mod waypoint_snapper;

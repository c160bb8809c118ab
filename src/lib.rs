// Do this because numerics calls for a lot of non-standard names
#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]
pub mod body;
pub mod config;
pub mod ellipsoid;
pub mod error;
pub mod gait;
pub mod helper;
pub mod helper_traits;
pub mod interpolate;
pub mod kinematics;
pub mod pipeline;
pub mod radar;
pub mod scene;

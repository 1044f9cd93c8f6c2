pub mod descent;
pub mod geometry;

pub use descent::DescentProfile;
pub use geometry::{
    add_position, completed_turn, course_frame, crossed_course_end, heading_error,
    intercept_heading, turn_radius, wrap_degrees, Course, CourseLeg, Position, TurnDirection,
};

/*!
 * Property tests entry point
 */

#[path = "properties/timer_props.rs"]
mod timer_props;

#[path = "properties/buffer_props.rs"]
mod buffer_props;

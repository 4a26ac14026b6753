//! Virtual device implementations — light, smart switch, sensor and light group.

mod group;
mod light;
mod sensor;
mod switch;

pub use group::LightGroup;
pub use light::VirtualLight;
pub use sensor::{REPORT, VirtualSensor};
pub use switch::{POWER_CURRENT, VOLTAGE, VirtualSmartSwitch, WATTS};

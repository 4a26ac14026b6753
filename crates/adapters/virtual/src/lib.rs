//! # switchyard-adapter-virtual
//!
//! Virtual/demo integration: simulated devices plus the composite
//! components (groups, rooms, routines) that drive them through the
//! dispatcher.
//!
//! ## Provided components
//!
//! | Component | Id | Behaviour |
//! |-----------|----|-----------|
//! | Virtual Light | `light.kitchen`, `light.living_room` | `ON` / `OFF` / `TOGGLE` / `LEVEL` |
//! | Virtual Smart Switch | `switch.coffee_maker` | `ON` / `OFF` / `TOGGLE`, power readings |
//! | Virtual Sensor | `sensor.hallway` | `REPORT` pushes temperature, humidity, motion |
//! | Light Group | `group.downstairs` | Forwards to both lights |
//! | Room | `room.kitchen` | Forwards `ON` / `OFF` to the kitchen light and coffee maker |
//! | Routine | `routine.good_night` | Turns everything downstairs off |
//!
//! ## Dependency rule
//!
//! Depends on `switchyard-app` (ports, hub) and `switchyard-domain` only.

pub mod devices;
mod fan_out;
pub mod room;
pub mod routine;
mod view;

use switchyard_app::hub::Hub;
use switchyard_domain::error::SwitchyardError;
use switchyard_domain::id::ComponentId;
use switchyard_domain::message::{Action, Command};

use devices::{LightGroup, VirtualLight, VirtualSensor, VirtualSmartSwitch};
use room::Room;
use routine::Routine;

const KITCHEN_LIGHT: &str = "light.kitchen";
const LIVING_ROOM_LIGHT: &str = "light.living_room";
const COFFEE_MAKER: &str = "switch.coffee_maker";
const HALLWAY_SENSOR: &str = "sensor.hallway";
const DOWNSTAIRS: &str = "group.downstairs";
const KITCHEN: &str = "room.kitchen";
const GOOD_NIGHT: &str = "routine.good_night";

/// Installs the demo component set into a [`Hub`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualIntegration;

impl VirtualIntegration {
    #[must_use]
    pub fn name(&self) -> &'static str {
        "virtual"
    }

    /// Register every virtual component, returning their ids in install
    /// order.
    ///
    /// # Errors
    ///
    /// Fails if any id is already registered in `hub`.
    pub fn install(&self, hub: &Hub) -> Result<Vec<ComponentId>, SwitchyardError> {
        let mut installed = Vec::new();

        for (id, alias) in [
            (KITCHEN_LIGHT, "Kitchen Light"),
            (LIVING_ROOM_LIGHT, "Living Room Light"),
        ] {
            let metadata = VirtualLight::metadata(id, alias)?;
            let summary = metadata.summary();
            installed.push(hub.install_with(metadata, |events| VirtualLight::new(summary, events))?);
        }

        let metadata = VirtualSmartSwitch::metadata(COFFEE_MAKER, "Coffee Maker")?;
        let summary = metadata.summary();
        installed.push(hub.install_with(metadata, |events| {
            VirtualSmartSwitch::new(summary, events, 900.0)
        })?);

        let metadata = VirtualSensor::metadata(HALLWAY_SENSOR, "Hallway Sensor")?;
        let summary = metadata.summary();
        installed.push(hub.install_with(metadata, |events| VirtualSensor::new(summary, events))?);

        let metadata = LightGroup::metadata(DOWNSTAIRS, "Downstairs Lights")?;
        let summary = metadata.summary();
        let dispatcher = hub.dispatcher().clone();
        installed.push(hub.install_with(metadata, |events| {
            LightGroup::new(
                summary,
                events,
                dispatcher,
                vec![KITCHEN_LIGHT.into(), LIVING_ROOM_LIGHT.into()],
            )
        })?);

        let metadata = Room::metadata(KITCHEN, "Kitchen")?;
        let summary = metadata.summary();
        let dispatcher = hub.dispatcher().clone();
        installed.push(hub.install_with(metadata, |_| {
            Room::new(
                summary,
                dispatcher,
                vec![KITCHEN_LIGHT.into(), COFFEE_MAKER.into()],
            )
        })?);

        let metadata = Routine::metadata(GOOD_NIGHT, "Good Night")?;
        let summary = metadata.summary();
        let dispatcher = hub.dispatcher().clone();
        installed.push(hub.install_with(metadata, |events| {
            Routine::new(
                summary,
                events,
                dispatcher,
                vec![
                    Command::new(DOWNSTAIRS, GOOD_NIGHT, Action::Off),
                    Command::new(COFFEE_MAKER, GOOD_NIGHT, Action::Off),
                ],
            )
        })?);

        tracing::info!(
            integration = self.name(),
            components = installed.len(),
            "integration installed"
        );
        Ok(installed)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use switchyard_domain::component::ComponentKind;
    use switchyard_domain::error::RegistryError;
    use switchyard_domain::message::{Params, Query};

    #[test]
    fn should_return_virtual_as_name() {
        assert_eq!(VirtualIntegration.name(), "virtual");
    }

    #[tokio::test]
    async fn should_install_demo_components() {
        let hub = testing::hub();
        let installed = VirtualIntegration.install(&hub).unwrap();

        assert_eq!(installed.len(), 7);
        let devices = BTreeSet::from([ComponentKind::Device]);
        assert_eq!(hub.list_components(Some(&devices)).len(), 5);
        let rooms = BTreeSet::from([ComponentKind::Room]);
        assert_eq!(hub.list_components(Some(&rooms)).len(), 1);
        assert_eq!(hub.list_routines()[0].id.as_str(), GOOD_NIGHT);
    }

    #[tokio::test]
    async fn should_refuse_second_install() {
        let hub = testing::hub();
        VirtualIntegration.install(&hub).unwrap();

        let result = VirtualIntegration.install(&hub);
        assert!(matches!(
            result,
            Err(SwitchyardError::Registry(RegistryError::DuplicateId(_)))
        ));
    }

    #[tokio::test]
    async fn should_turn_everything_off_with_good_night() {
        let hub = testing::hub();
        VirtualIntegration.install(&hub).unwrap();
        hub.submit_command(DOWNSTAIRS, "test", Action::On, Params::new())
            .await
            .unwrap();
        hub.submit_command(COFFEE_MAKER, "test", Action::On, Params::new())
            .await
            .unwrap();

        hub.submit_command(GOOD_NIGHT, "test", Action::On, Params::new())
            .await
            .unwrap();

        for id in [KITCHEN_LIGHT, LIVING_ROOM_LIGHT, COFFEE_MAKER] {
            let state = hub
                .submit_request(id, "test", Query::State, Params::new(), None)
                .await
                .unwrap();
            assert_eq!(state.get("state"), Some(&serde_json::json!("off")), "{id}");
        }
    }

    #[tokio::test]
    async fn should_skip_sensor_in_alexa_broadcast() {
        let hub = testing::hub();
        VirtualIntegration.install(&hub).unwrap();

        let devices = BTreeSet::from([ComponentKind::Device]);
        let views = hub
            .collect_payloads("test", &Query::AlexaView, Some(&devices))
            .await;

        // Lights, group and coffee maker; the sensor has no alexa view.
        assert_eq!(views.len(), 4);
    }

    #[tokio::test]
    async fn should_report_device_views_in_status() {
        let hub = testing::hub();
        VirtualIntegration.install(&hub).unwrap();

        let status = hub.status("test").await;
        assert_eq!(status.devices.len(), 5);
        assert_eq!(status.mode, "Day");
    }
}
